//! Entity Registry
//!
//! A registry is a Vec in insertion order with an id index on the side.
//! Iteration order and serialized order are both the insertion order, which
//! is what makes snapshots byte-stable and entity visits deterministic.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Implemented by every entity stored in a registry.
pub trait HasId {
    fn id(&self) -> &str;
}

/// Insertion-ordered, id-indexed entity store.
#[derive(Debug)]
pub struct Registry<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: HasId> Registry<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Inserts an entity. An entity with the same id replaces the old one
    /// in place, keeping its original position.
    pub fn insert(&mut self, item: T) {
        match self.index.get(item.id()) {
            Some(&pos) => self.items[pos] = item,
            None => {
                self.index.insert(item.id().to_string(), self.items.len());
                self.items.push(item);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        let pos = *self.index.get(id)?;
        self.items.get_mut(pos)
    }

    /// Returns the entity for `id`, creating it with `make` on first
    /// reference. This is the lazy-state accessor.
    pub fn get_or_insert_with(&mut self, id: &str, make: impl FnOnce() -> T) -> &mut T {
        let pos = match self.index.get(id) {
            Some(&pos) => pos,
            None => {
                let pos = self.items.len();
                self.index.insert(id.to_string(), pos);
                self.items.push(make());
                pos
            }
        };
        &mut self.items[pos]
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids in insertion order, cloned so callers can mutate while visiting.
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|i| i.id().to_string()).collect()
    }

    /// Removes entities failing the predicate and rebuilds the index.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id().to_string(), pos))
            .collect();
    }
}

impl<T: HasId> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HasId + Clone> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            index: self.index.clone(),
        }
    }
}

impl<T: HasId + PartialEq> PartialEq for Registry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: HasId> From<Vec<T>> for Registry<T> {
    fn from(items: Vec<T>) -> Self {
        let mut registry = Self::new();
        for item in items {
            registry.insert(item);
        }
        registry
    }
}

// Serialized form is the plain item sequence; the index is rebuilt on load.
impl<T: HasId + Serialize> Serialize for Registry<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.items.serialize(serializer)
    }
}

impl<'de, T: HasId + DeserializeOwned> Deserialize<'de> for Registry<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(Self::from(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Thing {
        id: String,
        value: u32,
    }

    impl HasId for Thing {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn thing(id: &str, value: u32) -> Thing {
        Thing {
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut reg = Registry::new();
        reg.insert(thing("c", 3));
        reg.insert(thing("a", 1));
        reg.insert(thing("b", 2));
        let ids: Vec<&str> = reg.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut reg = Registry::new();
        reg.insert(thing("a", 1));
        reg.insert(thing("b", 2));
        reg.insert(thing("a", 99));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get("a").unwrap().value, 99);
        let ids: Vec<&str> = reg.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_retain_reindexes() {
        let mut reg = Registry::new();
        reg.insert(thing("a", 1));
        reg.insert(thing("b", 2));
        reg.insert(thing("c", 3));
        reg.retain(|t| t.value != 2);
        assert_eq!(reg.len(), 2);
        assert!(reg.get("b").is_none());
        assert_eq!(reg.get("c").unwrap().value, 3);
    }

    #[test]
    fn test_serde_roundtrip_rebuilds_index() {
        let mut reg = Registry::new();
        reg.insert(thing("x", 10));
        reg.insert(thing("y", 20));
        let json = serde_json::to_string(&reg).unwrap();
        // Serializes as a plain array.
        assert!(json.starts_with('['));
        let back: Registry<Thing> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reg);
        assert_eq!(back.get("y").unwrap().value, 20);
    }
}
