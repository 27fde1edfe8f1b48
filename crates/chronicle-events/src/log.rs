//! Narrative Log
//!
//! The log is the authoritative user-facing record of the simulation. Each
//! entry is immutable once emitted; the engine appends, companion tools read.

use serde::{Deserialize, Serialize};

use crate::WorldTime;

/// Category of a log entry, used by companion tools for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    Travel,
    Encounter,
    Combat,
    Discovery,
    Treasure,
    Settlement,
    Faction,
    Antagonist,
    Naval,
    War,
    Weather,
    Festival,
    Rumor,
    Memory,
    Story,
    System,
}

impl LogCategory {
    /// Returns all category variants, in declaration order.
    pub fn all() -> &'static [LogCategory] {
        &[
            LogCategory::Travel,
            LogCategory::Encounter,
            LogCategory::Combat,
            LogCategory::Discovery,
            LogCategory::Treasure,
            LogCategory::Settlement,
            LogCategory::Faction,
            LogCategory::Antagonist,
            LogCategory::Naval,
            LogCategory::War,
            LogCategory::Weather,
            LogCategory::Festival,
            LogCategory::Rumor,
            LogCategory::Memory,
            LogCategory::Story,
            LogCategory::System,
        ]
    }
}

/// One immutable entry in the chronological event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub category: LogCategory,
    /// One-line prose summary.
    pub summary: String,
    /// Longer prose, empty when the summary says it all.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
    /// Settlement, hex, or region name where this happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Names of the entities involved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<String>,
    /// When this happened in the world.
    pub world_time: WorldTime,
    /// Turn index at emission, the engine-relative clock.
    pub turn: u64,
    /// Seed of the run that produced this entry.
    pub seed: String,
}

impl LogEntry {
    /// Creates a log entry with the required fields.
    pub fn new(
        category: LogCategory,
        summary: impl Into<String>,
        world_time: WorldTime,
        turn: u64,
        seed: impl Into<String>,
    ) -> Self {
        Self {
            category,
            summary: summary.into(),
            details: String::new(),
            location: None,
            actors: Vec::new(),
            world_time,
            turn,
            seed: seed.into(),
        }
    }

    /// Sets the details prose.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Sets the location.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Adds an actor name.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actors.push(actor.into());
        self
    }

    /// Sets the full actor list.
    pub fn with_actors(mut self, actors: Vec<String>) -> Self {
        self.actors = actors;
        self
    }

    /// Serializes the entry to a JSON line (for JSONL sinks).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an entry from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Read-only filter over the event log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogFilter {
    /// Keep only these categories (empty = all).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<LogCategory>,
    /// Keep only entries mentioning this actor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    /// Keep only entries at this location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Keep only entries at or after this time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<WorldTime>,
}

impl LogFilter {
    /// Matches everything.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts to a single category.
    pub fn category(category: LogCategory) -> Self {
        Self {
            categories: vec![category],
            ..Self::default()
        }
    }

    /// Checks whether an entry passes this filter.
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&entry.category) {
            return false;
        }
        if let Some(ref actor) = self.actor {
            if !entry.actors.iter().any(|a| a == actor) {
                return false;
            }
        }
        if let Some(ref location) = self.location {
            if entry.location.as_deref() != Some(location.as_str()) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if entry.world_time < since {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LogEntry {
        LogEntry::new(
            LogCategory::Encounter,
            "A wolf pack circles the camp",
            WorldTime::start(),
            3,
            "alpha",
        )
        .at("Darkmere Forest")
        .with_actor("The Gilded Blades")
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(serde_json::to_string(&LogCategory::Naval).unwrap(), r#""naval""#);
        assert_eq!(serde_json::to_string(&LogCategory::System).unwrap(), r#""system""#);
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let entry = sample();
        let line = entry.to_jsonl().unwrap();
        assert!(!line.contains('\n'));
        let parsed = LogEntry::from_jsonl(&line).unwrap();
        assert_eq!(parsed.summary, entry.summary);
        assert_eq!(parsed.category, entry.category);
        assert_eq!(parsed.turn, 3);
    }

    #[test]
    fn test_filter_category() {
        let entry = sample();
        assert!(LogFilter::category(LogCategory::Encounter).matches(&entry));
        assert!(!LogFilter::category(LogCategory::Naval).matches(&entry));
        assert!(LogFilter::any().matches(&entry));
    }

    #[test]
    fn test_filter_actor_and_location() {
        let entry = sample();
        let by_actor = LogFilter {
            actor: Some("The Gilded Blades".to_string()),
            ..LogFilter::default()
        };
        assert!(by_actor.matches(&entry));

        let wrong_place = LogFilter {
            location: Some("Port Vellan".to_string()),
            ..LogFilter::default()
        };
        assert!(!wrong_place.matches(&entry));
    }

    #[test]
    fn test_filter_since() {
        let entry = sample();
        let later = LogFilter {
            since: Some(WorldTime::start().plus_hours(1)),
            ..LogFilter::default()
        };
        assert!(!later.matches(&entry));
    }
}
