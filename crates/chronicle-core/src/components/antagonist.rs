//! Antagonists
//!
//! Named recurring threats. Archetype behavior comes from the injected
//! content pools; this type only holds identity and track record.

use serde::{Deserialize, Serialize};

use super::registry::HasId;

/// A named recurring threat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Antagonist {
    pub id: String,
    pub name: String,
    pub epithet: String,
    /// Archetype key into the content pools (e.g. "bandit-chief").
    pub archetype: String,
    /// 1-10; scale of the threat.
    pub threat: u8,
    /// Settlement id or region name they haunt.
    pub territory: String,
    pub motivation: String,
    /// 0-10; gates rumor propagation.
    pub notoriety: u8,
    pub defeats: u32,
    pub victories: u32,
    pub followers: u32,
    pub treasure: i64,
    pub alive: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weaknesses: Vec<String>,
}

impl Antagonist {
    /// Full display name, "Name the Epithet".
    pub fn display_name(&self) -> String {
        if self.epithet.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.epithet)
        }
    }

    /// Shifts notoriety, clamped to 0..10.
    pub fn shift_notoriety(&mut self, delta: i32) {
        self.notoriety = (i32::from(self.notoriety) + delta).clamp(0, 10) as u8;
    }

    /// Notoriety 3 and up spreads word to other settlements.
    pub fn is_notorious(&self) -> bool {
        self.notoriety >= 3
    }
}

impl HasId for Antagonist {
    fn id(&self) -> &str {
        &self.id
    }
}
