//! Armies and Caravans
//!
//! Overland movers: faction armies with supply lines, and trade caravans
//! running goods between settlements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chronicle_events::WorldTime;

use super::registry::HasId;
use super::world::{Good, HexCoord};

/// What an army is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmyStatus {
    Camped,
    Marching,
    Besieging,
    Routed,
}

/// A faction army in the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Army {
    pub id: String,
    /// Faction id that raised it.
    pub owner_id: String,
    pub location: HexCoord,
    pub strength: u32,
    /// Troop quality 1-5.
    pub quality: u8,
    /// 2-12, the morale band of a two-die roll.
    pub morale: u8,
    pub status: ArmyStatus,
    /// Settlement id being marched on or besieged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// 0-100.
    pub supplies: u8,
    /// Settlement id feeding this army, if a line is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_line_from: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captured_leaders: Vec<String>,
}

impl Army {
    /// Shifts morale, clamped to the 2..12 band.
    pub fn shift_morale(&mut self, delta: i32) {
        self.morale = (i32::from(self.morale) + delta).clamp(2, 12) as u8;
    }

    /// Shifts supplies, clamped to 0..100.
    pub fn shift_supplies(&mut self, delta: i32) {
        self.supplies = (i32::from(self.supplies) + delta).clamp(0, 100) as u8;
    }

    /// Casualties; strength floors at zero, the army is destroyed there.
    pub fn take_losses(&mut self, losses: u32) {
        self.strength = self.strength.saturating_sub(losses);
    }

    pub fn is_destroyed(&self) -> bool {
        self.strength == 0
    }
}

impl HasId for Army {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A trade caravan between two settlements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caravan {
    pub id: String,
    /// Settlement ids.
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub goods: BTreeMap<Good, u32>,
    /// Faction id sponsoring the caravan, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_faction: Option<String>,
    pub departed_at: WorldTime,
    pub arrives_at: WorldTime,
    pub robbed: bool,
}

impl Caravan {
    /// Total gold value of the cargo at flat per-unit worth.
    pub fn cargo_value(&self) -> i64 {
        self.goods.values().map(|&n| i64::from(n) * 10).sum()
    }
}

impl HasId for Caravan {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn army() -> Army {
        Army {
            id: "arm-1".to_string(),
            owner_id: "fct-1".to_string(),
            location: HexCoord::new(0, 0),
            strength: 200,
            quality: 3,
            morale: 7,
            status: ArmyStatus::Camped,
            target: None,
            supplies: 80,
            supply_line_from: Some("stl-1".to_string()),
            captured_leaders: Vec::new(),
        }
    }

    #[test]
    fn test_morale_band() {
        let mut a = army();
        a.shift_morale(20);
        assert_eq!(a.morale, 12);
        a.shift_morale(-30);
        assert_eq!(a.morale, 2);
    }

    #[test]
    fn test_destroyed_at_zero() {
        let mut a = army();
        a.take_losses(150);
        assert!(!a.is_destroyed());
        a.take_losses(9999);
        assert!(a.is_destroyed());
    }

    #[test]
    fn test_caravan_value() {
        let mut goods = BTreeMap::new();
        goods.insert(Good::Grain, 5);
        goods.insert(Good::Iron, 2);
        let c = Caravan {
            id: "crv-1".to_string(),
            from: "stl-1".to_string(),
            to: "stl-2".to_string(),
            goods,
            owner_faction: None,
            departed_at: WorldTime::start(),
            arrives_at: WorldTime::start().plus_hours(24),
            robbed: false,
        };
        assert_eq!(c.cargo_value(), 70);
    }
}
