//! Treasure
//!
//! Generated hoards, their multi-trip extraction schedules, magic items in
//! circulation, settlement gold influxes, and treasure rumors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chronicle_events::WorldTime;

use super::registry::{HasId, Registry};

/// Coin denominations. Every coin weighs a tenth of a pound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coin {
    Cp,
    Sp,
    Ep,
    Gp,
    Pp,
}

pub const COIN_WEIGHT: f64 = 0.1;
pub const GEM_WEIGHT: f64 = 1.0;
pub const JEWELRY_WEIGHT: f64 = 10.0;

impl Coin {
    pub fn all() -> &'static [Coin] {
        &[Coin::Cp, Coin::Sp, Coin::Ep, Coin::Gp, Coin::Pp]
    }

    /// Gold pieces per coin.
    pub fn gold_rate(self) -> f64 {
        match self {
            Coin::Cp => 0.01,
            Coin::Sp => 0.1,
            Coin::Ep => 0.5,
            Coin::Gp => 1.0,
            Coin::Pp => 5.0,
        }
    }

    /// Extraction load order: best gold-per-weight first (after magic and
    /// gems, which outrank all coin).
    pub fn load_priority(self) -> u8 {
        match self {
            Coin::Pp => 0,
            Coin::Gp => 1,
            Coin::Ep => 2,
            Coin::Sp => 3,
            Coin::Cp => 4,
        }
    }
}

/// Magic item category; fixes weight and typical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagicCategory {
    Potion,
    Scroll,
    Ring,
    Wand,
    Staff,
    Rod,
    Weapon,
    Armor,
    Misc,
    Artifact,
}

impl MagicCategory {
    pub fn all() -> &'static [MagicCategory] {
        &[
            MagicCategory::Potion,
            MagicCategory::Scroll,
            MagicCategory::Ring,
            MagicCategory::Wand,
            MagicCategory::Staff,
            MagicCategory::Rod,
            MagicCategory::Weapon,
            MagicCategory::Armor,
            MagicCategory::Misc,
            MagicCategory::Artifact,
        ]
    }

    /// Carry weight in pounds.
    pub fn weight(self) -> f64 {
        match self {
            MagicCategory::Potion => 5.0,
            MagicCategory::Scroll => 1.0,
            MagicCategory::Ring => 1.0,
            MagicCategory::Wand => 5.0,
            MagicCategory::Staff => 40.0,
            MagicCategory::Rod => 20.0,
            MagicCategory::Weapon => 50.0,
            MagicCategory::Armor => 100.0,
            MagicCategory::Misc => 20.0,
            MagicCategory::Artifact => 30.0,
        }
    }
}

/// Rarity tier of a magic item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    VeryRare,
    Legendary,
}

/// A magic item in circulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagicItem {
    pub id: String,
    pub name: String,
    pub category: MagicCategory,
    pub rarity: Rarity,
    pub value: i64,
    pub identified: bool,
    /// Party, NPC, faction, or antagonist id currently holding it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl HasId for MagicItem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The immediate product of a treasure roll, before it becomes a hoard or
/// an extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedTreasure {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub coins: BTreeMap<Coin, u32>,
    /// Individual gem values in gold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gems: Vec<i64>,
    /// Individual jewelry piece values in gold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jewelry: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_item_ids: Vec<String>,
    pub total_gold_value: i64,
    pub is_hoard: bool,
    pub treasure_type: String,
}

impl GeneratedTreasure {
    /// Weight in pounds, magic items costed via the provided lookup.
    pub fn total_weight(&self, magic_weight: impl Fn(&str) -> f64) -> f64 {
        let coin_count: u32 = self.coins.values().sum();
        let mut weight = f64::from(coin_count) * COIN_WEIGHT
            + self.gems.len() as f64 * GEM_WEIGHT
            + self.jewelry.len() as f64 * JEWELRY_WEIGHT;
        for id in &self.magic_item_ids {
            weight += magic_weight(id);
        }
        weight
    }
}

/// A hoard a party has found and claimed (fully or through extraction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredHoard {
    pub id: String,
    /// Dungeon or site id where it was found.
    pub location: String,
    pub discovered_by: String,
    pub discovered_at: WorldTime,
    pub total_value: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magic_item_ids: Vec<String>,
    pub liquidated: bool,
    /// 0-100.
    pub percent_spent: u8,
}

impl HasId for DiscoveredHoard {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A multi-trip removal schedule for an overweight hoard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasureExtraction {
    pub id: String,
    pub hoard_id: String,
    pub party_id: String,
    /// Dungeon id the loot is hauled out of.
    pub dungeon_id: String,
    /// Settlement id the loot is hauled to.
    pub destination: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub remaining_coins: BTreeMap<Coin, u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remaining_gems: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remaining_jewelry: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remaining_magic: Vec<String>,
    pub total_weight: f64,
    pub extracted_weight: f64,
    pub trips_completed: u32,
    /// Weight currently on the party's backs.
    pub current_load: f64,
    pub trip_hours: u32,
    pub next_trip_completes: WorldTime,
    pub abandoned: bool,
    pub completed: bool,
    /// When the extraction finished or was abandoned, for pruning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<WorldTime>,
}

impl TreasureExtraction {
    /// Weight of everything still in the dungeon, magic costed via lookup.
    pub fn remaining_weight(&self, magic_weight: impl Fn(&str) -> f64) -> f64 {
        let coin_count: u32 = self.remaining_coins.values().sum();
        let mut weight = f64::from(coin_count) * COIN_WEIGHT
            + self.remaining_gems.len() as f64 * GEM_WEIGHT
            + self.remaining_jewelry.len() as f64 * JEWELRY_WEIGHT;
        for id in &self.remaining_magic {
            weight += magic_weight(id);
        }
        weight
    }

    pub fn is_drained(&self) -> bool {
        self.remaining_coins.values().all(|&n| n == 0)
            && self.remaining_gems.is_empty()
            && self.remaining_jewelry.is_empty()
            && self.remaining_magic.is_empty()
    }

    /// Gold value of the copper/silver/electrum dregs. Drives the abandon
    /// decision once gems and magic are out.
    pub fn dreg_value(&self) -> f64 {
        [Coin::Cp, Coin::Sp, Coin::Ep]
            .iter()
            .map(|&c| f64::from(self.remaining_coins.get(&c).copied().unwrap_or(0)) * c.gold_rate())
            .sum()
    }

    /// True when only low coin remains: no gold/platinum, gems, jewelry,
    /// or magic.
    pub fn only_dregs(&self) -> bool {
        self.remaining_gems.is_empty()
            && self.remaining_jewelry.is_empty()
            && self.remaining_magic.is_empty()
            && self.remaining_coins.get(&Coin::Gp).copied().unwrap_or(0) == 0
            && self.remaining_coins.get(&Coin::Pp).copied().unwrap_or(0) == 0
    }
}

impl HasId for TreasureExtraction {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A rumor that specifically points at treasure, with the creature types
/// it attracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasureRumor {
    pub id: String,
    pub text: String,
    pub treasure_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attracts: Vec<String>,
    /// Settlement id of origin.
    pub origin: String,
    /// Days until it fades.
    pub freshness: u32,
}

impl HasId for TreasureRumor {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A recorded arrival of treasure gold at a settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasureInflux {
    pub settlement_id: String,
    pub amount: i64,
    /// Day-since-epoch of arrival.
    pub arrived_day: i64,
}

/// All treasure bookkeeping, serialized under `state.treasureState`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreasureState {
    pub hoards: Registry<DiscoveredHoard>,
    pub extractions: Registry<TreasureExtraction>,
    pub magic_items: Registry<MagicItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub influxes: Vec<TreasureInflux>,
    pub rumors: Registry<TreasureRumor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_rates() {
        assert_eq!(Coin::Cp.gold_rate(), 0.01);
        assert_eq!(Coin::Pp.gold_rate(), 5.0);
    }

    #[test]
    fn test_load_priority_order() {
        assert!(Coin::Pp.load_priority() < Coin::Gp.load_priority());
        assert!(Coin::Gp.load_priority() < Coin::Ep.load_priority());
        assert!(Coin::Sp.load_priority() < Coin::Cp.load_priority());
    }

    #[test]
    fn test_generated_weight() {
        let mut coins = BTreeMap::new();
        coins.insert(Coin::Gp, 100);
        let t = GeneratedTreasure {
            coins,
            gems: vec![50, 100],
            jewelry: vec![300],
            magic_item_ids: vec!["itm-1".to_string()],
            total_gold_value: 550,
            is_hoard: true,
            treasure_type: "A".to_string(),
        };
        // 100 coins * 0.1 + 2 gems + 10 jewelry + 5 (potion)
        let weight = t.total_weight(|_| MagicCategory::Potion.weight());
        assert!((weight - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_extraction_drained_and_dregs() {
        let mut coins = BTreeMap::new();
        coins.insert(Coin::Cp, 200);
        coins.insert(Coin::Sp, 100);
        let x = TreasureExtraction {
            id: "ext-1".to_string(),
            hoard_id: "hrd-1".to_string(),
            party_id: "pty-1".to_string(),
            dungeon_id: "dgn-1".to_string(),
            destination: "stl-1".to_string(),
            remaining_coins: coins,
            remaining_gems: Vec::new(),
            remaining_jewelry: Vec::new(),
            remaining_magic: Vec::new(),
            total_weight: 30.0,
            extracted_weight: 0.0,
            trips_completed: 0,
            current_load: 0.0,
            trip_hours: 4,
            next_trip_completes: WorldTime::start(),
            abandoned: false,
            completed: false,
            closed_at: None,
        };
        assert!(!x.is_drained());
        assert!(x.only_dregs());
        // 200cp = 2gp, 100sp = 10gp
        assert!((x.dreg_value() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_magic_weights() {
        assert_eq!(MagicCategory::Armor.weight(), 100.0);
        assert_eq!(MagicCategory::Scroll.weight(), 1.0);
    }
}
