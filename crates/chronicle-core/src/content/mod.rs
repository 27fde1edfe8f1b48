//! Content Tables
//!
//! Everything the engine consumes as data rather than code: creature
//! tables, treasure type configurations, antagonist archetype pools,
//! weather odds, ship types, and name pools. Tables are injected at
//! simulation construction and validated once there; malformed content is
//! fatal at bootstrap and never mid-tick.

pub mod defaults;
pub mod dice;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chronicle_events::Season;

use crate::components::treasure::{Coin, MagicCategory};
use crate::components::world::{Terrain, WeatherKind};
use crate::error::{SimError, SimResult};

pub use dice::DiceNotation;

/// Name and phrase pools. Shape only; contents arrive as configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamePools {
    pub settlements: Vec<String>,
    pub dungeons: Vec<String>,
    pub parties: Vec<String>,
    pub factions: Vec<String>,
    pub npc_first: Vec<String>,
    pub npc_roles: Vec<String>,
    pub antagonist_names: Vec<String>,
    pub ships: Vec<String>,
    pub pirate_fleets: Vec<String>,
    pub pirate_captains: Vec<String>,
    pub distant_lands: Vec<String>,
    pub distant_land_flavors: Vec<String>,
    pub distant_figures: Vec<String>,
    pub distant_figure_titles: Vec<String>,
    pub landmarks: Vec<String>,
    pub ruins: Vec<String>,
    pub magic_suffixes: Vec<String>,
}

/// One creature on a terrain encounter table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatureEntry {
    pub name: String,
    pub terrains: Vec<Terrain>,
    /// Relative pick weight within the terrain pool.
    pub weight: u32,
    /// Chance this encounter is a named individual.
    #[serde(default)]
    pub named_chance: f64,
    /// Chance this encounter is a horde.
    #[serde(default)]
    pub horde_chance: f64,
    /// Force hostile reaction regardless of the reaction roll.
    #[serde(default)]
    pub always_hostile: bool,
}

/// Maps creature names to treasure types by regex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasureMatchRule {
    /// Regex matched case-insensitively against the creature name.
    pub pattern: String,
    /// Treasure type letter, or "Nil".
    pub treasure_type: String,
}

/// Coin roll inside a treasure type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinSpec {
    pub chance: f64,
    pub dice: DiceNotation,
}

/// Gem or jewelry roll inside a treasure type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSpec {
    pub chance: f64,
    /// Number of pieces.
    pub dice: DiceNotation,
}

/// Magic item roll inside a treasure type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicSpec {
    pub chance: f64,
    pub count: u32,
    /// Categories this type can yield; empty means any.
    #[serde(default)]
    pub categories: Vec<MagicCategory>,
}

/// One treasure type (A-V or Nil).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreasureTypeConfig {
    pub coins: BTreeMap<Coin, CoinSpec>,
    pub gems: Option<PoolSpec>,
    pub jewelry: Option<PoolSpec>,
    pub magic: Option<MagicSpec>,
    pub is_lair: bool,
    /// Typical total value range in gold.
    pub typical_value: (u32, u32),
}

/// Pools behind one antagonist archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypePools {
    pub epithets: Vec<String>,
    pub motivations: Vec<String>,
    pub traits: Vec<String>,
    pub weaknesses: Vec<String>,
    /// Verb phrases for periodic actions ("raids the grain stores").
    pub actions: Vec<String>,
}

/// Weighted weather entry for one season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherOdds {
    pub kind: WeatherKind,
    pub weight: u32,
}

/// Per-condition weather effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherEffects {
    pub travel_speed_mod: f64,
    pub encounter_chance_mod: f64,
    pub low_visibility: bool,
    pub mood_mod: i32,
    pub magic_mod: i32,
}

/// One ship type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipTypeConfig {
    pub crew: u32,
    pub cargo_capacity: u32,
    pub speed_miles_per_day: u32,
    /// 0.0 to 1.0.
    pub seaworthiness: f64,
    pub cost: i64,
    pub marines: u32,
}

/// A fixed calendar holiday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    pub month: u32,
    pub day: u32,
    pub name: String,
}

/// The complete injected configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentTables {
    pub names: NamePools,
    pub creatures: Vec<CreatureEntry>,
    pub treasure_match: Vec<TreasureMatchRule>,
    pub treasure_types: BTreeMap<String, TreasureTypeConfig>,
    pub archetypes: BTreeMap<String, ArchetypePools>,
    pub weather_odds: BTreeMap<Season, Vec<WeatherOdds>>,
    pub weather_effects: BTreeMap<WeatherKind, WeatherEffects>,
    pub ship_types: BTreeMap<String, ShipTypeConfig>,
    pub holidays: Vec<Holiday>,
}

/// Treasure type letters the engine requires to exist.
const REQUIRED_TREASURE_TYPES: &[&str] = &[
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S",
    "T", "U", "V", "Nil",
];

/// Archetype keys the engine references directly.
const REQUIRED_ARCHETYPES: &[&str] = &["bandit-chief", "dragon", "pirate-captain"];

impl ContentTables {
    /// Loads tables from a TOML document and validates them.
    pub fn from_toml_str(source: &str) -> SimResult<Self> {
        let tables: ContentTables =
            toml::from_str(source).map_err(|e| SimError::ContentTable(e.to_string()))?;
        tables.validate()?;
        Ok(tables)
    }

    /// Checks every table the tick path will consult. Called once at
    /// bootstrap so ticks never see malformed content.
    pub fn validate(&self) -> SimResult<()> {
        fn nonempty(pool: &[String], what: &str) -> SimResult<()> {
            if pool.is_empty() {
                return Err(SimError::ContentTable(format!("empty pool: {}", what)));
            }
            Ok(())
        }

        let n = &self.names;
        nonempty(&n.settlements, "names.settlements")?;
        nonempty(&n.dungeons, "names.dungeons")?;
        nonempty(&n.parties, "names.parties")?;
        nonempty(&n.factions, "names.factions")?;
        nonempty(&n.npc_first, "names.npc_first")?;
        nonempty(&n.npc_roles, "names.npc_roles")?;
        nonempty(&n.antagonist_names, "names.antagonist_names")?;
        nonempty(&n.ships, "names.ships")?;
        nonempty(&n.pirate_fleets, "names.pirate_fleets")?;
        nonempty(&n.pirate_captains, "names.pirate_captains")?;
        nonempty(&n.distant_lands, "names.distant_lands")?;
        nonempty(&n.distant_land_flavors, "names.distant_land_flavors")?;
        nonempty(&n.distant_figures, "names.distant_figures")?;
        nonempty(&n.distant_figure_titles, "names.distant_figure_titles")?;
        nonempty(&n.landmarks, "names.landmarks")?;
        nonempty(&n.ruins, "names.ruins")?;
        nonempty(&n.magic_suffixes, "names.magic_suffixes")?;

        if self.creatures.is_empty() {
            return Err(SimError::ContentTable("no creature entries".to_string()));
        }
        for entry in &self.creatures {
            if entry.terrains.is_empty() {
                return Err(SimError::ContentTable(format!(
                    "creature '{}' lists no terrains",
                    entry.name
                )));
            }
            if entry.weight == 0 {
                return Err(SimError::ContentTable(format!(
                    "creature '{}' has zero weight",
                    entry.name
                )));
            }
        }

        for rule in &self.treasure_match {
            Regex::new(&format!("(?i){}", rule.pattern)).map_err(|e| {
                SimError::ContentTable(format!("bad treasure pattern '{}': {}", rule.pattern, e))
            })?;
            if !self.treasure_types.contains_key(&rule.treasure_type) {
                return Err(SimError::ContentTable(format!(
                    "treasure pattern '{}' names unknown type '{}'",
                    rule.pattern, rule.treasure_type
                )));
            }
        }

        for required in REQUIRED_TREASURE_TYPES {
            if !self.treasure_types.contains_key(*required) {
                return Err(SimError::ContentTable(format!(
                    "missing treasure type '{}'",
                    required
                )));
            }
        }

        if self.archetypes.is_empty() {
            return Err(SimError::ContentTable("no antagonist archetypes".to_string()));
        }
        for required in REQUIRED_ARCHETYPES {
            if !self.archetypes.contains_key(*required) {
                return Err(SimError::ContentTable(format!(
                    "missing archetype '{}'",
                    required
                )));
            }
        }
        for (key, pools) in &self.archetypes {
            nonempty(&pools.epithets, &format!("archetype '{}' epithets", key))?;
            nonempty(&pools.motivations, &format!("archetype '{}' motivations", key))?;
            nonempty(&pools.traits, &format!("archetype '{}' traits", key))?;
            nonempty(&pools.weaknesses, &format!("archetype '{}' weaknesses", key))?;
            nonempty(&pools.actions, &format!("archetype '{}' actions", key))?;
        }

        for season in Season::all() {
            let odds = self
                .weather_odds
                .get(season)
                .ok_or_else(|| SimError::ContentTable(format!("no weather odds for {}", season)))?;
            if odds.is_empty() || odds.iter().all(|o| o.weight == 0) {
                return Err(SimError::ContentTable(format!(
                    "weather odds for {} have no weight",
                    season
                )));
            }
            for entry in odds {
                if !self.weather_effects.contains_key(&entry.kind) {
                    return Err(SimError::ContentTable(format!(
                        "weather {:?} has odds but no effects",
                        entry.kind
                    )));
                }
            }
        }

        if self.ship_types.is_empty() {
            return Err(SimError::ContentTable("no ship types".to_string()));
        }
        for (name, config) in &self.ship_types {
            if !(0.0..=1.0).contains(&config.seaworthiness) {
                return Err(SimError::ContentTable(format!(
                    "ship type '{}' seaworthiness out of range",
                    name
                )));
            }
        }

        for holiday in &self.holidays {
            if holiday.month == 0 || holiday.month > 12 || holiday.day == 0 || holiday.day > 31 {
                return Err(SimError::ContentTable(format!(
                    "holiday '{}' has impossible date",
                    holiday.name
                )));
            }
        }

        Ok(())
    }

    /// Resolves a creature name to its treasure type via the match rules.
    /// Falls back to "Nil" when no rule fires.
    pub fn treasure_type_for(&self, creature_name: &str) -> &str {
        for rule in &self.treasure_match {
            if let Ok(re) = Regex::new(&format!("(?i){}", rule.pattern)) {
                if re.is_match(creature_name) {
                    return &rule.treasure_type;
                }
            }
        }
        "Nil"
    }

    /// Creature entries valid for a terrain, in table order.
    pub fn creatures_for(&self, terrain: Terrain) -> Vec<&CreatureEntry> {
        self.creatures
            .iter()
            .filter(|c| c.terrains.contains(&terrain))
            .collect()
    }

    /// Holiday on the given calendar date, if any.
    pub fn holiday_on(&self, month: u32, day: u32) -> Option<&Holiday> {
        self.holidays.iter().find(|h| h.month == month && h.day == day)
    }

    /// Effects for a weather condition. Validation guarantees presence for
    /// every condition that can be rolled.
    pub fn effects_for(&self, kind: WeatherKind) -> WeatherEffects {
        self.weather_effects.get(&kind).cloned().unwrap_or(WeatherEffects {
            travel_speed_mod: 1.0,
            encounter_chance_mod: 1.0,
            low_visibility: false,
            mood_mod: 0,
            magic_mod: 0,
        })
    }
}

impl Default for ContentTables {
    fn default() -> Self {
        defaults::standard_tables()
    }
}
