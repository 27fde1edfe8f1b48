//! Map, Settlements, Dungeons, Weather
//!
//! The immutable hex map and the place entities that live on it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use chronicle_events::WorldTime;

use super::registry::HasId;

/// Axial hex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Axial distance between two hexes.
    pub fn distance(self, other: HexCoord) -> u32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        let ds = -(self.q + self.r) - (-(other.q + other.r));
        ((dq.abs() + dr.abs() + ds.abs()) / 2) as u32
    }

    /// The six neighboring coordinates, in a fixed order.
    pub fn neighbors(self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(self.q + 1, self.r - 1),
            HexCoord::new(self.q, self.r - 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q - 1, self.r + 1),
            HexCoord::new(self.q, self.r + 1),
        ]
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.q, self.r)
    }
}

/// Terrain of a hex tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Road,
    Clear,
    Forest,
    Hills,
    Mountains,
    Swamp,
    Desert,
    Coastal,
    Ocean,
    Reef,
    River,
}

impl Terrain {
    /// Overland miles covered per travel hour on this terrain.
    pub fn miles_per_hour(self) -> f64 {
        match self {
            Terrain::Road => 4.0,
            Terrain::Clear | Terrain::Coastal => 3.0,
            Terrain::Forest | Terrain::Hills | Terrain::River => 2.0,
            Terrain::Mountains | Terrain::Swamp => 1.0,
            Terrain::Desert => 2.5,
            Terrain::Ocean | Terrain::Reef => 0.0,
        }
    }

    /// Encounter probability per hour of travel. Zero means no overland
    /// encounters roll on this terrain.
    pub fn encounter_odds(self) -> f64 {
        match self {
            Terrain::Road => 1.0 / 12.0,
            Terrain::Clear | Terrain::Coastal | Terrain::River => 1.0 / 8.0,
            Terrain::Forest | Terrain::Hills | Terrain::Desert => 1.0 / 6.0,
            Terrain::Mountains | Terrain::Swamp => 1.0 / 5.0,
            Terrain::Ocean | Terrain::Reef => 0.0,
        }
    }

    /// Multiplier on treasure-extraction trip time.
    pub fn extraction_mod(self) -> f64 {
        match self {
            Terrain::Swamp => 1.5,
            Terrain::Mountains => 1.3,
            Terrain::Forest => 1.1,
            _ => 1.0,
        }
    }

    pub fn is_water(self) -> bool {
        matches!(self, Terrain::Ocean | Terrain::Reef)
    }
}

/// One tile of the world map. Created at genesis, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexTile {
    pub coord: HexCoord,
    pub terrain: Terrain,
}

/// Tradeable goods settlements stock and caravans carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Good {
    Grain,
    Fish,
    Timber,
    Iron,
    Salt,
    Cloth,
    Ale,
}

impl Good {
    pub fn all() -> &'static [Good] {
        &[
            Good::Grain,
            Good::Fish,
            Good::Timber,
            Good::Iron,
            Good::Salt,
            Good::Cloth,
            Good::Ale,
        ]
    }
}

/// Settlement size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementKind {
    Village,
    Town,
    City,
}

/// Harbor size class for port settlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSize {
    Minor,
    Major,
    Great,
}

/// Port attributes on a coastal settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortAttributes {
    pub size: PortSize,
    pub shipyard: bool,
    pub lighthouse: bool,
}

/// A settlement on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: String,
    pub name: String,
    pub kind: SettlementKind,
    pub coord: HexCoord,
    pub population: u32,
    /// Stock level per good; raids and trade mutate it.
    pub supplies: BTreeMap<Good, i32>,
    /// Collective mood, -5 to 5.
    pub mood: i32,
    /// Present on coastal settlements with a harbor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<PortAttributes>,
}

impl Settlement {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: SettlementKind,
        coord: HexCoord,
        population: u32,
    ) -> Self {
        let supplies = Good::all().iter().map(|&g| (g, 20)).collect();
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            coord,
            population,
            supplies,
            mood: 0,
            port: None,
        }
    }

    pub fn with_port(mut self, port: PortAttributes) -> Self {
        self.port = Some(port);
        self
    }

    pub fn is_port(&self) -> bool {
        self.port.is_some()
    }

    /// Shifts mood, clamped to the -5..5 band.
    pub fn shift_mood(&mut self, delta: i32) {
        self.mood = (self.mood + delta).clamp(-5, 5);
    }

    /// Adjusts one good's stock, floored at zero.
    pub fn adjust_supply(&mut self, good: Good, delta: i32) {
        let entry = self.supplies.entry(good).or_insert(0);
        *entry = (*entry + delta).max(0);
    }
}

impl HasId for Settlement {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A dungeon site. Rooms decrement as parties explore; cleared when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dungeon {
    pub id: String,
    pub name: String,
    pub coord: HexCoord,
    pub depth: u8,
    /// Danger tier 1-5.
    pub danger: u8,
    pub rooms_remaining: u32,
    pub cleared: bool,
}

impl Dungeon {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        coord: HexCoord,
        depth: u8,
        danger: u8,
        rooms: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coord,
            depth,
            danger: danger.clamp(1, 5),
            rooms_remaining: rooms,
            cleared: rooms == 0,
        }
    }

    /// Marks one room explored; flips `cleared` when the last one goes.
    pub fn explore_room(&mut self) {
        self.rooms_remaining = self.rooms_remaining.saturating_sub(1);
        if self.rooms_remaining == 0 {
            self.cleared = true;
        }
    }
}

impl HasId for Dungeon {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A named site discovered during travel; persists once found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: String,
    pub name: String,
    pub coord: HexCoord,
    pub discovered_at: WorldTime,
    pub discovered_by: String,
    /// True for ruins (explorable), false for natural landmarks.
    pub is_ruin: bool,
}

impl HasId for Landmark {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Weather condition. Odds per season come from the content tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    Clear,
    Overcast,
    Rain,
    Storm,
    Fog,
    Snow,
    Sweltering,
}

/// The current weather and when it set in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub kind: WeatherKind,
    pub since: WorldTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_distance() {
        let origin = HexCoord::new(0, 0);
        assert_eq!(origin.distance(origin), 0);
        assert_eq!(origin.distance(HexCoord::new(3, 0)), 3);
        assert_eq!(origin.distance(HexCoord::new(2, -2)), 2);
        assert_eq!(origin.distance(HexCoord::new(-1, 3)), 3);
    }

    #[test]
    fn test_neighbors_are_distance_one() {
        let c = HexCoord::new(4, -2);
        for n in c.neighbors() {
            assert_eq!(c.distance(n), 1);
        }
    }

    #[test]
    fn test_mood_clamped() {
        let mut s = Settlement::new("stl-1", "Harrowgate", SettlementKind::Town, HexCoord::new(0, 0), 900);
        s.shift_mood(9);
        assert_eq!(s.mood, 5);
        s.shift_mood(-20);
        assert_eq!(s.mood, -5);
    }

    #[test]
    fn test_supply_floor() {
        let mut s = Settlement::new("stl-1", "Harrowgate", SettlementKind::Town, HexCoord::new(0, 0), 900);
        s.adjust_supply(Good::Grain, -999);
        assert_eq!(s.supplies[&Good::Grain], 0);
        s.adjust_supply(Good::Grain, 7);
        assert_eq!(s.supplies[&Good::Grain], 7);
    }

    #[test]
    fn test_dungeon_clears_on_last_room() {
        let mut d = Dungeon::new("dgn-1", "The Sunken Vault", HexCoord::new(2, 2), 3, 2, 2);
        assert!(!d.cleared);
        d.explore_room();
        assert!(!d.cleared);
        d.explore_room();
        assert!(d.cleared);
        d.explore_room();
        assert_eq!(d.rooms_remaining, 0);
    }

    #[test]
    fn test_terrain_encounter_odds() {
        assert!(Terrain::Road.encounter_odds() < Terrain::Clear.encounter_odds());
        assert!(Terrain::Swamp.encounter_odds() > Terrain::Forest.encounter_odds());
        assert_eq!(Terrain::Ocean.encounter_odds(), 0.0);
    }
}
