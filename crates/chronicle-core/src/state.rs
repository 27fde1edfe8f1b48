//! World State Container
//!
//! The whole simulation is one document: `meta` (identity and clocks),
//! `world` (entity registries), `state` (derived and lazy state, the
//! consequence queue, bounded history, and the RNG). Snapshots serialize
//! this document verbatim; content tables are injected alongside it, never
//! stored in it.

use serde::{Deserialize, Serialize};

use chronicle_events::{LogCategory, LogEntry, WorldEvent, WorldTime};

use crate::components::antagonist::Antagonist;
use crate::components::army::{Army, Caravan};
use crate::components::faction::{Faction, FactionState, SettlementState};
use crate::components::naval::{NavalState, PirateFleet, Ship};
use crate::components::npc::{Npc, NpcReactiveAdjunct};
use crate::components::party::{Party, PartyState};
use crate::components::registry::Registry;
use crate::components::story::{Rumor, StoryThread};
use crate::components::treasure::TreasureState;
use crate::components::world::{Dungeon, HexCoord, HexTile, Landmark, Settlement, Terrain, Weather};
use crate::rng::SimRng;

/// Bump when subsystem order or serialized shape changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

/// Most recent world events retained.
pub const WORLD_HISTORY_CAP: usize = 200;

/// Genesis profile selecting world composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldArchetype {
    /// Balanced inland and coastal world.
    Standard,
    /// Port-heavy world with more ships and pirates.
    Maritime,
    /// Sparse settlements, more dungeons and wilderness.
    Frontier,
}

impl Default for WorldArchetype {
    fn default() -> Self {
        WorldArchetype::Standard
    }
}

/// Run identity and clocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimMeta {
    pub seed: String,
    pub archetype: WorldArchetype,
    pub turn_index: u64,
    pub world_time: WorldTime,
    pub schema_version: u32,
}

/// Entity registries, serialized under the `world` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldRegistries {
    pub hexes: Vec<HexTile>,
    pub settlements: Registry<Settlement>,
    pub dungeons: Registry<Dungeon>,
    pub parties: Registry<Party>,
    pub npcs: Registry<Npc>,
    pub factions: Registry<Faction>,
    pub antagonists: Registry<Antagonist>,
    pub story_threads: Registry<StoryThread>,
    pub active_rumors: Registry<Rumor>,
    pub caravans: Registry<Caravan>,
    pub armies: Registry<Army>,
    pub ships: Registry<Ship>,
    pub pirates: Registry<PirateFleet>,
    pub landmarks: Registry<Landmark>,
    pub weather: Weather,
}

impl WorldRegistries {
    /// Terrain at a coordinate; off-map reads as clear ground.
    pub fn terrain_at(&self, coord: HexCoord) -> Terrain {
        self.hexes
            .iter()
            .find(|h| h.coord == coord)
            .map(|h| h.terrain)
            .unwrap_or(Terrain::Clear)
    }

    /// Settlement whose tile is exactly `coord`.
    pub fn settlement_at(&self, coord: HexCoord) -> Option<&Settlement> {
        self.settlements.iter().find(|s| s.coord == coord)
    }

    /// Closest settlement to a coordinate, ties broken by registry order.
    pub fn nearest_settlement(&self, coord: HexCoord) -> Option<&Settlement> {
        self.settlements
            .iter()
            .min_by_key(|s| s.coord.distance(coord))
    }

    /// Display name for an id across every registry; falls back to the id.
    pub fn display_name(&self, id: &str) -> String {
        if let Some(s) = self.settlements.get(id) {
            return s.name.clone();
        }
        if let Some(p) = self.parties.get(id) {
            return p.name.clone();
        }
        if let Some(n) = self.npcs.get(id) {
            return n.name.clone();
        }
        if let Some(f) = self.factions.get(id) {
            return f.name.clone();
        }
        if let Some(a) = self.antagonists.get(id) {
            return a.display_name();
        }
        if let Some(s) = self.ships.get(id) {
            return s.name.clone();
        }
        if let Some(p) = self.pirates.get(id) {
            return p.name.clone();
        }
        id.to_string()
    }

    /// Faction owning a party-like actor name, by exact faction name or id.
    pub fn faction_of_actor(&self, actor: &str) -> Option<&Faction> {
        self.factions
            .get(actor)
            .or_else(|| self.factions.iter().find(|f| f.name == actor))
    }
}

/// Derived and lazy state, serialized under the `state` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedState {
    pub settlement_states: Registry<SettlementState>,
    pub faction_states: Registry<FactionState>,
    pub party_states: Registry<PartyState>,
    pub npc_adjuncts: Registry<NpcReactiveAdjunct>,
    pub treasure: TreasureState,
    pub naval: NavalState,
    pub consequences: crate::systems::consequence::ConsequenceQueue,
    pub history: Vec<WorldEvent>,
    pub rng: SimRng,
}

/// The complete simulation document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sim {
    pub meta: SimMeta,
    pub world: WorldRegistries,
    pub state: DerivedState,
}

impl Sim {
    /// Appends a world event to the bounded history tail.
    pub fn push_history(&mut self, event: WorldEvent) {
        self.state.history.push(event);
        if self.state.history.len() > WORLD_HISTORY_CAP {
            let excess = self.state.history.len() - WORLD_HISTORY_CAP;
            self.state.history.drain(0..excess);
        }
    }

    /// Get-or-create the civic state for a settlement.
    pub fn settlement_state_mut(&mut self, settlement_id: &str) -> &mut SettlementState {
        self.state
            .settlement_states
            .get_or_insert_with(settlement_id, || SettlementState::new(settlement_id))
    }

    /// Get-or-create the political state for a faction.
    pub fn faction_state_mut(&mut self, faction_id: &str) -> &mut FactionState {
        self.state
            .faction_states
            .get_or_insert_with(faction_id, || FactionState::new(faction_id))
    }

    /// Get-or-create the adjunct state for a party.
    pub fn party_state_mut(&mut self, party_id: &str) -> &mut PartyState {
        self.state
            .party_states
            .get_or_insert_with(party_id, || PartyState::new(party_id))
    }

    /// Get-or-create the reactive adjunct for an NPC.
    pub fn npc_adjunct_mut(&mut self, npc_id: &str) -> &mut NpcReactiveAdjunct {
        self.state
            .npc_adjuncts
            .get_or_insert_with(npc_id, || NpcReactiveAdjunct::new(npc_id))
    }

    /// Builds a log entry stamped with the current clocks.
    pub fn log(&self, category: LogCategory, summary: impl Into<String>) -> LogEntry {
        LogEntry::new(
            category,
            summary,
            self.meta.world_time,
            self.meta.turn_index,
            self.meta.seed.clone(),
        )
    }

    /// New unique id for the given prefix.
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.state.rng.uid(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_events::{EventData, WorldEventKind};

    fn empty_sim() -> Sim {
        Sim {
            meta: SimMeta {
                seed: "test".to_string(),
                archetype: WorldArchetype::Standard,
                turn_index: 0,
                world_time: WorldTime::start(),
                schema_version: SCHEMA_VERSION,
            },
            world: WorldRegistries {
                hexes: Vec::new(),
                settlements: Registry::new(),
                dungeons: Registry::new(),
                parties: Registry::new(),
                npcs: Registry::new(),
                factions: Registry::new(),
                antagonists: Registry::new(),
                story_threads: Registry::new(),
                active_rumors: Registry::new(),
                caravans: Registry::new(),
                armies: Registry::new(),
                ships: Registry::new(),
                pirates: Registry::new(),
                landmarks: Registry::new(),
                weather: Weather {
                    kind: crate::components::world::WeatherKind::Clear,
                    since: WorldTime::start(),
                },
            },
            state: DerivedState {
                settlement_states: Registry::new(),
                faction_states: Registry::new(),
                party_states: Registry::new(),
                npc_adjuncts: Registry::new(),
                treasure: TreasureState::default(),
                naval: NavalState::default(),
                consequences: crate::systems::consequence::ConsequenceQueue::new(),
                history: Vec::new(),
                rng: SimRng::from_seed("test"),
            },
        }
    }

    #[test]
    fn test_history_bounded() {
        let mut sim = empty_sim();
        for i in 0..(WORLD_HISTORY_CAP + 50) {
            sim.push_history(WorldEvent::new(
                format!("evt-{}", i),
                WorldEventKind::Discovery,
                WorldTime::start(),
                1,
                EventData::General {
                    description: String::new(),
                },
            ));
        }
        assert_eq!(sim.state.history.len(), WORLD_HISTORY_CAP);
        assert_eq!(sim.state.history[0].id, "evt-50");
    }

    #[test]
    fn test_lazy_states_created_once() {
        let mut sim = empty_sim();
        sim.settlement_state_mut("stl-1").prosperity = 3;
        assert_eq!(sim.settlement_state_mut("stl-1").prosperity, 3);
        assert_eq!(sim.state.settlement_states.len(), 1);
    }

    #[test]
    fn test_log_stamps_clocks() {
        let mut sim = empty_sim();
        sim.meta.turn_index = 7;
        let entry = sim.log(LogCategory::System, "note");
        assert_eq!(entry.turn, 7);
        assert_eq!(entry.seed, "test");
    }
}
