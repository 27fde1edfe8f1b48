//! World Genesis
//!
//! Builds a fresh world from a seed and an archetype. Everything here
//! flows through the one seeded generator, so the same seed always births
//! the same world. Genesis emits no log entries; the chronicle starts with
//! the first tick.

use std::collections::BTreeMap;

use chronicle_events::WorldTime;

use crate::components::faction::{Faction, FactionFocus};
use crate::components::naval::{NavalState, PirateFleet, PortActivity, SeaRoute, Ship, ShipStatus};
use crate::components::npc::Npc;
use crate::components::party::{CharacterClass, Party, PartyGoal, PartyMember};
use crate::components::registry::Registry;
use crate::components::world::{
    Dungeon, Good, HexCoord, HexTile, PortAttributes, PortSize, Settlement, SettlementKind,
    Terrain, Weather,
};
use crate::content::ContentTables;
use crate::rng::SimRng;
use crate::state::{DerivedState, Sim, SimMeta, WorldArchetype, SCHEMA_VERSION};
use crate::systems::consequence::ConsequenceQueue;

/// Map radius in hexes.
const MAP_RADIUS: i32 = 8;

struct GenesisPlan {
    settlements: usize,
    dungeons: usize,
    parties: usize,
    pirates: usize,
    coastal_bias: bool,
}

fn plan_for(archetype: WorldArchetype) -> GenesisPlan {
    match archetype {
        WorldArchetype::Standard => GenesisPlan {
            settlements: 5,
            dungeons: 4,
            parties: 3,
            pirates: 1,
            coastal_bias: false,
        },
        WorldArchetype::Maritime => GenesisPlan {
            settlements: 6,
            dungeons: 3,
            parties: 2,
            pirates: 2,
            coastal_bias: true,
        },
        WorldArchetype::Frontier => GenesisPlan {
            settlements: 3,
            dungeons: 6,
            parties: 3,
            pirates: 0,
            coastal_bias: false,
        },
    }
}

/// Creates a new world. Content tables must already be validated.
pub fn genesis(seed: &str, archetype: WorldArchetype, content: &ContentTables) -> Sim {
    let mut rng = SimRng::from_seed(seed);
    let plan = plan_for(archetype);
    let start = WorldTime::start();

    let hexes = build_map(&mut rng);
    let land: Vec<HexCoord> = hexes
        .iter()
        .filter(|h| !h.terrain.is_water())
        .map(|h| h.coord)
        .collect();
    let coastal: Vec<HexCoord> = hexes
        .iter()
        .filter(|h| h.terrain == Terrain::Coastal)
        .map(|h| h.coord)
        .collect();

    let mut sim = Sim {
        meta: SimMeta {
            seed: seed.to_string(),
            archetype,
            turn_index: 0,
            world_time: start,
            schema_version: SCHEMA_VERSION,
        },
        world: crate::state::WorldRegistries {
            hexes,
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
                since: start,
            },
        },
        state: DerivedState {
            settlement_states: Registry::new(),
            faction_states: Registry::new(),
            party_states: Registry::new(),
            npc_adjuncts: Registry::new(),
            treasure: Default::default(),
            naval: NavalState::default(),
            consequences: ConsequenceQueue::new(),
            history: Vec::new(),
            rng: SimRng::from_seed(seed),
        },
    };
    // Genesis and the run share one stream; hand the warmed-up generator
    // over once construction is done.
    sim.state.rng = rng;

    spawn_settlements(&mut sim, content, &plan, &land, &coastal);
    spawn_dungeons(&mut sim, content, &plan, &land);
    spawn_npcs(&mut sim, content);
    spawn_factions(&mut sim, content);
    spawn_parties(&mut sim, content, &plan);
    spawn_antagonist(&mut sim, content);
    spawn_naval(&mut sim, content, &plan);
    initial_weather(&mut sim, content);

    sim
}

fn build_map(rng: &mut SimRng) -> Vec<HexTile> {
    let mut tiles = Vec::new();
    for q in -MAP_RADIUS..=MAP_RADIUS {
        for r in -MAP_RADIUS..=MAP_RADIUS {
            let coord = HexCoord::new(q, r);
            let ring = coord.distance(HexCoord::new(0, 0)) as i32;
            if ring > MAP_RADIUS {
                continue;
            }
            let terrain = if ring == MAP_RADIUS {
                Terrain::Ocean
            } else if ring == MAP_RADIUS - 1 {
                if rng.chance(0.6) {
                    Terrain::Coastal
                } else {
                    Terrain::Ocean
                }
            } else {
                let inland = [
                    (Terrain::Clear, 6u32),
                    (Terrain::Forest, 4),
                    (Terrain::Hills, 3),
                    (Terrain::Road, 2),
                    (Terrain::Mountains, 2),
                    (Terrain::River, 1),
                    (Terrain::Swamp, 1),
                    (Terrain::Desert, 1),
                ];
                let weights: Vec<u32> = inland.iter().map(|(_, w)| *w).collect();
                inland[rng.weighted(&weights)].0
            };
            tiles.push(HexTile { coord, terrain });
        }
    }
    tiles
}

fn spawn_settlements(
    sim: &mut Sim,
    content: &ContentTables,
    plan: &GenesisPlan,
    land: &[HexCoord],
    coastal: &[HexCoord],
) {
    let names = sim.state.rng.shuffle(&content.names.settlements);
    let mut used: Vec<HexCoord> = Vec::new();

    for (i, name) in names.iter().take(plan.settlements).enumerate() {
        let kind = match i {
            0 => SettlementKind::City,
            1 | 2 => SettlementKind::Town,
            _ => SettlementKind::Village,
        };
        let population = match kind {
            SettlementKind::City => 2500 + sim.state.rng.int(2500) as u32,
            SettlementKind::Town => 800 + sim.state.rng.int(800) as u32,
            SettlementKind::Village => 150 + sim.state.rng.int(300) as u32,
        };

        // Ports want the coast; everything else keeps its distance from
        // already-placed neighbors.
        let wants_coast = plan.coastal_bias && i % 2 == 0 && !coastal.is_empty();
        let pool = if wants_coast { coastal } else { land };
        let coord = pick_spaced(&mut sim.state.rng, pool, &used, 3).unwrap_or(HexCoord::new(0, 0));
        used.push(coord);

        let id = sim.next_id("stl");
        let mut settlement = Settlement::new(id, name.clone(), kind, coord, population);
        let on_coast = sim.world.terrain_at(coord) == Terrain::Coastal;
        if on_coast {
            let size = match kind {
                SettlementKind::City => PortSize::Great,
                SettlementKind::Town => PortSize::Major,
                SettlementKind::Village => PortSize::Minor,
            };
            settlement = settlement.with_port(PortAttributes {
                size,
                shipyard: kind != SettlementKind::Village,
                lighthouse: kind == SettlementKind::City,
            });
        }
        sim.world.settlements.insert(settlement);
    }
}

fn pick_spaced(
    rng: &mut SimRng,
    pool: &[HexCoord],
    used: &[HexCoord],
    min_distance: u32,
) -> Option<HexCoord> {
    // A few attempts at spacing, then take anything free.
    for _ in 0..10 {
        if pool.is_empty() {
            return None;
        }
        let candidate = pool[rng.int(pool.len() as u64) as usize];
        if used.iter().all(|u| u.distance(candidate) >= min_distance) {
            return Some(candidate);
        }
    }
    pool.iter().find(|c| !used.contains(c)).copied()
}

fn spawn_dungeons(sim: &mut Sim, content: &ContentTables, plan: &GenesisPlan, land: &[HexCoord]) {
    let names = sim.state.rng.shuffle(&content.names.dungeons);
    let settlement_coords: Vec<HexCoord> = sim.world.settlements.iter().map(|s| s.coord).collect();
    let mut used = settlement_coords.clone();

    for name in names.iter().take(plan.dungeons) {
        let coord = match pick_spaced(&mut sim.state.rng, land, &used, 2) {
            Some(c) => c,
            None => continue,
        };
        used.push(coord);
        let depth = 1 + sim.state.rng.int(4) as u8;
        let danger = 1 + sim.state.rng.int(4) as u8;
        let rooms = 4 + sim.state.rng.int(12) as u32;
        let id = sim.next_id("dgn");
        sim.world
            .dungeons
            .insert(Dungeon::new(id, name.clone(), coord, depth, danger, rooms));
    }
}

fn spawn_npcs(sim: &mut Sim, content: &ContentTables) {
    let settlement_ids = sim.world.settlements.ids();
    for settlement_id in settlement_ids {
        let kind = sim
            .world
            .settlements
            .get(&settlement_id)
            .map(|s| s.kind)
            .unwrap_or(SettlementKind::Village);
        let count = match kind {
            SettlementKind::City => 5,
            SettlementKind::Town => 4,
            SettlementKind::Village => 3,
        };
        let mut ruler: Option<String> = None;
        for i in 0..count {
            let first = sim
                .state
                .rng
                .pick(&content.names.npc_first)
                .cloned()
                .unwrap_or_else(|_| "Someone".to_string());
            let role = if i == 0 {
                "reeve".to_string()
            } else {
                sim.state
                    .rng
                    .pick(&content.names.npc_roles)
                    .cloned()
                    .unwrap_or_else(|_| "villager".to_string())
            };
            let id = sim.next_id("npc");
            let npc = Npc::new(id.clone(), first, role, settlement_id.clone());
            if i == 0 {
                ruler = Some(id);
            }
            sim.world.npcs.insert(npc);
        }
        // Towns and cities have someone worth assassinating.
        if kind != SettlementKind::Village {
            if let Some(ruler_id) = ruler {
                sim.settlement_state_mut(&settlement_id).ruler_npc_id = Some(ruler_id);
            }
        }
    }
}

fn spawn_factions(sim: &mut Sim, content: &ContentTables) {
    let names = sim.state.rng.shuffle(&content.names.factions);
    let focuses = [
        FactionFocus::Trade,
        FactionFocus::Military,
        FactionFocus::Religious,
        FactionFocus::Thieves,
    ];
    let settlement_ids = sim.world.settlements.ids();

    for (i, name) in names.iter().take(3).enumerate() {
        let id = sim.next_id("fct");
        let mut faction = Faction::new(id.clone(), name.clone(), focuses[i % focuses.len()]);
        faction.wealth = 500 + sim.state.rng.int(2000) as i64;
        for settlement_id in &settlement_ids {
            let attitude = sim.state.rng.int(7) as i32 - 3;
            faction.set_attitude(settlement_id.clone(), attitude);
        }
        sim.world.factions.insert(faction);

        // One sworn soul per faction keeps the loyalty paths warm.
        let npc_ids = sim.world.npcs.ids();
        if !npc_ids.is_empty() {
            let idx = sim.state.rng.int(npc_ids.len() as u64) as usize;
            sim.npc_adjunct_mut(&npc_ids[idx]).loyalty = Some(id);
        }
    }
}

fn spawn_parties(sim: &mut Sim, content: &ContentTables, plan: &GenesisPlan) {
    let names = sim.state.rng.shuffle(&content.names.parties);
    let settlement_coords: Vec<HexCoord> = sim.world.settlements.iter().map(|s| s.coord).collect();
    let classes = [
        CharacterClass::Fighter,
        CharacterClass::Wizard,
        CharacterClass::Cleric,
        CharacterClass::Rogue,
        CharacterClass::Ranger,
        CharacterClass::Bard,
    ];
    let goals = [PartyGoal::Explore, PartyGoal::SeekTreasure, PartyGoal::Defend];

    for (i, name) in names.iter().take(plan.parties).enumerate() {
        let coord = settlement_coords
            .get(i % settlement_coords.len().max(1))
            .copied()
            .unwrap_or(HexCoord::new(0, 0));
        let id = sim.next_id("pty");
        let size = 3 + sim.state.rng.int(3) as usize;
        let mut members = Vec::new();
        for _ in 0..size {
            let member_name = sim
                .state
                .rng
                .pick(&content.names.npc_first)
                .cloned()
                .unwrap_or_else(|_| "Nameless".to_string());
            let class = classes[sim.state.rng.int(classes.len() as u64) as usize];
            let level = 1 + sim.state.rng.int(3) as u8;
            members.push(PartyMember::new(member_name, class, level));
        }
        let mut party = Party::new(id, name.clone(), coord).with_members(members);
        party.goal = goals[sim.state.rng.int(goals.len() as u64) as usize];
        sim.world.parties.insert(party);
    }
}

fn spawn_antagonist(sim: &mut Sim, content: &ContentTables) {
    let archetypes = ["bandit-chief", "orc-warlord", "dark-wizard", "cult-leader"];
    let present: Vec<&str> = archetypes
        .iter()
        .filter(|a| content.archetypes.contains_key(**a))
        .copied()
        .collect();
    if present.is_empty() {
        return;
    }
    let archetype = present[sim.state.rng.int(present.len() as u64) as usize];
    let territory = match sim.world.settlements.ids().first().cloned() {
        Some(t) => t,
        None => return,
    };
    // Genesis keeps its own counsel; the spawn log is discarded.
    let mut scratch = Vec::new();
    crate::systems::antagonist::spawn_antagonist(
        sim,
        content,
        archetype,
        &territory,
        None,
        &mut scratch,
    );
}

fn spawn_naval(sim: &mut Sim, content: &ContentTables, plan: &GenesisPlan) {
    let ports: Vec<(String, HexCoord)> = sim
        .world
        .settlements
        .iter()
        .filter(|s| s.is_port())
        .map(|s| (s.id.clone(), s.coord))
        .collect();

    // Sea lanes between every pair of ports.
    for (i, (from, from_coord)) in ports.iter().enumerate() {
        for (to, to_coord) in ports.iter().skip(i + 1) {
            let distance_days = (f64::from(from_coord.distance(*to_coord)) / 4.0).ceil().max(1.0) as u32;
            let danger = 1 + sim.state.rng.int(4) as u8;
            let goods_pool = Good::all();
            let good = goods_pool[sim.state.rng.int(goods_pool.len() as u64) as usize];
            let id = sim.next_id("rte");
            sim.state.naval.routes.insert(SeaRoute {
                id,
                from: from.clone(),
                to: to.clone(),
                distance_days,
                danger: danger.clamp(1, 4),
                primary_goods: vec![good],
            });
        }
    }

    // A working ship or two per port.
    let ship_names = sim.state.rng.shuffle(&content.names.ships);
    let mut name_iter = ship_names.into_iter();
    let type_keys: Vec<String> = content.ship_types.keys().cloned().collect();
    for (port_id, _) in &ports {
        let count = 1 + sim.state.rng.int(2);
        for _ in 0..count {
            let Some(name) = name_iter.next() else {
                break;
            };
            let type_key = type_keys[sim.state.rng.int(type_keys.len() as u64) as usize].clone();
            let config = match content.ship_types.get(&type_key) {
                Some(c) => c,
                None => continue,
            };
            let id = sim.next_id("shp");
            sim.world.ships.insert(Ship {
                id,
                name,
                ship_type: type_key,
                owner: port_id.clone(),
                status: ShipStatus::Docked,
                home_port: port_id.clone(),
                current_location: port_id.clone(),
                destination: None,
                departed_at: None,
                arrives_at: None,
                cargo: BTreeMap::new(),
                crew: config.crew,
                marines: config.marines,
                condition: 100,
            });
        }
        sim.state
            .naval
            .port_activity
            .insert(PortActivity::new(port_id.clone()));
    }

    // Pirates work the lanes from the start.
    let route_ids = sim.state.naval.routes.ids();
    if route_ids.is_empty() {
        return;
    }
    let fleet_names = sim.state.rng.shuffle(&content.names.pirate_fleets);
    for name in fleet_names.into_iter().take(plan.pirates) {
        let captain = sim
            .state
            .rng
            .pick(&content.names.pirate_captains)
            .cloned()
            .unwrap_or_else(|_| "the Nameless Captain".to_string());
        let territory: Vec<String> = route_ids
            .iter()
            .filter(|_| sim.state.rng.chance(0.6))
            .cloned()
            .collect();
        let territory = if territory.is_empty() {
            vec![route_ids[0].clone()]
        } else {
            territory
        };
        let id = sim.next_id("prt");
        sim.world.pirates.insert(PirateFleet {
            id,
            name,
            captain,
            ships: 1 + sim.state.rng.int(3) as u32,
            crew: 30 + sim.state.rng.int(60) as u32,
            territory,
            notoriety: 5 + sim.state.rng.int(15) as u8,
            last_raid: None,
            bounty: 0,
            active: true,
        });
    }
}

fn initial_weather(sim: &mut Sim, content: &ContentTables) {
    let season = sim.meta.world_time.season();
    if let Some(odds) = content.weather_odds.get(&season) {
        if !odds.is_empty() {
            let weights: Vec<u32> = odds.iter().map(|o| o.weight).collect();
            let idx = sim.state.rng.weighted(&weights);
            sim.world.weather = Weather {
                kind: odds[idx].kind,
                since: sim.meta.world_time,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_is_deterministic() {
        let content = ContentTables::default();
        let a = genesis("alpha", WorldArchetype::Standard, &content);
        let b = genesis("alpha", WorldArchetype::Standard, &content);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_different_seeds_differ() {
        let content = ContentTables::default();
        let a = genesis("alpha", WorldArchetype::Standard, &content);
        let b = genesis("beta", WorldArchetype::Standard, &content);
        assert_ne!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_standard_world_is_populated() {
        let content = ContentTables::default();
        let sim = genesis("alpha", WorldArchetype::Standard, &content);
        assert!(sim.world.settlements.len() >= 1);
        assert!(sim.world.parties.len() >= 1);
        assert!(sim.world.dungeons.len() >= 1);
        assert!(sim.world.npcs.len() >= 3);
        assert_eq!(sim.world.factions.len(), 3);
        assert_eq!(sim.world.antagonists.len(), 1);
        assert_eq!(sim.meta.turn_index, 0);
        assert_eq!(sim.meta.world_time, WorldTime::start());
    }

    #[test]
    fn test_maritime_world_has_sea_life() {
        let content = ContentTables::default();
        let sim = genesis("salt", WorldArchetype::Maritime, &content);
        let ports = sim.world.settlements.iter().filter(|s| s.is_port()).count();
        assert!(ports >= 2, "maritime worlds need ports, got {}", ports);
        assert!(!sim.state.naval.routes.is_empty());
        assert!(!sim.world.ships.is_empty());
        assert!(!sim.world.pirates.is_empty());
    }

    #[test]
    fn test_frontier_world_is_wilder() {
        let content = ContentTables::default();
        let frontier = genesis("edge", WorldArchetype::Frontier, &content);
        let standard = genesis("edge", WorldArchetype::Standard, &content);
        assert!(frontier.world.dungeons.len() > standard.world.dungeons.len());
        assert!(frontier.world.settlements.len() < standard.world.settlements.len());
    }

    #[test]
    fn test_map_is_bounded_and_ringed() {
        let content = ContentTables::default();
        let sim = genesis("map", WorldArchetype::Standard, &content);
        let origin = HexCoord::new(0, 0);
        for tile in &sim.world.hexes {
            assert!(tile.coord.distance(origin) <= MAP_RADIUS as u32);
            if tile.coord.distance(origin) == MAP_RADIUS as u32 {
                assert_eq!(tile.terrain, Terrain::Ocean);
            }
        }
    }
}
