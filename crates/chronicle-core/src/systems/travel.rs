//! Travel and Encounters
//!
//! Hourly movement for parties and caravans, and the encounter rolls that
//! make the roads dangerous. Encounter odds follow terrain, darkness,
//! weather, and the moon.

use chronicle_events::{LogCategory, LogEntry, MoonPhase};
use tracing::debug;

use crate::components::party::{PartyGoal, PartyStatus, TravelPlan};
use crate::components::world::{HexCoord, Landmark, Terrain};
use crate::content::{ContentTables, CreatureEntry};
use crate::state::Sim;
use crate::systems::consequence::ConsequenceKind;
use crate::systems::{prose, treasure};

/// Miles of road one hex spans.
const MILES_PER_HEX: f64 = 6.0;

/// Chance an idle, rested party sets out in a given hour.
const DEPARTURE_CHANCE: f64 = 0.12;

/// Chance a quiet hour turns up a landmark instead of trouble.
const DISCOVERY_CHANCE: f64 = 0.05;

/// Hourly tick for all parties, in registry order.
pub fn travel_tick(sim: &mut Sim, content: &ContentTables, logs: &mut Vec<LogEntry>) {
    let party_ids = sim.world.parties.ids();
    for party_id in party_ids {
        tick_party(sim, content, &party_id, logs);
    }
}

fn tick_party(sim: &mut Sim, content: &ContentTables, party_id: &str, logs: &mut Vec<LogEntry>) {
    let Some(party) = sim.world.parties.get(party_id) else {
        return;
    };
    let party_name = party.name.clone();

    // Wounded parties rest before anything else.
    if party.rest_hours_remaining > 0 {
        let recovered = match sim.world.parties.get_mut(party_id) {
            Some(p) => {
                p.rest_hours_remaining -= 1;
                if p.rest_hours_remaining == 0 {
                    p.wounded = false;
                    true
                } else {
                    false
                }
            }
            None => false,
        };
        if recovered {
            logs.push(sim.log(
                LogCategory::Travel,
                format!("{} are rested and fit to move again", party_name),
            ));
        }
        return;
    }

    match party.status {
        PartyStatus::Idle => maybe_depart(sim, content, party_id, logs),
        PartyStatus::Travel => advance_travel(sim, content, party_id, &party_name, logs),
    }
}

/// Picks a destination in line with the party's goal.
fn choose_destination(sim: &mut Sim, party_id: &str) -> Option<(HexCoord, String)> {
    let (location, goal) = sim
        .world
        .parties
        .get(party_id)
        .map(|p| (p.location, p.goal))?;

    let dungeon_targets: Vec<(HexCoord, String)> = sim
        .world
        .dungeons
        .iter()
        .filter(|d| !d.cleared && d.coord != location)
        .map(|d| (d.coord, d.name.clone()))
        .collect();
    let settlement_targets: Vec<(HexCoord, String)> = sim
        .world
        .settlements
        .iter()
        .filter(|s| s.coord != location)
        .map(|s| (s.coord, s.name.clone()))
        .collect();

    let pool = match goal {
        PartyGoal::Explore | PartyGoal::SeekTreasure if !dungeon_targets.is_empty() => {
            dungeon_targets
        }
        _ if !settlement_targets.is_empty() => settlement_targets,
        _ => dungeon_targets,
    };
    if pool.is_empty() {
        return None;
    }
    let idx = sim.state.rng.int(pool.len() as u64) as usize;
    Some(pool[idx].clone())
}

fn maybe_depart(sim: &mut Sim, _content: &ContentTables, party_id: &str, logs: &mut Vec<LogEntry>) {
    if !sim.state.rng.chance(DEPARTURE_CHANCE) {
        return;
    }
    let Some((destination, destination_name)) = choose_destination(sim, party_id) else {
        return;
    };
    let Some(party) = sim.world.parties.get(party_id) else {
        return;
    };
    let origin = party.location;
    let party_name = party.name.clone();
    let terrain = route_terrain(sim, origin, destination);
    let miles = f64::from(origin.distance(destination)) * MILES_PER_HEX;

    if let Some(p) = sim.world.parties.get_mut(party_id) {
        p.begin_travel(TravelPlan {
            destination,
            destination_name: destination_name.clone(),
            miles_remaining: miles,
            terrain,
        });
    }
    logs.push(
        sim.log(
            LogCategory::Travel,
            format!("{} set out for {}", party_name, destination_name),
        )
        .with_actor(party_name),
    );
}

/// Dominant terrain of a route: the rougher of the two endpoints, with
/// water flattened to coastal travel.
fn route_terrain(sim: &Sim, from: HexCoord, to: HexCoord) -> Terrain {
    let a = sim.world.terrain_at(from);
    let b = sim.world.terrain_at(to);
    let pick = if a.encounter_odds() >= b.encounter_odds() { a } else { b };
    if pick.is_water() {
        Terrain::Coastal
    } else {
        pick
    }
}

fn advance_travel(
    sim: &mut Sim,
    content: &ContentTables,
    party_id: &str,
    party_name: &str,
    logs: &mut Vec<LogEntry>,
) {
    let Some(plan) = sim.world.parties.get(party_id).and_then(|p| p.travel.clone()) else {
        // Status said travel but no plan exists; force consistency.
        if let Some(p) = sim.world.parties.get_mut(party_id) {
            p.status = PartyStatus::Idle;
        }
        return;
    };

    // Arrivals resolve before any more road is eaten.
    if plan.miles_remaining <= 0.0 {
        arrive(sim, content, party_id, party_name, &plan, logs);
        return;
    }

    let weather_mod = content.effects_for(sim.world.weather.kind).travel_speed_mod;
    let miles = plan.terrain.miles_per_hour() * weather_mod;
    let mut arrived = false;
    if let Some(p) = sim.world.parties.get_mut(party_id) {
        if let Some(t) = p.travel.as_mut() {
            t.miles_remaining -= miles;
            arrived = t.miles_remaining <= 0.0;
        }
    }
    if arrived {
        let plan = match sim.world.parties.get(party_id).and_then(|p| p.travel.clone()) {
            Some(plan) => plan,
            None => return,
        };
        arrive(sim, content, party_id, party_name, &plan, logs);
        return;
    }

    maybe_encounter(sim, content, party_id, party_name, plan.terrain, logs);
}

fn arrive(
    sim: &mut Sim,
    content: &ContentTables,
    party_id: &str,
    party_name: &str,
    plan: &TravelPlan,
    logs: &mut Vec<LogEntry>,
) {
    if let Some(p) = sim.world.parties.get_mut(party_id) {
        p.arrive();
        p.fatigue = p.fatigue.saturating_add(1);
    }
    let ctx = prose::SceneContext {
        time: sim.meta.world_time,
        weather: sim.world.weather.kind,
        terrain: Some(plan.terrain),
        mood: sim.world.settlement_at(plan.destination).map(|s| s.mood),
    };
    let p = prose::arrival_prose(&mut sim.state.rng, &ctx, party_name, &plan.destination_name);
    logs.push(
        sim.log(LogCategory::Travel, p.summary)
            .with_details(p.details)
            .at(plan.destination_name.clone())
            .with_actor(party_name.to_string()),
    );

    // Arriving at a dungeon means going in.
    let dungeon_id = sim
        .world
        .dungeons
        .iter()
        .find(|d| d.coord == plan.destination && !d.cleared)
        .map(|d| d.id.clone());
    if let Some(dungeon_id) = dungeon_id {
        explore_dungeon(sim, content, party_id, party_name, &dungeon_id, logs);
    }
}

fn explore_dungeon(
    sim: &mut Sim,
    content: &ContentTables,
    party_id: &str,
    party_name: &str,
    dungeon_id: &str,
    logs: &mut Vec<LogEntry>,
) {
    let Some((dungeon_name, danger)) = sim
        .world
        .dungeons
        .get(dungeon_id)
        .map(|d| (d.name.clone(), d.danger))
    else {
        return;
    };

    if let Some(d) = sim.world.dungeons.get_mut(dungeon_id) {
        d.explore_room();
    }
    logs.push(
        sim.log(
            LogCategory::Discovery,
            format!("{} delve into {}", party_name, dungeon_name),
        )
        .with_actor(party_name.to_string()),
    );

    // Deeper danger, richer tables.
    let type_key = match danger {
        1 => "C",
        2 => "D",
        3 => "E",
        4 => "A",
        _ => "H",
    };
    treasure::discover_treasure(sim, content, party_id, type_key, Some(dungeon_id), logs);

    let cleared = sim.world.dungeons.get(dungeon_id).map(|d| d.cleared).unwrap_or(false);
    if cleared {
        logs.push(sim.log(
            LogCategory::Discovery,
            format!("{} stands cleared and silent", dungeon_name),
        ));
    }
}

/// Encounter probability for this hour of travel.
fn encounter_odds(sim: &Sim, content: &ContentTables, terrain: Terrain) -> f64 {
    let mut odds = terrain.encounter_odds();
    if odds <= 0.0 {
        return 0.0;
    }
    if sim.meta.world_time.is_night() && terrain != Terrain::Road {
        odds *= 1.5;
    }
    odds *= content.effects_for(sim.world.weather.kind).encounter_chance_mod;
    if sim.meta.world_time.moon_phase() == MoonPhase::Full {
        odds *= 1.2;
    }
    odds
}

fn maybe_encounter(
    sim: &mut Sim,
    content: &ContentTables,
    party_id: &str,
    party_name: &str,
    terrain: Terrain,
    logs: &mut Vec<LogEntry>,
) {
    let odds = encounter_odds(sim, content, terrain);
    if !sim.state.rng.chance(odds) {
        // A quiet hour can still turn up something worth marking on a map.
        if sim.state.rng.chance(DISCOVERY_CHANCE) {
            discover_landmark(sim, content, party_id, party_name, logs);
        }
        return;
    }

    let pool = content.creatures_for(terrain);
    if pool.is_empty() {
        debug!(?terrain, "no creature table for terrain, encounter skipped");
        return;
    }
    let weights: Vec<u32> = pool.iter().map(|c| c.weight).collect();
    let idx = sim.state.rng.weighted(&weights);
    let creature: CreatureEntry = (*pool[idx]).clone();

    let named = sim.state.rng.chance(creature.named_chance);
    let horde = sim.state.rng.chance(creature.horde_chance);

    // Reaction: 2d6, range 2-12. Ten and up is friendly, six and up wary.
    let reaction = sim.state.rng.die(6) + sim.state.rng.die(6);
    let hostile = creature.always_hostile || reaction < 6;
    let cautious = !hostile && reaction < 10;

    let ctx = prose::SceneContext {
        time: sim.meta.world_time,
        weather: sim.world.weather.kind,
        terrain: Some(terrain),
        mood: None,
    };
    let creature_label = if horde {
        format!("a horde of {}", creature.name)
    } else {
        creature.name.clone()
    };
    let p = prose::encounter_prose(
        &mut sim.state.rng,
        &ctx,
        party_name,
        &creature_label,
        hostile,
        cautious,
    );
    logs.push(
        sim.log(LogCategory::Encounter, p.summary)
            .with_details(p.details)
            .with_actor(party_name.to_string()),
    );

    if hostile {
        resolve_hostile(sim, content, party_id, party_name, &creature, named, horde, logs);
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_hostile(
    sim: &mut Sim,
    content: &ContentTables,
    party_id: &str,
    party_name: &str,
    creature: &CreatureEntry,
    named: bool,
    horde: bool,
    logs: &mut Vec<LogEntry>,
) {
    let Some(strength) = sim.world.parties.get(party_id).map(|p| p.strength()) else {
        return;
    };
    let roll = sim.state.rng.next_f64();

    if roll < strength {
        // Victory.
        let xp = 100 + sim.state.rng.int(500);
        if let Some(p) = sim.world.parties.get_mut(party_id) {
            p.xp += xp;
        }
        sim.party_state_mut(party_id).shift_morale(1);
        logs.push(
            sim.log(
                LogCategory::Combat,
                format!("{} cut down the {}", party_name, creature.name),
            )
            .with_details(format!("The fight is worth {} measures of renown.", xp))
            .with_actor(party_name.to_string()),
        );

        let type_key = content.treasure_type_for(&creature.name).to_string();
        if type_key != "Nil" {
            treasure::discover_treasure(sim, content, party_id, &type_key, None, logs);
        }

        // A named foe or a broken horde leaves a power vacuum something
        // nastier may fill.
        if (named || horde) && sim.state.rng.chance(0.5) {
            let territory = sim
                .world
                .parties
                .get(party_id)
                .and_then(|p| sim.world.nearest_settlement(p.location))
                .map(|s| s.id.clone())
                .unwrap_or_default();
            if !territory.is_empty() {
                let archetype = if creature.name.contains("orc") {
                    "orc-warlord"
                } else {
                    "bandit-chief"
                };
                let due = 24 + sim.state.rng.int(72);
                let threat = 3 + sim.state.rng.int(5) as u8;
                sim.state.consequences.enqueue(
                    sim.meta.turn_index,
                    due,
                    3,
                    ConsequenceKind::SpawnAntagonist {
                        archetype: archetype.to_string(),
                        territory,
                        threat,
                    },
                );
            }
        }
    } else if roll < strength + 0.25 {
        // Defeat.
        let rest = 24 + sim.state.rng.int(24) as u32;
        let mut fallen: Option<String> = None;
        if let Some(p) = sim.world.parties.get_mut(party_id) {
            p.wounded = true;
            p.rest_hours_remaining = rest;
        }
        // A defeat can cost a life.
        if sim.state.rng.chance(0.15) {
            if let Some(p) = sim.world.parties.get_mut(party_id) {
                if p.members.len() > 1 {
                    let idx = sim.state.rng.int(p.members.len() as u64) as usize;
                    fallen = Some(p.members.remove(idx).name);
                }
            }
        }
        sim.party_state_mut(party_id).shift_morale(-2);
        let mut entry = sim.log(
            LogCategory::Combat,
            format!("{} are beaten bloody by the {}", party_name, creature.name),
        );
        if let Some(name) = fallen {
            entry = entry.with_details(format!("{} does not rise again.", name));
        }
        logs.push(entry.with_actor(party_name.to_string()));
    } else {
        // Flight.
        if let Some(p) = sim.world.parties.get_mut(party_id) {
            p.fatigue = p.fatigue.saturating_add(1);
        }
        logs.push(
            sim.log(
                LogCategory::Combat,
                format!("{} break and run from the {}", party_name, creature.name),
            )
            .with_actor(party_name.to_string()),
        );
    }
}

fn discover_landmark(
    sim: &mut Sim,
    content: &ContentTables,
    party_id: &str,
    party_name: &str,
    logs: &mut Vec<LogEntry>,
) {
    let Some(location) = sim.world.parties.get(party_id).map(|p| p.location) else {
        return;
    };
    let is_ruin = sim.state.rng.chance(0.5);
    let pool = if is_ruin {
        &content.names.ruins
    } else {
        &content.names.landmarks
    };
    let name = match sim.state.rng.pick(pool) {
        Ok(n) => n.clone(),
        Err(_) => return,
    };
    let id = sim.next_id("lmk");
    let discovered_at = sim.meta.world_time;
    sim.world.landmarks.insert(Landmark {
        id,
        name: name.clone(),
        coord: location,
        discovered_at,
        discovered_by: party_id.to_string(),
        is_ruin,
    });
    logs.push(
        sim.log(
            LogCategory::Discovery,
            format!("{} come across {}", party_name, name),
        )
        .with_actor(party_name.to_string()),
    );
}

/// Hourly caravan movement: arrivals deliver goods; the rest roll on.
pub fn caravan_tick(sim: &mut Sim, logs: &mut Vec<LogEntry>) {
    let now = sim.meta.world_time;
    let arrived: Vec<String> = sim
        .world
        .caravans
        .iter()
        .filter(|c| !c.robbed && c.arrives_at <= now)
        .map(|c| c.id.clone())
        .collect();

    for caravan_id in arrived {
        let Some((to, goods)) = sim
            .world
            .caravans
            .get(&caravan_id)
            .map(|c| (c.to.clone(), c.goods.clone()))
        else {
            continue;
        };
        for (good, amount) in goods {
            if let Some(s) = sim.world.settlements.get_mut(&to) {
                s.adjust_supply(good, amount as i32);
            }
        }
        let place = sim.world.display_name(&to);
        logs.push(
            sim.log(
                LogCategory::Settlement,
                format!("A caravan rolls into {}", place),
            )
            .at(place),
        );
        sim.world.caravans.retain(|c| c.id != caravan_id);
    }

    // Robbed caravans are wreckage; clear them after a day.
    sim.world
        .caravans
        .retain(|c| !(c.robbed && now.days_since(c.arrives_at) > 1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup;
    use crate::state::WorldArchetype;

    fn world() -> (Sim, ContentTables) {
        let content = ContentTables::default();
        let sim = setup::genesis("travel-test", WorldArchetype::Standard, &content);
        (sim, content)
    }

    #[test]
    fn test_zero_miles_arrives_immediately_once() {
        let (mut sim, content) = world();
        let party_id = sim.world.parties.ids()[0].clone();
        let destination = sim.world.settlements.iter().nth(1).map(|s| (s.coord, s.name.clone()));
        let (coord, name) = destination.unwrap();
        if let Some(p) = sim.world.parties.get_mut(&party_id) {
            p.begin_travel(TravelPlan {
                destination: coord,
                destination_name: name,
                miles_remaining: 0.0,
                terrain: Terrain::Clear,
            });
        }

        let mut logs = Vec::new();
        travel_tick(&mut sim, &content, &mut logs);
        let party = sim.world.parties.get(&party_id).unwrap();
        assert_eq!(party.status, PartyStatus::Idle);
        assert!(party.travel.is_none());
        assert_eq!(party.location, coord);
        let arrivals = logs
            .iter()
            .filter(|l| l.category == LogCategory::Travel && l.summary.contains("arrive"))
            .count();
        assert_eq!(arrivals, 1);
        let party_name = party.name.clone();

        // The next hour must not produce a second arrival.
        let mut more_logs = Vec::new();
        travel_tick(&mut sim, &content, &mut more_logs);
        assert!(!more_logs
            .iter()
            .any(|l| l.summary.contains("arrive") && l.actors.contains(&party_name)));
    }

    #[test]
    fn test_travel_consumes_miles() {
        let (mut sim, content) = world();
        let party_id = sim.world.parties.ids()[0].clone();
        if let Some(p) = sim.world.parties.get_mut(&party_id) {
            p.begin_travel(TravelPlan {
                destination: HexCoord::new(9, 9),
                destination_name: "far off".to_string(),
                miles_remaining: 100.0,
                terrain: Terrain::Clear,
            });
        }
        let mut logs = Vec::new();
        travel_tick(&mut sim, &content, &mut logs);
        let remaining = sim
            .world
            .parties
            .get(&party_id)
            .and_then(|p| p.travel.as_ref())
            .map(|t| t.miles_remaining)
            .unwrap();
        assert!(remaining < 100.0);
    }

    #[test]
    fn test_resting_party_does_not_move() {
        let (mut sim, content) = world();
        let party_id = sim.world.parties.ids()[0].clone();
        if let Some(p) = sim.world.parties.get_mut(&party_id) {
            p.wounded = true;
            p.rest_hours_remaining = 2;
        }
        let mut logs = Vec::new();
        travel_tick(&mut sim, &content, &mut logs);
        let party = sim.world.parties.get(&party_id).unwrap();
        assert_eq!(party.rest_hours_remaining, 1);
        assert_eq!(party.status, PartyStatus::Idle);

        travel_tick(&mut sim, &content, &mut logs);
        let party = sim.world.parties.get(&party_id).unwrap();
        assert_eq!(party.rest_hours_remaining, 0);
        assert!(!party.wounded);
    }

    #[test]
    fn test_night_multiplier_applies_off_road() {
        let (mut sim, content) = world();
        sim.meta.world_time = chronicle_events::WorldTime::from_ymd_hms(1372, 6, 2, 0, 0, 0).unwrap();
        let night = encounter_odds(&sim, &content, Terrain::Forest);
        sim.meta.world_time = chronicle_events::WorldTime::from_ymd_hms(1372, 6, 2, 12, 0, 0).unwrap();
        let day = encounter_odds(&sim, &content, Terrain::Forest);
        assert!(night > day);

        // Hour 23 is night, roads are exempt.
        sim.meta.world_time = chronicle_events::WorldTime::from_ymd_hms(1372, 6, 2, 23, 0, 0).unwrap();
        let road_night = encounter_odds(&sim, &content, Terrain::Road);
        sim.meta.world_time = chronicle_events::WorldTime::from_ymd_hms(1372, 6, 2, 12, 0, 0).unwrap();
        let road_day = encounter_odds(&sim, &content, Terrain::Road);
        assert_eq!(road_night, road_day);
    }

    #[test]
    fn test_caravan_delivery() {
        let (mut sim, _content) = world();
        let ids = sim.world.settlements.ids();
        let (from, to) = (ids[0].clone(), ids[1].clone());
        let before = sim.world.settlements.get(&to).unwrap().supplies[&crate::components::world::Good::Grain];
        let caravan_id = sim.next_id("crv");
        let now = sim.meta.world_time;
        sim.world.caravans.insert(crate::components::army::Caravan {
            id: caravan_id,
            from,
            to: to.clone(),
            goods: std::collections::BTreeMap::from([(crate::components::world::Good::Grain, 5)]),
            owner_faction: None,
            departed_at: now,
            arrives_at: now,
            robbed: false,
        });
        let mut logs = Vec::new();
        caravan_tick(&mut sim, &mut logs);
        assert!(sim.world.caravans.is_empty());
        let after = sim.world.settlements.get(&to).unwrap().supplies[&crate::components::world::Good::Grain];
        assert_eq!(after, before + 5);
    }
}
