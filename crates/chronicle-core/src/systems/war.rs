//! War Machine
//!
//! Army supply and marching on the hourly clock; battles when hostile
//! armies meet; faction operations and war declarations on the daily
//! clock. Battle outcomes feed the causality engine so morale, power, and
//! enmity all move through one pipeline.

use chronicle_events::{EventData, LogCategory, LogEntry, WorldEvent, WorldEventKind};

use crate::components::army::{Army, ArmyStatus, Caravan};
use crate::components::faction::{FactionFocus, FactionOperation, OperationKind};
use crate::components::world::{Good, HexCoord};
use crate::content::ContentTables;
use crate::state::Sim;
use crate::systems::causality;
use crate::systems::consequence::FactionActionKind;

/// Hours between one-hex march steps.
const MARCH_STEP_HOURS: u64 = 4;

/// Hours between supply decrements.
const SUPPLY_DECAY_HOURS: u64 = 12;

/// Hex range a supply line can cover.
const SUPPLY_RANGE: u32 = 5;

/// Hourly army pass: supplies, marching, and meeting engagements.
pub fn army_tick(sim: &mut Sim, content: &ContentTables, logs: &mut Vec<LogEntry>) {
    supply_pass(sim, logs);
    march_pass(sim, logs);
    engagement_pass(sim, content, logs);

    // The broken and starved melt away.
    let destroyed: Vec<(String, String)> = sim
        .world
        .armies
        .iter()
        .filter(|a| a.is_destroyed())
        .map(|a| (a.id.clone(), a.owner_id.clone()))
        .collect();
    for (army_id, owner) in destroyed {
        let owner_name = sim.world.display_name(&owner);
        logs.push(sim.log(
            LogCategory::War,
            format!("An army of {} disbands, spent and broken", owner_name),
        ));
        sim.world.armies.retain(|a| a.id != army_id);
    }
}

fn supply_pass(sim: &mut Sim, logs: &mut Vec<LogEntry>) {
    if sim.meta.turn_index % SUPPLY_DECAY_HOURS != 0 {
        return;
    }
    let army_ids = sim.world.armies.ids();
    for army_id in army_ids {
        let Some((location, line)) = sim
            .world
            .armies
            .get(&army_id)
            .map(|a| (a.location, a.supply_line_from.clone()))
        else {
            continue;
        };

        let fed = line
            .as_deref()
            .and_then(|s| sim.world.settlements.get(s))
            .map(|s| s.coord.distance(location) <= SUPPLY_RANGE)
            .unwrap_or(false);

        let starving_owner = match sim.world.armies.get_mut(&army_id) {
            Some(army) => {
                if fed {
                    army.shift_supplies(2);
                } else {
                    army.shift_supplies(-4);
                    army.supply_line_from = None;
                }
                if army.supplies == 0 {
                    let attrition = (army.strength / 50).max(1);
                    army.take_losses(attrition);
                    army.shift_morale(-1);
                    Some(army.owner_id.clone())
                } else {
                    None
                }
            }
            None => None,
        };
        if let Some(owner) = starving_owner {
            let owner_name = sim.world.display_name(&owner);
            logs.push(sim.log(
                LogCategory::War,
                format!("Hunger thins the ranks of {}'s army", owner_name),
            ));
        }
    }
}

/// One hex toward the target, every few hours.
fn step_toward(from: HexCoord, to: HexCoord) -> HexCoord {
    if from == to {
        return from;
    }
    let mut best = from;
    let mut best_distance = from.distance(to);
    for neighbor in from.neighbors() {
        let d = neighbor.distance(to);
        if d < best_distance {
            best = neighbor;
            best_distance = d;
        }
    }
    best
}

fn march_pass(sim: &mut Sim, logs: &mut Vec<LogEntry>) {
    if sim.meta.turn_index % MARCH_STEP_HOURS != 0 {
        return;
    }
    let army_ids = sim.world.armies.ids();
    for army_id in army_ids {
        let Some((status, target)) = sim
            .world
            .armies
            .get(&army_id)
            .map(|a| (a.status, a.target.clone()))
        else {
            continue;
        };
        if status != ArmyStatus::Marching {
            continue;
        }
        let Some(target_id) = target else {
            if let Some(a) = sim.world.armies.get_mut(&army_id) {
                a.status = ArmyStatus::Camped;
            }
            continue;
        };
        let Some(target_coord) = sim.world.settlements.get(&target_id).map(|s| s.coord) else {
            // Target gone; stand down.
            if let Some(a) = sim.world.armies.get_mut(&army_id) {
                a.status = ArmyStatus::Camped;
                a.target = None;
            }
            continue;
        };

        let arrived = {
            let Some(a) = sim.world.armies.get_mut(&army_id) else {
                continue;
            };
            a.location = step_toward(a.location, target_coord);
            a.location == target_coord
        };
        if arrived {
            let owner = sim
                .world
                .armies
                .get(&army_id)
                .map(|a| a.owner_id.clone())
                .unwrap_or_default();
            let holds = sim
                .state
                .faction_states
                .get(&owner)
                .map(|f| f.holds(&target_id))
                .unwrap_or(false);
            if let Some(a) = sim.world.armies.get_mut(&army_id) {
                a.status = if holds { ArmyStatus::Camped } else { ArmyStatus::Besieging };
            }
            if !holds {
                let place = sim.world.display_name(&target_id);
                let owner_name = sim.world.display_name(&owner);
                logs.push(
                    sim.log(
                        LogCategory::War,
                        format!("{}'s army invests {}", owner_name, place),
                    )
                    .at(place),
                );
            }
        }
    }
}

/// Opposed two-die field battle roll.
fn battle_roll(sim: &mut Sim, quality: u8, morale: u8) -> u64 {
    sim.state.rng.die(6) + sim.state.rng.die(6) + u64::from(quality) + u64::from(morale) / 3
}

fn engagement_pass(sim: &mut Sim, content: &ContentTables, logs: &mut Vec<LogEntry>) {
    // Hostile armies sharing a hex fight. First matching pair per hour.
    let armies: Vec<(String, String, HexCoord)> = sim
        .world
        .armies
        .iter()
        .map(|a| (a.id.clone(), a.owner_id.clone(), a.location))
        .collect();

    let mut engagement: Option<(String, String)> = None;
    'outer: for (i, (id_a, owner_a, loc_a)) in armies.iter().enumerate() {
        for (id_b, owner_b, loc_b) in armies.iter().skip(i + 1) {
            if loc_a != loc_b || owner_a == owner_b {
                continue;
            }
            let hostile = sim
                .state
                .faction_states
                .get(owner_a)
                .map(|f| f.enemies.contains(owner_b))
                .unwrap_or(false);
            if hostile {
                engagement = Some((id_a.clone(), id_b.clone()));
                break 'outer;
            }
        }
    }
    let Some((id_a, id_b)) = engagement else {
        return;
    };

    let Some((quality_a, morale_a, strength_a)) = sim
        .world
        .armies
        .get(&id_a)
        .map(|a| (a.quality, a.morale, a.strength))
    else {
        return;
    };
    let Some((quality_b, morale_b, strength_b)) = sim
        .world
        .armies
        .get(&id_b)
        .map(|a| (a.quality, a.morale, a.strength))
    else {
        return;
    };

    let roll_a = battle_roll(sim, quality_a, morale_a);
    let roll_b = battle_roll(sim, quality_b, morale_b);
    let (victor_id, loser_id) = if roll_a >= roll_b { (id_a, id_b) } else { (id_b, id_a) };

    // Casualties: the beaten side bleeds harder.
    let loser_losses = {
        let Some(loser) = sim.world.armies.get(&loser_id) else {
            return;
        };
        (loser.strength / 5) + sim.state.rng.int(u64::from(loser.strength / 5).max(1)) as u32
    };
    let victor_losses = {
        let Some(victor) = sim.world.armies.get(&victor_id) else {
            return;
        };
        victor.strength / 10
    };
    if let Some(a) = sim.world.armies.get_mut(&loser_id) {
        a.take_losses(loser_losses);
        a.shift_morale(-2);
        a.status = ArmyStatus::Routed;
    }
    if let Some(a) = sim.world.armies.get_mut(&victor_id) {
        a.take_losses(victor_losses);
        a.shift_morale(1);
    }

    // Leaders fall into enemy hands now and then.
    if sim.state.rng.chance(0.2) {
        let loser_owner = sim
            .world
            .armies
            .get(&loser_id)
            .map(|a| a.owner_id.clone())
            .unwrap_or_default();
        let captured = format!("a captain of {}", sim.world.display_name(&loser_owner));
        if let Some(a) = sim.world.armies.get_mut(&victor_id) {
            a.captured_leaders.push(captured);
        }
    }

    let significance =
        ((strength_a.max(strength_b) / 50).clamp(2, 9) as u8).max((loser_losses / 30) as u8).clamp(1, 10);
    let location = sim
        .world
        .armies
        .get(&victor_id)
        .map(|a| a.location)
        .unwrap_or(HexCoord::new(0, 0));
    let near = sim.world.settlement_at(location).map(|s| s.id.clone());

    let evt_id = sim.next_id("evt");
    let mut evt = WorldEvent::new(
        evt_id,
        WorldEventKind::Battle,
        sim.meta.world_time,
        significance,
        EventData::Battle {
            victor: victor_id.clone(),
            loser: loser_id.clone(),
            significance,
        },
    )
    .with_actor(victor_id)
    .with_actor(loser_id);
    if let Some(near) = near {
        evt = evt.at(near);
    }
    logs.extend(causality::process_world_event(sim, content, evt));
}

/// Daily faction pass: casus belli escalation, one operation each, and
/// territory reconciliation.
pub fn faction_operations_daily(sim: &mut Sim, content: &ContentTables, logs: &mut Vec<LogEntry>) {
    let faction_ids = sim.world.factions.ids();
    for faction_id in faction_ids {
        escalate_casus_belli(sim, &faction_id, logs);
        run_one_operation(sim, content, &faction_id, logs);
    }
    reconcile_contested(sim);
}

/// A settlement is contested exactly when two or more factions claim it;
/// with a single claimant, that claimant is authoritative.
fn reconcile_contested(sim: &mut Sim) {
    let settlement_ids = sim.world.settlements.ids();
    for settlement_id in settlement_ids {
        let claimants: Vec<String> = sim
            .state
            .faction_states
            .iter()
            .filter(|f| f.holds(&settlement_id))
            .map(|f| f.id.clone())
            .collect();
        // Unclaimed settlements with no civic state yet stay lazy.
        if claimants.is_empty() && !sim.state.settlement_states.contains(&settlement_id) {
            continue;
        }
        let civic = sim.settlement_state_mut(&settlement_id);
        match claimants.len() {
            0 => civic.contested = false,
            1 => {
                civic.contested = false;
                civic.controlled_by = Some(claimants[0].clone());
            }
            _ => civic.contested = true,
        }
    }
}

fn escalate_casus_belli(sim: &mut Sim, faction_id: &str, logs: &mut Vec<LogEntry>) {
    let ready = {
        let fs = sim.faction_state_mut(faction_id);
        if fs.power < 30 {
            None
        } else {
            fs.casus_belli
                .iter()
                .position(|c| c.magnitude >= 5)
                .map(|pos| fs.casus_belli.remove(pos))
        }
    };
    let Some(grievance) = ready else {
        return;
    };
    let against = grievance.against.clone();
    sim.faction_state_mut(faction_id).declare_enemy(against.clone());

    let due = 24 + sim.state.rng.int(48);
    sim.state.consequences.enqueue(
        sim.meta.turn_index,
        due,
        4,
        crate::systems::consequence::ConsequenceKind::FactionAction {
            faction: faction_id.to_string(),
            action: FactionActionKind::DeclareWar,
            against: against.clone(),
        },
    );

    let name = sim.world.display_name(faction_id);
    let enemy = sim.world.display_name(&against);
    logs.push(
        sim.log(
            LogCategory::Faction,
            format!("{} declares war on {} over {}", name, enemy, grievance.reason),
        )
        .with_actors(vec![name, enemy]),
    );
}

fn preferred_operation(focus: FactionFocus) -> OperationKind {
    match focus {
        FactionFocus::Trade => OperationKind::TradeMission,
        FactionFocus::Military => OperationKind::RaidPreparation,
        FactionFocus::Religious => OperationKind::Recruit,
        FactionFocus::Arcane => OperationKind::Fortify,
        FactionFocus::Thieves => OperationKind::RaidPreparation,
    }
}

fn run_one_operation(sim: &mut Sim, content: &ContentTables, faction_id: &str, logs: &mut Vec<LogEntry>) {
    // Queue something when idle.
    let focus = sim
        .world
        .factions
        .get(faction_id)
        .map(|f| f.focus)
        .unwrap_or(FactionFocus::Trade);
    {
        let needs_work = sim.faction_state_mut(faction_id).operations.is_empty();
        if needs_work && sim.state.rng.chance(0.3) {
            let target = sim
                .world
                .settlements
                .iter()
                .next()
                .map(|s| s.id.clone())
                .unwrap_or_default();
            sim.faction_state_mut(faction_id)
                .operations
                .push(FactionOperation {
                    kind: preferred_operation(focus),
                    target,
                });
        }
    }

    let Some(operation) = ({
        let fs = sim.faction_state_mut(faction_id);
        if fs.operations.is_empty() {
            None
        } else {
            Some(fs.operations.remove(0))
        }
    }) else {
        return;
    };

    match operation.kind {
        OperationKind::Recruit => {
            let fs = sim.faction_state_mut(faction_id);
            fs.shift_power(1);
            fs.resources -= 10;
        }
        OperationKind::Fortify => {
            let held = sim
                .faction_state_mut(faction_id)
                .territory
                .first()
                .cloned()
                .unwrap_or(operation.target.clone());
            if sim.world.settlements.contains(&held) {
                let civic = sim.settlement_state_mut(&held);
                civic.defense_level = civic.defense_level.saturating_add(1).min(10);
            }
        }
        OperationKind::TradeMission => {
            spawn_faction_caravan(sim, faction_id, logs);
        }
        OperationKind::RaidPreparation => {
            // A prepared raid lands on an enemy's holding, if there is one.
            let enemy_holding = {
                let enemies = sim.faction_state_mut(faction_id).enemies.clone();
                enemies.iter().find_map(|e| {
                    sim.state
                        .faction_states
                        .get(e)
                        .and_then(|fs| fs.territory.first().cloned())
                })
            };
            if let Some(settlement) = enemy_holding {
                let evt_id = sim.next_id("evt");
                let damage = 2 + sim.state.rng.int(2) as u32;
                let evt = WorldEvent::new(
                    evt_id,
                    WorldEventKind::Raid,
                    sim.meta.world_time,
                    damage as u8,
                    EventData::Raid {
                        settlement: settlement.clone(),
                        damage,
                        casualties: 1,
                        loot: 50 + sim.state.rng.int(150) as i64,
                    },
                )
                .at(settlement)
                .with_perpetrators(vec![faction_id.to_string()]);
                logs.extend(causality::process_world_event(sim, content, evt));
            }
        }
    }
}

fn spawn_faction_caravan(sim: &mut Sim, faction_id: &str, logs: &mut Vec<LogEntry>) {
    let settlements = sim.world.settlements.ids();
    if settlements.len() < 2 {
        return;
    }
    let from_idx = sim.state.rng.int(settlements.len() as u64) as usize;
    let mut to_idx = sim.state.rng.int(settlements.len() as u64) as usize;
    if to_idx == from_idx {
        to_idx = (to_idx + 1) % settlements.len();
    }
    let from = settlements[from_idx].clone();
    let to = settlements[to_idx].clone();

    let distance = match (sim.world.settlements.get(&from), sim.world.settlements.get(&to)) {
        (Some(a), Some(b)) => a.coord.distance(b.coord),
        _ => return,
    };
    let goods_pool = Good::all();
    let good = goods_pool[sim.state.rng.int(goods_pool.len() as u64) as usize];
    let amount = 3 + sim.state.rng.int(6) as u32;
    if let Some(s) = sim.world.settlements.get_mut(&from) {
        s.adjust_supply(good, -(amount as i32));
    }

    let now = sim.meta.world_time;
    let caravan_id = sim.next_id("crv");
    sim.world.caravans.insert(Caravan {
        id: caravan_id,
        from: from.clone(),
        to: to.clone(),
        goods: std::collections::BTreeMap::from([(good, amount)]),
        owner_faction: Some(faction_id.to_string()),
        departed_at: now,
        arrives_at: now.plus_hours(i64::from(distance) * 6),
        robbed: false,
    });

    let from_name = sim.world.display_name(&from);
    let to_name = sim.world.display_name(&to);
    let faction_name = sim.world.display_name(faction_id);
    logs.push(
        sim.log(
            LogCategory::Faction,
            format!("{} send a caravan from {} to {}", faction_name, from_name, to_name),
        )
        .with_actor(faction_name),
    );
}

/// Dispatch target for scheduled faction actions.
pub fn faction_action(
    sim: &mut Sim,
    content: &ContentTables,
    faction_id: &str,
    action: FactionActionKind,
    against: &str,
    logs: &mut Vec<LogEntry>,
) {
    if !sim.world.factions.contains(faction_id) {
        return;
    }
    match action {
        FactionActionKind::Retaliate => {
            // Against a named threat: hunters go out.
            let Some((display, alive)) = sim
                .world
                .antagonists
                .get(against)
                .map(|a| (a.display_name(), a.alive))
            else {
                return;
            };
            if !alive {
                return;
            }
            let faction_name = sim.world.display_name(faction_id);
            if sim.state.rng.chance(0.5) {
                if let Some(a) = sim.world.antagonists.get_mut(against) {
                    a.defeats += 1;
                    a.followers = (a.followers * 4) / 5;
                }
                logs.push(sim.log(
                    LogCategory::Faction,
                    format!("{} strike back and bloody {}", faction_name, display),
                ));
            } else {
                sim.faction_state_mut(faction_id).recent_losses += 2;
                logs.push(sim.log(
                    LogCategory::Faction,
                    format!("{}'s reprisal against {} goes badly", faction_name, display),
                ));
            }
        }
        FactionActionKind::DeclareWar => {
            raise_army(sim, content, faction_id, against, logs);
        }
    }
}

fn raise_army(
    sim: &mut Sim,
    _content: &ContentTables,
    faction_id: &str,
    against: &str,
    logs: &mut Vec<LogEntry>,
) {
    // Muster at a held settlement, or the nearest friendly one.
    let muster = {
        let held = sim.faction_state_mut(faction_id).territory.first().cloned();
        held.or_else(|| {
            sim.world
                .factions
                .get(faction_id)
                .and_then(|f| {
                    f.attitudes
                        .iter()
                        .filter(|(_, &v)| v > 0)
                        .map(|(k, _)| k.clone())
                        .next()
                })
        })
    };
    let Some(muster_id) = muster else {
        return;
    };
    let Some(muster_coord) = sim.world.settlements.get(&muster_id).map(|s| s.coord) else {
        return;
    };
    let target = sim
        .state
        .faction_states
        .get(against)
        .and_then(|fs| fs.territory.first().cloned());

    let strength = 100 + sim.state.rng.int(200) as u32;
    let quality = 2 + sim.state.rng.int(3) as u8;
    let army_id = sim.next_id("arm");
    sim.world.armies.insert(Army {
        id: army_id,
        owner_id: faction_id.to_string(),
        location: muster_coord,
        strength,
        quality,
        morale: 7,
        status: if target.is_some() { ArmyStatus::Marching } else { ArmyStatus::Camped },
        target,
        supplies: 80,
        supply_line_from: Some(muster_id.clone()),
        captured_leaders: Vec::new(),
    });

    let faction_name = sim.world.display_name(faction_id);
    let place = sim.world.display_name(&muster_id);
    logs.push(
        sim.log(
            LogCategory::War,
            format!("{} muster {} spears at {}", faction_name, strength, place),
        )
        .at(place)
        .with_actor(faction_name),
    );
}
