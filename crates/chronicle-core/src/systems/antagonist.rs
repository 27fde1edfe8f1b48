//! Antagonists
//!
//! Generation of named threats from the archetype pools and their periodic
//! actions against the world. Actions run on a fixed cadence set by the
//! orchestrator; notoriety gates how far word of them travels.

use chronicle_events::{EventData, LogCategory, LogEntry, WorldEvent, WorldEventKind};
use tracing::debug;

use crate::components::antagonist::Antagonist;
use crate::components::story::RumorKind;
use crate::components::world::Good;
use crate::content::ContentTables;
use crate::state::Sim;
use crate::systems::{causality, story};

/// Hours between antagonist action rounds (weekly).
pub const ACT_INTERVAL_HOURS: u64 = 168;

/// Chance a notorious antagonist's deeds reach any given other settlement.
const RUMOR_SPREAD_CHANCE: f64 = 0.3;

/// Creates a new antagonist of the archetype and registers it. Returns the
/// new id, or `None` when the archetype is unknown (stale consequence).
pub fn spawn_antagonist(
    sim: &mut Sim,
    content: &ContentTables,
    archetype: &str,
    territory: &str,
    threat: Option<u8>,
    logs: &mut Vec<LogEntry>,
) -> Option<String> {
    let Some(pools) = content.archetypes.get(archetype) else {
        debug!(%archetype, "unknown archetype, spawn skipped");
        return None;
    };

    let threat = match threat {
        Some(t) => t.clamp(1, 10),
        None => 3 + sim.state.rng.int(5) as u8,
    };
    let name = sim
        .state
        .rng
        .pick(&content.names.antagonist_names)
        .cloned()
        .unwrap_or_else(|_| "The Nameless".to_string());
    let epithet = sim.state.rng.pick(&pools.epithets).cloned().unwrap_or_default();
    let motivation = sim.state.rng.pick(&pools.motivations).cloned().unwrap_or_default();
    let trait_one = sim.state.rng.pick(&pools.traits).cloned().unwrap_or_default();
    let weakness = sim.state.rng.pick(&pools.weaknesses).cloned().unwrap_or_default();

    let followers = 5 + sim.state.rng.int(u64::from(threat) * 10) as u32;
    let treasure = 100 * i64::from(threat) + sim.state.rng.int(500) as i64;

    let id = sim.next_id("ant");
    let antagonist = Antagonist {
        id: id.clone(),
        name,
        epithet,
        archetype: archetype.to_string(),
        threat,
        territory: territory.to_string(),
        motivation,
        notoriety: 1,
        defeats: 0,
        victories: 0,
        followers,
        treasure,
        alive: true,
        traits: vec![trait_one],
        weaknesses: vec![weakness],
    };
    let display = antagonist.display_name();
    sim.world.antagonists.insert(antagonist);

    let place = sim.world.display_name(territory);
    logs.push(
        sim.log(
            LogCategory::Antagonist,
            format!("{} rises to trouble {}", display, place),
        )
        .at(place)
        .with_actor(display.clone()),
    );
    Some(id)
}

/// Action round for every living antagonist. The orchestrator calls this
/// on the weekly cadence boundary only.
pub fn antagonist_act_round(sim: &mut Sim, content: &ContentTables, logs: &mut Vec<LogEntry>) {
    let ids = sim.world.antagonists.ids();
    for id in ids {
        let alive = sim.world.antagonists.get(&id).map(|a| a.alive).unwrap_or(false);
        if alive {
            act(sim, content, &id, logs);
        }
    }
}

fn act(sim: &mut Sim, content: &ContentTables, antagonist_id: &str, logs: &mut Vec<LogEntry>) {
    let Some((display, archetype, territory, threat)) = sim
        .world
        .antagonists
        .get(antagonist_id)
        .map(|a| (a.display_name(), a.archetype.clone(), a.territory.clone(), a.threat))
    else {
        return;
    };

    let action = content
        .archetypes
        .get(&archetype)
        .and_then(|pools| sim.state.rng.pick(&pools.actions).ok().cloned())
        .unwrap_or_else(|| "is seen abroad".to_string());

    let follower_growth = 1 + sim.state.rng.int(3) as u32;
    if let Some(a) = sim.world.antagonists.get_mut(antagonist_id) {
        a.shift_notoriety(1);
        a.followers += follower_growth;
        a.victories += 1;
    }

    let place = sim.world.display_name(&territory);
    logs.push(
        sim.log(LogCategory::Antagonist, format!("{} {}", display, action))
            .at(place.clone())
            .with_actor(display.clone()),
    );

    apply_archetype_effect(sim, content, antagonist_id, &archetype, &territory, threat, &display, logs);

    // Word travels once the name means something.
    let notorious = sim
        .world
        .antagonists
        .get(antagonist_id)
        .map(|a| a.is_notorious())
        .unwrap_or(false);
    if notorious {
        let other_settlements: Vec<String> = sim
            .world
            .settlements
            .ids()
            .into_iter()
            .filter(|s| s != &territory)
            .collect();
        for settlement_id in other_settlements {
            if sim.state.rng.chance(RUMOR_SPREAD_CHANCE) {
                story::spawn_rumor(
                    sim,
                    RumorKind::Antagonist,
                    format!("travelers' tales of {}", display),
                    &settlement_id,
                    Some(antagonist_id.to_string()),
                    5,
                );
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_archetype_effect(
    sim: &mut Sim,
    content: &ContentTables,
    antagonist_id: &str,
    archetype: &str,
    territory: &str,
    threat: u8,
    display: &str,
    logs: &mut Vec<LogEntry>,
) {
    match archetype {
        "bandit-chief" | "orc-warlord" | "sea-raider" => {
            // Stores bleed to raiders.
            let goods = Good::all();
            let idx = sim.state.rng.int(goods.len() as u64) as usize;
            let stolen = sim.state.rng.die(6) as i32 + 2;
            if let Some(s) = sim.world.settlements.get_mut(territory) {
                s.adjust_supply(goods[idx], -stolen);
            }
            if let Some(a) = sim.world.antagonists.get_mut(antagonist_id) {
                a.treasure += i64::from(stolen) * 10;
            }
        }
        "dragon" => {
            let goods = Good::all();
            let idx = sim.state.rng.int(goods.len() as u64) as usize;
            let burned = sim.state.rng.die(6) as i32 + i32::from(threat);
            if let Some(s) = sim.world.settlements.get_mut(territory) {
                s.adjust_supply(goods[idx], -burned);
                s.shift_mood(-2);
            }
        }
        "cult-leader" => {
            // One more soul slips toward the congregation.
            let locals: Vec<String> = sim
                .world
                .npcs
                .iter()
                .filter(|n| n.alive && n.location == territory)
                .map(|n| n.id.clone())
                .collect();
            if !locals.is_empty() {
                let idx = sim.state.rng.int(locals.len() as u64) as usize;
                if let Some(npc) = sim.world.npcs.get_mut(&locals[idx]) {
                    npc.shift_reputation(-1);
                }
            }
        }
        "vampire" | "necromancer" => {
            // Someone does not come home.
            let locals: Vec<String> = sim
                .world
                .npcs
                .iter()
                .filter(|n| n.alive && n.location == territory)
                .map(|n| n.id.clone())
                .collect();
            if !locals.is_empty() {
                let idx = sim.state.rng.int(locals.len() as u64) as usize;
                let victim = locals[idx].clone();
                let evt_id = sim.next_id("evt");
                let evt = WorldEvent::new(
                    evt_id,
                    WorldEventKind::Death,
                    sim.meta.world_time,
                    threat.clamp(1, 10),
                    EventData::Death {
                        victim: victim.clone(),
                        killed_by: Some(antagonist_id.to_string()),
                        cause: Some(format!("the hunger of {}", display)),
                        relationships: Vec::new(),
                    },
                )
                .at(territory.to_string())
                .with_victims(vec![victim])
                .with_perpetrators(vec![antagonist_id.to_string()]);
                logs.extend(causality::process_world_event(sim, content, evt));
            }
        }
        _ => {}
    }
}
