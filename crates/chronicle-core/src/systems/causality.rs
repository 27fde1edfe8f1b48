//! Causality Engine
//!
//! World events describe what just happened; this module turns them into
//! state changes, further events, and log prose. Dispatch is total over the
//! event kinds: kinds with structured payloads get dedicated handlers, the
//! rest flow through the general handler and the universal post-processors:
//! witness memories, social drift, story threads, then rumor spread.

use chronicle_events::{
    EventData, LogCategory, LogEntry, RelationKind, WorldEvent, WorldEventKind,
};
use tracing::warn;

use crate::components::npc::{AgendaKind, Emotion, MemoryCategory};
use crate::components::party::{Quest, QuestKind};
use crate::components::story::RumorKind;
use crate::components::world::Good;
use crate::content::ContentTables;
use crate::state::Sim;
use crate::systems::consequence::{ConsequenceKind, FactionActionKind};
use crate::systems::{memory, story};

/// Hex distance within which a party counts as "nearby" a settlement.
const NEARBY_HEXES: u32 = 2;

/// Runs one world event through the full pipeline and returns its logs.
pub fn process_world_event(sim: &mut Sim, content: &ContentTables, evt: WorldEvent) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    sim.push_history(evt.clone());

    match &evt.data {
        EventData::Raid { .. } => handle_raid(sim, content, &evt, &mut logs),
        EventData::Battle { .. } => handle_battle(sim, &evt, &mut logs),
        EventData::Death { .. } => handle_death(sim, content, &evt, &mut logs),
        EventData::Robbery { .. } => handle_robbery(sim, &evt, &mut logs),
        EventData::Assassination { .. } => handle_assassination(sim, content, &evt, &mut logs),
        EventData::Conquest { .. } => handle_conquest(sim, &evt, &mut logs),
        EventData::Alliance { .. } => handle_alliance(sim, &evt, &mut logs),
        EventData::Betrayal { .. } => handle_betrayal(sim, &evt, &mut logs),
        EventData::General { .. } => handle_general(sim, &evt, &mut logs),
    }

    witnesses_form_memories(sim, &evt);
    social_shift(sim, &evt);
    story::update_threads(sim, &evt, &mut logs);
    story::spread_rumor(sim, &evt, &mut logs);

    logs
}

/// Faction an actor id resolves to: the faction itself, or the owner of an
/// army with that id.
fn resolve_faction(sim: &Sim, actor: &str) -> Option<String> {
    if sim.world.factions.contains(actor) {
        return Some(actor.to_string());
    }
    sim.world.armies.get(actor).map(|a| a.owner_id.clone())
}

fn handle_raid(sim: &mut Sim, content: &ContentTables, evt: &WorldEvent, logs: &mut Vec<LogEntry>) {
    let EventData::Raid {
        settlement,
        damage,
        casualties,
        loot,
    } = &evt.data
    else {
        return;
    };
    let (settlement_id, damage, casualties, loot) =
        (settlement.clone(), *damage, *casualties, *loot);

    let Some(settlement) = sim.world.settlements.get(&settlement_id) else {
        warn!(settlement = %settlement_id, "raid on unknown settlement dropped");
        return;
    };
    let settlement_name = settlement.name.clone();
    let settlement_coord = settlement.coord;

    // Stores suffer first.
    for _ in 0..damage {
        let goods = Good::all();
        let idx = sim.state.rng.int(goods.len() as u64) as usize;
        let hit = goods[idx];
        let lost = sim.state.rng.die(6) as i32 + 1;
        if let Some(s) = sim.world.settlements.get_mut(&settlement_id) {
            s.adjust_supply(hit, -lost);
        }
    }

    let mood_drop = (damage as i32 + 1) / 2;
    if let Some(s) = sim.world.settlements.get_mut(&settlement_id) {
        s.shift_mood(-mood_drop);
    }
    {
        let civic = sim.settlement_state_mut(&settlement_id);
        civic.safety -= damage as i32;
        civic.note_event("raided");
    }

    let perpetrator = evt.perpetrators.first().cloned();
    let raider_name = perpetrator
        .as_deref()
        .map(|p| sim.world.display_name(p))
        .unwrap_or_else(|| "raiders".to_string());

    logs.push(
        sim.log(
            LogCategory::Settlement,
            format!("{} is raided by {}", settlement_name, raider_name),
        )
        .with_details(format!(
            "Stores are plundered for some {} gold worth of goods.",
            loot
        ))
        .at(settlement_name.clone()),
    );

    if damage >= 3 {
        let civic = sim.settlement_state_mut(&settlement_id);
        civic.population_delta -= 10 * i64::from(damage);
        logs.push(
            sim.log(
                LogCategory::Settlement,
                format!("Refugees stream out of {}", settlement_name),
            )
            .at(settlement_name.clone()),
        );
    }

    // Casualties fall on the townsfolk.
    let local_npcs: Vec<String> = sim
        .world
        .npcs
        .iter()
        .filter(|n| n.alive && n.location == settlement_id)
        .map(|n| n.id.clone())
        .collect();
    for _ in 0..casualties {
        if local_npcs.is_empty() {
            break;
        }
        let idx = sim.state.rng.int(local_npcs.len() as u64) as usize;
        let npc_id = local_npcs[idx].clone();
        let still_alive = sim.world.npcs.get(&npc_id).map(|n| n.alive).unwrap_or(false);
        if !still_alive {
            continue;
        }
        if sim.state.rng.chance(0.3) {
            let death_id = sim.next_id("evt");
            let death = WorldEvent::new(
                death_id,
                WorldEventKind::Death,
                evt.timestamp,
                evt.magnitude,
                EventData::Death {
                    victim: npc_id.clone(),
                    killed_by: perpetrator.clone(),
                    cause: Some("raid".to_string()),
                    relationships: Vec::new(),
                },
            )
            .at(settlement_id.clone())
            .with_victims(vec![npc_id])
            .with_perpetrators(evt.perpetrators.clone());
            logs.extend(process_world_event(sim, content, death));
        } else {
            let target = perpetrator.clone().unwrap_or_else(|| "raiders".to_string());
            memory::remember(
                sim,
                &npc_id,
                MemoryCategory::WasAttacked,
                Emotion::Fearful,
                (3 + damage).clamp(1, 10) as u8,
                &target,
                false,
            );
            sim.npc_adjunct_mut(&npc_id).shift_morale(-3);
        }
    }

    // Factions that care about this place tally their losses.
    let caring: Vec<String> = sim
        .world
        .factions
        .iter()
        .filter(|f| f.attitude_toward(&settlement_id) > 0)
        .map(|f| f.id.clone())
        .collect();
    for faction_id in caring {
        let losses = {
            let fs = sim.faction_state_mut(&faction_id);
            fs.recent_losses += damage;
            fs.recent_losses
        };
        if losses >= 5 {
            if let Some(against) = perpetrator.clone() {
                let due = 6 + sim.state.rng.int(12);
                sim.state.consequences.enqueue(
                    sim.meta.turn_index,
                    due,
                    4,
                    ConsequenceKind::FactionAction {
                        faction: faction_id.clone(),
                        action: FactionActionKind::Retaliate,
                        against,
                    },
                );
            }
            sim.faction_state_mut(&faction_id).recent_losses = 0;
        }
    }

    // Nearby parties may take it personally.
    if let Some(perp) = perpetrator {
        let nearby: Vec<String> = sim
            .world
            .parties
            .iter()
            .filter(|p| p.location.distance(settlement_coord) <= NEARBY_HEXES)
            .map(|p| p.id.clone())
            .collect();
        let taken_at = sim.meta.world_time;
        for party_id in nearby {
            if sim.state.rng.chance(0.5) {
                let ps = sim.party_state_mut(&party_id);
                ps.vendetta = Some(perp.clone());
                ps.quests.push(Quest {
                    kind: QuestKind::Hunt,
                    target: perp.clone(),
                    taken_at,
                });
            }
        }
    }
}

fn handle_battle(sim: &mut Sim, evt: &WorldEvent, logs: &mut Vec<LogEntry>) {
    let EventData::Battle {
        victor,
        loser,
        significance,
    } = &evt.data
    else {
        return;
    };
    let (victor, loser) = (victor.clone(), loser.clone());
    let sig = i32::from((*significance).clamp(1, 10));

    let victor_name = sim.world.display_name(&victor);
    let loser_name = sim.world.display_name(&loser);
    logs.push(
        sim.log(
            LogCategory::Combat,
            format!("{} defeat {}", victor_name, loser_name),
        )
        .with_actors(vec![victor_name.clone(), loser_name.clone()]),
    );

    // Winning party.
    if sim.world.parties.contains(&victor) {
        if let Some(p) = sim.world.parties.get_mut(&victor) {
            p.fame += sig as u32;
        }
        let cleared = {
            let ps = sim.party_state_mut(&victor);
            ps.shift_morale(sig);
            if ps.vendetta.as_deref() == Some(loser.as_str()) {
                ps.vendetta = None;
                true
            } else {
                false
            }
        };
        if cleared {
            sim.party_state_mut(&victor).kills.push(loser_name.clone());
            logs.push(sim.log(
                LogCategory::Story,
                format!("{} settle their score with {}", victor_name, loser_name),
            ));
        }
    }

    // Losing party.
    if sim.world.parties.contains(&loser) {
        let rest = 24 + sim.state.rng.int(24) as u32;
        if let Some(p) = sim.world.parties.get_mut(&loser) {
            p.fame = p.fame.saturating_sub(1);
            p.wounded = true;
            p.rest_hours_remaining = rest;
        }
        sim.party_state_mut(&loser).shift_morale(-sig);
        if sig >= 3 && sim.state.rng.chance(0.5) {
            sim.party_state_mut(&loser).vendetta = Some(victor.clone());
        }
    }

    // Faction fortunes move with the field.
    let victor_faction = resolve_faction(sim, &victor);
    let loser_faction = resolve_faction(sim, &loser);

    if let Some(faction_id) = &victor_faction {
        let grew_bold = {
            let fs = sim.faction_state_mut(faction_id);
            fs.recent_wins += sig as u32;
            fs.shift_power(2 * sig);
            if fs.recent_wins >= 5 {
                fs.recent_wins = 0;
                true
            } else {
                false
            }
        };
        if grew_bold {
            let name = sim.world.display_name(faction_id);
            logs.push(sim.log(LogCategory::Faction, format!("{} grows bold", name)));
        }
    }
    if let Some(faction_id) = &loser_faction {
        let fs = sim.faction_state_mut(faction_id);
        fs.recent_losses += sig as u32;
        fs.shift_power(-2 * sig);
        fs.shift_morale(-sig);
        if let Some(enemy) = &victor_faction {
            fs.declare_enemy(enemy.clone());
        }
    }

    // A settlement that watched the fight grows uneasy.
    if let Some(location) = evt.location.clone() {
        if sim.world.settlements.contains(&location) {
            if let Some(s) = sim.world.settlements.get_mut(&location) {
                s.shift_mood(-1);
            }
            let civic = sim.settlement_state_mut(&location);
            civic.safety -= 1;
            if sig >= 3 {
                civic.shift_unrest(1);
            }
        }
    }
}

fn handle_death(sim: &mut Sim, _content: &ContentTables, evt: &WorldEvent, logs: &mut Vec<LogEntry>) {
    let EventData::Death {
        victim,
        killed_by,
        cause,
        relationships,
    } = &evt.data
    else {
        return;
    };
    let victim = victim.clone();
    let killed_by = killed_by.clone();
    let relationships = relationships.clone();

    let victim_name = sim.world.display_name(&victim);
    let summary = match (&killed_by, cause.as_deref()) {
        (Some(k), _) => format!("{} is slain by {}", victim_name, sim.world.display_name(k)),
        (None, Some(c)) => format!("{} dies of {}", victim_name, c),
        (None, None) => format!("{} dies", victim_name),
    };
    logs.push(sim.log(LogCategory::Settlement, summary).with_actor(victim_name.clone()));

    // The dead stop moving; their records remain addressable.
    let mut victim_fame = 0;
    let mut victim_home: Option<String> = None;
    let mut victim_loyalty: Option<String> = None;
    if let Some(npc) = sim.world.npcs.get_mut(&victim) {
        npc.alive = false;
        victim_fame = npc.fame;
        victim_home = Some(npc.location.clone());
    }
    if let Some(adjunct) = sim.state.npc_adjuncts.get(&victim) {
        victim_loyalty = adjunct.loyalty.clone();
    }

    // The bereaved remember.
    for tie in &relationships {
        let (category, emotion) = if tie.kind == RelationKind::Enemy {
            (MemoryCategory::WitnessedDeath, Emotion::Grateful)
        } else if killed_by.is_some() {
            (MemoryCategory::LostLovedOne, Emotion::Angry)
        } else {
            (MemoryCategory::Grieving, Emotion::Grieving)
        };
        let intensity = (5 + tie.strength).clamp(1, 10);
        memory::remember(sim, &tie.npc, category, emotion, intensity, &victim, false);

        if tie.kind.is_close() {
            if let Some(killer) = &killed_by {
                let priority = 7 + sim.state.rng.int(3) as u8;
                memory::form_agenda(sim, &tie.npc, AgendaKind::Revenge, killer, priority);
            }
        }
    }

    // A faction that counted the victim among its own feels it.
    if let Some(faction_id) = victim_loyalty {
        let fs = sim.faction_state_mut(&faction_id);
        fs.recent_losses += 2;
        fs.shift_morale(-2);
        if let Some(killer) = &killed_by {
            if let Some(killer_faction) = resolve_faction(sim, killer) {
                if killer_faction != faction_id {
                    sim.faction_state_mut(&faction_id).declare_enemy(killer_faction);
                }
            }
        }
    }

    // Famous dead are mourned publicly.
    if victim_fame >= 3 {
        if let Some(home) = victim_home {
            if let Some(s) = sim.world.settlements.get_mut(&home) {
                s.shift_mood(-2);
            }
            sim.settlement_state_mut(&home).shift_unrest(1);
            let place = sim.world.display_name(&home);
            logs.push(
                sim.log(
                    LogCategory::Settlement,
                    format!("{} mourns {}", place, victim_name),
                )
                .at(place.clone()),
            );
        }
    }

    // The fall of a named threat echoes everywhere.
    let fallen = sim.world.antagonists.get_mut(&victim).map(|a| {
        a.alive = false;
        a.defeats += 1;
        (a.display_name(), a.archetype.clone(), a.territory.clone(), a.threat)
    });
    if let Some((display, archetype, territory, threat)) = fallen {
        let settlement_ids = sim.world.settlements.ids();
        for settlement_id in settlement_ids {
            story::spawn_rumor(
                sim,
                RumorKind::Antagonist,
                format!("word that {} is dead at last", display),
                &settlement_id,
                Some(victim.clone()),
                6,
            );
        }
        if sim.state.rng.chance(0.5) {
            logs.push(sim.log(
                LogCategory::Antagonist,
                format!("The followers of {} scatter to the winds", display),
            ));
        } else {
            let due = 48 + sim.state.rng.int(72);
            sim.state.consequences.enqueue(
                sim.meta.turn_index,
                due,
                3,
                ConsequenceKind::SpawnAntagonist {
                    archetype,
                    territory,
                    threat,
                },
            );
            logs.push(sim.log(
                LogCategory::Antagonist,
                format!("The followers of {} whisper of a successor", display),
            ));
        }
    }
}

fn handle_robbery(sim: &mut Sim, evt: &WorldEvent, logs: &mut Vec<LogEntry>) {
    let EventData::Robbery {
        caravan,
        settlement,
        owner_faction,
        perpetrator_faction,
        value,
    } = &evt.data
    else {
        return;
    };
    let (caravan, value) = (*caravan, *value);
    let settlement = settlement.clone();
    let owner_faction = owner_faction.clone();
    let perpetrator_faction = perpetrator_faction.clone();

    if caravan {
        if let Some(settlement_id) = settlement {
            let civic = sim.settlement_state_mut(&settlement_id);
            civic.safety -= 2;
            civic.prosperity -= 1;
            let place = sim.world.display_name(&settlement_id);
            logs.push(
                sim.log(
                    LogCategory::Settlement,
                    format!("The roads near {} are called dangerous now", place),
                )
                .at(place.clone()),
            );
        }
    }

    if let (Some(owner), Some(perp)) = (owner_faction, perpetrator_faction) {
        if owner != perp {
            let fs = sim.faction_state_mut(&owner);
            fs.casus_belli.push(crate::components::faction::CasusBelli {
                against: perp.clone(),
                reason: "caravan robbery".to_string(),
                magnitude: 5,
            });
            fs.declare_enemy(perp);
        }
    }

    if let Some(perpetrator) = evt.perpetrators.first().cloned() {
        if sim.world.parties.contains(&perpetrator) {
            sim.party_state_mut(&perpetrator).resources += value;
        }
    }
}

fn handle_assassination(sim: &mut Sim, content: &ContentTables, evt: &WorldEvent, logs: &mut Vec<LogEntry>) {
    let EventData::Assassination {
        victim,
        killed_by,
        relationships,
    } = &evt.data
    else {
        return;
    };
    let victim = victim.clone();

    // An assassination is a death with political fallout.
    let death = WorldEvent {
        data: EventData::Death {
            victim: victim.clone(),
            killed_by: killed_by.clone(),
            cause: Some("assassination".to_string()),
            relationships: relationships.clone(),
        },
        ..evt.clone()
    };
    handle_death(sim, content, &death, logs);

    if let Some(location) = evt.location.clone() {
        sim.settlement_state_mut(&location).shift_unrest(3);
        let was_ruler = sim
            .state
            .settlement_states
            .get(&location)
            .map(|c| c.ruler_npc_id.as_deref() == Some(victim.as_str()))
            .unwrap_or(false);
        if was_ruler {
            let civic = sim.settlement_state_mut(&location);
            civic.ruler_npc_id = None;
            civic.contested = true;
            let place = sim.world.display_name(&location);
            logs.push(
                sim.log(
                    LogCategory::Settlement,
                    format!("{} is thrown into chaos with its ruler dead", place),
                )
                .at(place.clone()),
            );
        }
    }
}

fn handle_conquest(sim: &mut Sim, evt: &WorldEvent, logs: &mut Vec<LogEntry>) {
    let EventData::Conquest {
        conqueror,
        previous,
        location,
    } = &evt.data
    else {
        return;
    };
    let (conqueror, previous, location) = (conqueror.clone(), previous.clone(), location.clone());

    {
        let civic = sim.settlement_state_mut(&location);
        civic.controlled_by = Some(conqueror.clone());
        civic.contested = false;
    }
    {
        let fs = sim.faction_state_mut(&conqueror);
        fs.add_territory(location.clone());
        fs.shift_power(10);
    }
    if let Some(previous) = &previous {
        let fs = sim.faction_state_mut(previous);
        fs.remove_territory(&location);
        fs.shift_power(-10);
        fs.shift_morale(-3);
        fs.declare_enemy(conqueror.clone());
        sim.faction_state_mut(&conqueror).declare_enemy(previous.clone());
    }

    let welcomed = sim
        .world
        .factions
        .get(&conqueror)
        .map(|f| f.attitude_toward(&location) > 0)
        .unwrap_or(false);
    if let Some(s) = sim.world.settlements.get_mut(&location) {
        s.mood = if welcomed { 1 } else { -2 };
    }

    let place = sim.world.display_name(&location);
    let conqueror_name = sim.world.display_name(&conqueror);
    logs.push(
        sim.log(
            LogCategory::War,
            format!("{} falls to {}", place, conqueror_name),
        )
        .at(place.clone())
        .with_actor(conqueror_name.clone()),
    );
}

fn handle_alliance(sim: &mut Sim, evt: &WorldEvent, logs: &mut Vec<LogEntry>) {
    let EventData::Alliance { first, second } = &evt.data else {
        return;
    };
    let (first, second) = (first.clone(), second.clone());

    let enemies_first: Vec<String> = sim.faction_state_mut(&first).enemies.clone();
    let enemies_second: Vec<String> = sim.faction_state_mut(&second).enemies.clone();

    sim.faction_state_mut(&first).declare_ally(second.clone());
    sim.faction_state_mut(&second).declare_ally(first.clone());

    let first_name = sim.world.display_name(&first);
    let second_name = sim.world.display_name(&second);
    logs.push(
        sim.log(
            LogCategory::Faction,
            format!("{} and {} swear alliance", first_name, second_name),
        )
        .with_actors(vec![first_name.clone(), second_name.clone()]),
    );

    for common in enemies_first.iter().filter(|e| enemies_second.contains(e)) {
        let enemy_name = sim.world.display_name(common);
        logs.push(sim.log(
            LogCategory::Faction,
            format!("{} and {} unite against {}", first_name, second_name, enemy_name),
        ));
    }
}

fn handle_betrayal(sim: &mut Sim, evt: &WorldEvent, logs: &mut Vec<LogEntry>) {
    let EventData::Betrayal {
        perpetrator,
        victim_npc,
        victim_party,
        victim_faction,
    } = &evt.data
    else {
        return;
    };
    let perpetrator = perpetrator.clone();
    let victim_npc = victim_npc.clone();
    let victim_party = victim_party.clone();
    let victim_faction = victim_faction.clone();

    let perp_name = sim.world.display_name(&perpetrator);

    if let Some(npc_id) = &victim_npc {
        memory::remember(
            sim,
            npc_id,
            MemoryCategory::WasBetrayed,
            Emotion::Angry,
            10,
            &perpetrator,
            false,
        );
        memory::form_agenda(sim, npc_id, AgendaKind::Revenge, &perpetrator, 10);
        let victim_name = sim.world.display_name(npc_id);
        logs.push(
            sim.log(
                LogCategory::Story,
                format!("{} is betrayed by {}", victim_name, perp_name),
            )
            .with_actors(vec![victim_name, perp_name.clone()]),
        );
    }

    if let Some(party_id) = &victim_party {
        let ps = sim.party_state_mut(party_id);
        ps.vendetta = Some(perpetrator.clone());
        ps.shift_morale(-5);
        ps.add_enemy(perpetrator.clone());
    }

    if let Some(faction_id) = &victim_faction {
        sim.faction_state_mut(faction_id).declare_enemy(perpetrator.clone());
    }
}

fn handle_general(sim: &mut Sim, evt: &WorldEvent, logs: &mut Vec<LogEntry>) {
    let EventData::General { description } = &evt.data else {
        return;
    };
    let category = match evt.kind {
        WorldEventKind::Festival => LogCategory::Festival,
        WorldEventKind::Discovery => LogCategory::Discovery,
        WorldEventKind::Plague | WorldEventKind::Famine | WorldEventKind::Uprising => {
            LogCategory::Settlement
        }
        WorldEventKind::TradeDeal | WorldEventKind::Embargo | WorldEventKind::Recruitment
        | WorldEventKind::Defection => LogCategory::Faction,
        _ => LogCategory::Story,
    };
    let mut entry = sim.log(category, description.clone());
    if let Some(location) = &evt.location {
        entry = entry.at(sim.world.display_name(location));
    }
    logs.push(entry);
}

/// Witness memory category for an event kind, if the kind leaves a mark.
fn witness_category(kind: WorldEventKind) -> Option<(MemoryCategory, Emotion)> {
    match kind {
        WorldEventKind::Death | WorldEventKind::Assassination => {
            Some((MemoryCategory::WitnessedDeath, Emotion::Fearful))
        }
        WorldEventKind::Battle | WorldEventKind::Raid | WorldEventKind::Uprising => {
            Some((MemoryCategory::WitnessedBattle, Emotion::Fearful))
        }
        WorldEventKind::Miracle => Some((MemoryCategory::WitnessedMiracle, Emotion::Hopeful)),
        WorldEventKind::Robbery => Some((MemoryCategory::WitnessedCrime, Emotion::Suspicious)),
        WorldEventKind::Betrayal => Some((MemoryCategory::WitnessedBetrayal, Emotion::Suspicious)),
        WorldEventKind::Disaster | WorldEventKind::Plague | WorldEventKind::Famine => {
            Some((MemoryCategory::WitnessedDisaster, Emotion::Fearful))
        }
        WorldEventKind::Prophecy => Some((MemoryCategory::WitnessedProphecy, Emotion::Hopeful)),
        _ => None,
    }
}

/// Post-processor: bystanders at the scene may carry the sight with them.
fn witnesses_form_memories(sim: &mut Sim, evt: &WorldEvent) {
    if !evt.witnessed || evt.magnitude < 2 {
        return;
    }
    let Some((category, emotion)) = witness_category(evt.kind) else {
        return;
    };
    let Some(location) = evt.location.clone() else {
        return;
    };
    if !sim.world.settlements.contains(&location) {
        return;
    }
    let subject = evt
        .victims
        .first()
        .or_else(|| evt.actors.first())
        .or_else(|| evt.perpetrators.first())
        .cloned()
        .unwrap_or_else(|| location.clone());

    let bystanders: Vec<String> = sim
        .world
        .npcs
        .iter()
        .filter(|n| n.alive && n.location == location && !evt.involves(&n.id))
        .map(|n| n.id.clone())
        .collect();
    for npc_id in bystanders {
        if sim.state.rng.chance(0.2) {
            memory::remember(sim, &npc_id, category, emotion, evt.magnitude, &subject, false);
        }
    }
}

/// Post-processor: reputations and spirits drift with what people do.
fn social_shift(sim: &mut Sim, evt: &WorldEvent) {
    let disreputable = matches!(
        evt.kind,
        WorldEventKind::Raid
            | WorldEventKind::Robbery
            | WorldEventKind::Assassination
            | WorldEventKind::Betrayal
    );
    let heartening = matches!(
        evt.kind,
        WorldEventKind::Miracle
            | WorldEventKind::Festival
            | WorldEventKind::Alliance
            | WorldEventKind::TradeDeal
    );

    if disreputable {
        for perp in evt.perpetrators.clone() {
            if let Some(npc) = sim.world.npcs.get_mut(&perp) {
                npc.shift_reputation(-1);
            }
        }
    }
    if heartening {
        for actor in evt.actors.clone() {
            if sim.world.npcs.contains(&actor) {
                if let Some(npc) = sim.world.npcs.get_mut(&actor) {
                    npc.shift_reputation(1);
                }
                sim.npc_adjunct_mut(&actor).shift_morale(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_events::RelationshipTie;
    use crate::content::ContentTables;
    use crate::setup;
    use crate::state::WorldArchetype;

    fn world() -> (Sim, ContentTables) {
        let content = ContentTables::default();
        let sim = setup::genesis("causality-test", WorldArchetype::Standard, &content);
        (sim, content)
    }

    fn first_settlement(sim: &Sim) -> String {
        sim.world.settlements.ids()[0].clone()
    }

    #[test]
    fn test_raid_damages_settlement() {
        let (mut sim, content) = world();
        let settlement_id = first_settlement(&sim);
        let mood_before = sim.world.settlements.get(&settlement_id).unwrap().mood;
        let supply_before: i32 = sim
            .world
            .settlements
            .get(&settlement_id)
            .unwrap()
            .supplies
            .values()
            .sum();

        let evt_id = sim.next_id("evt");
        let evt = WorldEvent::new(
            evt_id,
            WorldEventKind::Raid,
            sim.meta.world_time,
            4,
            EventData::Raid {
                settlement: settlement_id.clone(),
                damage: 4,
                casualties: 0,
                loot: 200,
            },
        )
        .at(settlement_id.clone());
        let logs = process_world_event(&mut sim, &content, evt);

        let settlement = sim.world.settlements.get(&settlement_id).unwrap();
        assert!(settlement.mood < mood_before);
        let supply_after: i32 = settlement.supplies.values().sum();
        assert!(supply_after < supply_before);
        let civic = sim.state.settlement_states.get(&settlement_id).unwrap();
        assert_eq!(civic.safety, -4);
        // damage >= 3 drives refugees out.
        assert!(civic.population_delta < 0);
        assert!(logs.iter().any(|l| l.summary.contains("raided")));
    }

    #[test]
    fn test_raid_on_unknown_settlement_is_noop() {
        let (mut sim, content) = world();
        let history_before = sim.state.history.len();
        let evt_id = sim.next_id("evt");
        let evt = WorldEvent::new(
            evt_id,
            WorldEventKind::Raid,
            sim.meta.world_time,
            4,
            EventData::Raid {
                settlement: "stl-nope".to_string(),
                damage: 4,
                casualties: 2,
                loot: 0,
            },
        );
        process_world_event(&mut sim, &content, evt);
        // Recorded in history, but no settlement was touched.
        assert_eq!(sim.state.history.len(), history_before + 1);
        assert!(sim.state.settlement_states.get("stl-nope").is_none());
    }

    #[test]
    fn test_battle_moves_fame_and_morale() {
        let (mut sim, content) = world();
        let party_ids = sim.world.parties.ids();
        let (victor, loser) = (party_ids[0].clone(), party_ids[1].clone());
        let fame_before = sim.world.parties.get(&victor).unwrap().fame;

        let evt_id = sim.next_id("evt");
        let evt = WorldEvent::new(
            evt_id,
            WorldEventKind::Battle,
            sim.meta.world_time,
            5,
            EventData::Battle {
                victor: victor.clone(),
                loser: loser.clone(),
                significance: 5,
            },
        )
        .with_actor(victor.clone())
        .with_actor(loser.clone());
        process_world_event(&mut sim, &content, evt);

        assert_eq!(sim.world.parties.get(&victor).unwrap().fame, fame_before + 5);
        assert!(sim.world.parties.get(&loser).unwrap().wounded);
        assert!(sim.world.parties.get(&loser).unwrap().rest_hours_remaining >= 24);
        assert_eq!(sim.state.party_states.get(&victor).unwrap().morale, 5);
        assert_eq!(sim.state.party_states.get(&loser).unwrap().morale, -5);
    }

    #[test]
    fn test_battle_clears_vendetta_into_kill_list() {
        let (mut sim, content) = world();
        let party_ids = sim.world.parties.ids();
        let (victor, loser) = (party_ids[0].clone(), party_ids[1].clone());
        sim.party_state_mut(&victor).vendetta = Some(loser.clone());

        let evt_id = sim.next_id("evt");
        let evt = WorldEvent::new(
            evt_id,
            WorldEventKind::Battle,
            sim.meta.world_time,
            4,
            EventData::Battle {
                victor: victor.clone(),
                loser: loser.clone(),
                significance: 4,
            },
        );
        process_world_event(&mut sim, &content, evt);

        let ps = sim.state.party_states.get(&victor).unwrap();
        assert!(ps.vendetta.is_none());
        assert_eq!(ps.kills.len(), 1);
    }

    #[test]
    fn test_death_forms_memories_and_revenge() {
        let (mut sim, content) = world();
        let npc_ids = sim.world.npcs.ids();
        let victim = npc_ids[0].clone();
        let mourner = npc_ids[1].clone();
        let killer = "ant-killer".to_string();

        let evt_id = sim.next_id("evt");
        let evt = WorldEvent::new(
            evt_id,
            WorldEventKind::Death,
            sim.meta.world_time,
            5,
            EventData::Death {
                victim: victim.clone(),
                killed_by: Some(killer.clone()),
                cause: None,
                relationships: vec![RelationshipTie {
                    npc: mourner.clone(),
                    kind: RelationKind::Kin,
                    strength: 3,
                }],
            },
        )
        .with_victims(vec![victim.clone()]);
        process_world_event(&mut sim, &content, evt);

        assert!(!sim.world.npcs.get(&victim).unwrap().alive);
        let adjunct = sim.state.npc_adjuncts.get(&mourner).unwrap();
        assert_eq!(adjunct.memories.len(), 1);
        assert_eq!(adjunct.memories[0].intensity, 8);
        assert!(adjunct
            .agendas
            .iter()
            .any(|a| a.kind == AgendaKind::Revenge && a.target == killer));
    }

    #[test]
    fn test_dead_antagonist_schedules_successor_or_scatters() {
        let (mut sim, content) = world();
        let antagonist_id = sim.world.antagonists.ids()[0].clone();

        let evt_id = sim.next_id("evt");
        let evt = WorldEvent::new(
            evt_id,
            WorldEventKind::Death,
            sim.meta.world_time,
            6,
            EventData::Death {
                victim: antagonist_id.clone(),
                killed_by: None,
                cause: Some("a blade in the dark".to_string()),
                relationships: Vec::new(),
            },
        )
        .with_victims(vec![antagonist_id.clone()]);
        let logs = process_world_event(&mut sim, &content, evt);

        assert!(!sim.world.antagonists.get(&antagonist_id).unwrap().alive);
        // Either outcome leaves a trail: a scatter log or a queued successor.
        let scattered = logs.iter().any(|l| l.summary.contains("scatter"));
        let successor = sim
            .state
            .consequences
            .iter()
            .any(|e| matches!(e.kind, ConsequenceKind::SpawnAntagonist { .. }));
        assert!(scattered || successor);
        // Rumors of the death reach every settlement.
        assert!(sim.world.active_rumors.len() >= sim.world.settlements.len());
    }

    #[test]
    fn test_conquest_transfers_territory() {
        let (mut sim, content) = world();
        let settlement_id = first_settlement(&sim);
        let faction_ids = sim.world.factions.ids();
        let (old, new) = (faction_ids[0].clone(), faction_ids[1].clone());
        sim.faction_state_mut(&old).add_territory(settlement_id.clone());

        let evt_id = sim.next_id("evt");
        let evt = WorldEvent::new(
            evt_id,
            WorldEventKind::Conquest,
            sim.meta.world_time,
            7,
            EventData::Conquest {
                conqueror: new.clone(),
                previous: Some(old.clone()),
                location: settlement_id.clone(),
            },
        )
        .at(settlement_id.clone())
        .with_actor(new.clone());
        process_world_event(&mut sim, &content, evt);

        let civic = sim.state.settlement_states.get(&settlement_id).unwrap();
        assert_eq!(civic.controlled_by.as_deref(), Some(new.as_str()));
        assert!(!civic.contested);
        assert!(sim.state.faction_states.get(&new).unwrap().holds(&settlement_id));
        assert!(!sim.state.faction_states.get(&old).unwrap().holds(&settlement_id));
        assert!(sim
            .state
            .faction_states
            .get(&old)
            .unwrap()
            .enemies
            .contains(&new));
    }

    #[test]
    fn test_betrayal_full_fallout() {
        let (mut sim, content) = world();
        let npc = sim.world.npcs.ids()[0].clone();
        let party = sim.world.parties.ids()[0].clone();
        let faction = sim.world.factions.ids()[0].clone();
        let perp = sim.world.factions.ids()[1].clone();

        let evt_id = sim.next_id("evt");
        let evt = WorldEvent::new(
            evt_id,
            WorldEventKind::Betrayal,
            sim.meta.world_time,
            6,
            EventData::Betrayal {
                perpetrator: perp.clone(),
                victim_npc: Some(npc.clone()),
                victim_party: Some(party.clone()),
                victim_faction: Some(faction.clone()),
            },
        )
        .with_perpetrators(vec![perp.clone()])
        .with_victims(vec![npc.clone()]);
        process_world_event(&mut sim, &content, evt);

        let adjunct = sim.state.npc_adjuncts.get(&npc).unwrap();
        assert_eq!(adjunct.memories[0].intensity, 10);
        assert!(adjunct.agendas.iter().any(|a| a.priority == 10));
        let ps = sim.state.party_states.get(&party).unwrap();
        assert_eq!(ps.vendetta.as_deref(), Some(perp.as_str()));
        assert_eq!(ps.morale, -5);
        assert!(ps.enemies.contains(&perp));
        assert!(sim.state.faction_states.get(&faction).unwrap().enemies.contains(&perp));
    }

    #[test]
    fn test_history_is_bounded_under_flood() {
        let (mut sim, content) = world();
        for _ in 0..250 {
            let evt_id = sim.next_id("evt");
            let evt = WorldEvent::new(
                evt_id,
                WorldEventKind::Prophecy,
                sim.meta.world_time,
                1,
                EventData::General {
                    description: "an omen".to_string(),
                },
            )
            .unwitnessed();
            process_world_event(&mut sim, &content, evt);
        }
        assert!(sim.state.history.len() <= crate::state::WORLD_HISTORY_CAP);
    }
}
