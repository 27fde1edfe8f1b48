//! Story Threads and Rumor Flow
//!
//! Post-processors that keep narrative arcs and gossip in step with the
//! causal record, plus the daily rumor decay pass.

use chronicle_events::{LogCategory, LogEntry, WorldEvent, WorldEventKind};

use crate::components::story::{Rumor, RumorKind, StoryThread, ThreadType};
use crate::state::Sim;

/// Magnitude at which an event can open a new thread.
const THREAD_OPEN_MAGNITUDE: u8 = 5;

fn thread_type_for(kind: WorldEventKind) -> Option<ThreadType> {
    match kind {
        WorldEventKind::Battle => Some(ThreadType::War),
        WorldEventKind::Conquest => Some(ThreadType::War),
        WorldEventKind::Betrayal => Some(ThreadType::Vendetta),
        WorldEventKind::Assassination => Some(ThreadType::Intrigue),
        WorldEventKind::Raid => Some(ThreadType::RisingThreat),
        _ => None,
    }
}

fn thread_title(sim: &Sim, thread_type: ThreadType, evt: &WorldEvent) -> String {
    let lead = evt
        .actors
        .first()
        .or_else(|| evt.perpetrators.first())
        .map(|id| sim.world.display_name(id))
        .unwrap_or_else(|| "Unknown hands".to_string());
    match thread_type {
        ThreadType::Vendetta => format!("The price of {}'s treachery", lead),
        ThreadType::War => format!("The war {} began", lead),
        ThreadType::RisingThreat => format!("The shadow of {}", lead),
        ThreadType::Intrigue => format!("Knives around {}", lead),
        ThreadType::Tragedy => format!("The fall of {}", lead),
    }
}

/// Post-processor: feed the event into existing threads, open a new one
/// when a big event has no arc to belong to, resolve arcs whose principal
/// has died.
pub fn update_threads(sim: &mut Sim, evt: &WorldEvent, logs: &mut Vec<LogEntry>) {
    let participants: Vec<String> = evt
        .actors
        .iter()
        .chain(evt.victims.iter())
        .chain(evt.perpetrators.iter())
        .cloned()
        .collect();
    if participants.is_empty() {
        return;
    }

    // Death of a thread actor closes the arc.
    if matches!(evt.kind, WorldEventKind::Death | WorldEventKind::Assassination) {
        let mut resolved_titles: Vec<String> = Vec::new();
        for thread in sim.world.story_threads.iter_mut() {
            if thread.resolved {
                continue;
            }
            if evt.victims.iter().any(|v| thread.involves(v)) {
                thread.resolve("Death writes the final line.");
                resolved_titles.push(thread.title.clone());
            }
        }
        for title in resolved_titles {
            logs.push(
                sim.log(LogCategory::Story, format!("An arc closes: {}", title)),
            );
        }
    }

    // Feed ongoing threads.
    let tension_delta = i32::from(evt.magnitude / 2).max(1);
    let mut touched = false;
    let beat = beat_line(sim, evt);
    for thread in sim.world.story_threads.iter_mut() {
        if thread.resolved {
            continue;
        }
        if participants.iter().any(|p| thread.involves(p)) {
            thread.shift_tension(tension_delta);
            thread.add_beat(beat.clone());
            touched = true;
        }
    }

    // Open a new arc for a big, unclaimed event.
    if !touched && evt.magnitude >= THREAD_OPEN_MAGNITUDE {
        if let Some(thread_type) = thread_type_for(evt.kind) {
            let id = sim.next_id("thr");
            let title = thread_title(sim, thread_type, evt);
            let mut thread = StoryThread::new(id, thread_type, title.clone(), participants);
            thread.shift_tension(i32::from(evt.magnitude) - 1);
            thread.add_beat(beat);
            sim.world.story_threads.insert(thread);
            logs.push(sim.log(LogCategory::Story, format!("A new arc begins: {}", title)));
        }
    }
}

fn beat_line(sim: &Sim, evt: &WorldEvent) -> String {
    let place = evt
        .location
        .as_deref()
        .map(|l| sim.world.display_name(l))
        .unwrap_or_else(|| "the wider world".to_string());
    format!("{:?} at {}", evt.kind, place)
}

fn rumor_kind_for(kind: WorldEventKind) -> RumorKind {
    match kind {
        WorldEventKind::Discovery => RumorKind::Treasure,
        WorldEventKind::Battle | WorldEventKind::Conquest | WorldEventKind::Uprising => RumorKind::War,
        WorldEventKind::Raid | WorldEventKind::Robbery | WorldEventKind::Assassination => {
            RumorKind::Antagonist
        }
        _ => RumorKind::Strange,
    }
}

/// Post-processor: witnessed events of weight become rumors at the nearest
/// settlement.
pub fn spread_rumor(sim: &mut Sim, evt: &WorldEvent, logs: &mut Vec<LogEntry>) {
    if !evt.spreads_rumors() {
        return;
    }
    let origin = match evt.location.as_deref() {
        Some(loc) if sim.world.settlements.contains(loc) => loc.to_string(),
        _ => match sim.world.settlements.iter().next() {
            Some(s) => s.id.clone(),
            None => return,
        },
    };
    let origin_name = sim.world.display_name(&origin);
    let subject = evt
        .actors
        .first()
        .or_else(|| evt.perpetrators.first())
        .or_else(|| evt.victims.first())
        .map(|id| sim.world.display_name(id))
        .unwrap_or_else(|| "someone".to_string());
    let text = format!(
        "talk of {} and what happened near {}",
        subject, origin_name
    );
    let id = sim.next_id("rum");
    let freshness = 3 + u32::from(evt.magnitude);
    let mut rumor = Rumor::new(id, rumor_kind_for(evt.kind), text.clone(), origin, freshness);
    if let Some(actor) = evt.actors.first().or_else(|| evt.perpetrators.first()) {
        rumor = rumor.about(actor.clone());
    }
    sim.world.active_rumors.insert(rumor);
    logs.push(
        sim.log(LogCategory::Rumor, format!("In {}, {}", origin_name, text)),
    );
}

/// Spawns a rumor directly (consequence dispatch and antagonist word).
pub fn spawn_rumor(
    sim: &mut Sim,
    kind: RumorKind,
    text: impl Into<String>,
    origin: &str,
    target: Option<String>,
    freshness: u32,
) {
    let id = sim.next_id("rum");
    let mut rumor = Rumor::new(id, kind, text, origin, freshness);
    if let Some(target) = target {
        rumor = rumor.about(target);
    }
    sim.world.active_rumors.insert(rumor);
}

/// Daily pass: freshness drops by one; spent rumors vanish quietly.
pub fn rumor_daily_decay(sim: &mut Sim) {
    for rumor in sim.world.active_rumors.iter_mut() {
        rumor.freshness = rumor.freshness.saturating_sub(1);
    }
    sim.world.active_rumors.retain(|r| r.freshness > 0);

    for rumor in sim.state.treasure.rumors.iter_mut() {
        rumor.freshness = rumor.freshness.saturating_sub(1);
    }
    sim.state.treasure.rumors.retain(|r| r.freshness > 0);
}
