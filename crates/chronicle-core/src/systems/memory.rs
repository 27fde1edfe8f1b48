//! Memory Formation and Surfacing
//!
//! Builds rich memories with narrative snippets, surfaces old memories as
//! log prose, and applies monthly decay. The taxonomy lives on the
//! component types; this module is the behavior around them.

use chronicle_events::{LogCategory, LogEntry, WorldTime};

use crate::components::npc::{
    Agenda, AgendaKind, Emotion, Memory, MemoryCategory, MemoryGroup,
};
use crate::rng::SimRng;
use crate::state::Sim;

/// Hourly chance any one living NPC dwells on a memory.
const SURFACE_CHANCE: f64 = 0.01;

/// Minimum intensity for a memory to surface.
const SURFACE_MIN_INTENSITY: u8 = 3;

/// Narrative templates per memory group. `{target}` is substituted.
fn templates(group: MemoryGroup) -> &'static [&'static str] {
    match group {
        MemoryGroup::Harm => &[
            "still wakes at night remembering what {target} did",
            "keeps a tally of every wrong {target} has dealt",
            "cannot pass the spot without thinking of {target}",
        ],
        MemoryGroup::Positive => &[
            "owes {target} a debt no coin repays",
            "still tells the story of what {target} did that day",
            "drinks to {target}'s health when the cup goes round",
        ],
        MemoryGroup::Witnessed => &[
            "saw it happen and has never told the whole of it",
            "was there when it happened and carries the sight still",
            "watched from the doorway and said nothing",
        ],
        MemoryGroup::Actions => &[
            "did the deed and lives with it",
            "has never spoken of what was done that night",
            "would do it again, and that is the worst of it",
        ],
        MemoryGroup::Relationship => &[
            "thinks of {target} more than is wise",
            "measures every new face against {target}",
            "left something unsaid with {target}",
        ],
    }
}

/// Builds a memory with a deterministic narrative snippet.
#[allow(clippy::too_many_arguments)]
pub fn create_rich_memory(
    rng: &mut SimRng,
    id: String,
    category: MemoryCategory,
    emotion: Emotion,
    intensity: u8,
    target: impl Into<String>,
    target_name: &str,
    location: Option<String>,
    timestamp: WorldTime,
    secret: bool,
) -> Memory {
    let pool = templates(category.group());
    let template = rng.pick(pool).copied().unwrap_or("remembers it well");
    Memory {
        id,
        category,
        emotion,
        intensity: intensity.clamp(1, 10),
        target: target.into(),
        secondary: None,
        location,
        timestamp,
        acted: false,
        secret,
        narrative: template.replace("{target}", target_name),
    }
}

/// Records a memory on an NPC's adjunct, creating the adjunct lazily.
#[allow(clippy::too_many_arguments)]
pub fn remember(
    sim: &mut Sim,
    npc_id: &str,
    category: MemoryCategory,
    emotion: Emotion,
    intensity: u8,
    target: &str,
    secret: bool,
) {
    let id = sim.next_id("mem");
    let target_name = sim.world.display_name(target);
    let location = sim.world.npcs.get(npc_id).map(|n| n.location.clone());
    let timestamp = sim.meta.world_time;
    let memory = create_rich_memory(
        &mut sim.state.rng,
        id,
        category,
        emotion,
        intensity,
        target,
        &target_name,
        location,
        timestamp,
        secret,
    );
    sim.npc_adjunct_mut(npc_id).add_memory(memory);
}

/// Adds an agenda to an NPC, deduplicated by (kind, target).
pub fn form_agenda(sim: &mut Sim, npc_id: &str, kind: AgendaKind, target: &str, priority: u8) {
    let formed = sim.meta.world_time;
    sim.npc_adjunct_mut(npc_id).add_agenda(Agenda {
        kind,
        target: target.to_string(),
        priority: priority.clamp(1, 10),
        formed,
    });
}

/// Hourly surfacing pass: old wounds and old debts become log prose.
///
/// Only memories with intensity at or above the threshold that have not yet
/// acted may surface; surfacing flips the `acted` flag.
pub fn surfacing_tick(sim: &mut Sim, logs: &mut Vec<LogEntry>) {
    let npc_ids = sim.world.npcs.ids();
    for npc_id in npc_ids {
        let (alive, name) = match sim.world.npcs.get(&npc_id) {
            Some(npc) => (npc.alive, npc.name.clone()),
            None => continue,
        };
        if !alive {
            continue;
        }
        if !sim.state.rng.chance(SURFACE_CHANCE) {
            continue;
        }
        let Some(adjunct) = sim.state.npc_adjuncts.get_mut(&npc_id) else {
            continue;
        };
        let candidate = adjunct
            .memories
            .iter_mut()
            .filter(|m| m.intensity >= SURFACE_MIN_INTENSITY && !m.acted)
            .max_by_key(|m| m.intensity);
        let Some(memory) = candidate else {
            continue;
        };
        memory.acted = true;
        let narrative = memory.narrative.clone();
        let secret = memory.secret;
        let summary = if secret {
            format!("{} broods on something unspoken", name)
        } else {
            format!("{} {}", name, narrative)
        };
        logs.push(sim.log(LogCategory::Memory, summary));
    }
}

/// Monthly decay: every memory fades a point; spent memories are pruned.
pub fn monthly_decay(sim: &mut Sim) {
    for adjunct in sim.state.npc_adjuncts.iter_mut() {
        adjunct.decay_memories();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentTables;
    use crate::setup;
    use crate::state::WorldArchetype;

    fn sim() -> Sim {
        let content = ContentTables::default();
        setup::genesis("memory-test", WorldArchetype::Standard, &content)
    }

    #[test]
    fn test_remember_creates_adjunct() {
        let mut s = sim();
        let npc_id = s.world.npcs.ids()[0].clone();
        remember(&mut s, &npc_id, MemoryCategory::WasRobbed, Emotion::Angry, 6, "ant-x", false);
        let adjunct = s.state.npc_adjuncts.get(&npc_id).unwrap();
        assert_eq!(adjunct.memories.len(), 1);
        assert!(!adjunct.memories[0].narrative.is_empty());
        assert_eq!(adjunct.memories[0].intensity, 6);
    }

    #[test]
    fn test_narrative_substitutes_target() {
        let mut rng = SimRng::from_seed("n");
        let m = create_rich_memory(
            &mut rng,
            "mem-1".to_string(),
            MemoryCategory::WasBetrayed,
            Emotion::Bitter,
            8,
            "npc-2",
            "Corvin",
            None,
            WorldTime::start(),
            false,
        );
        assert!(!m.narrative.contains("{target}"));
    }

    #[test]
    fn test_surfacing_sets_acted_once() {
        let mut s = sim();
        let npc_id = s.world.npcs.ids()[0].clone();
        remember(&mut s, &npc_id, MemoryCategory::LostLovedOne, Emotion::Grieving, 9, "npc-x", false);

        // Run enough hours that the 1% surfacing roll fires.
        let mut logs = Vec::new();
        for _ in 0..2000 {
            surfacing_tick(&mut s, &mut logs);
        }
        let surfaced: Vec<_> = logs.iter().filter(|l| l.category == LogCategory::Memory).collect();
        // The single strong memory can surface at most once.
        let adjunct = s.state.npc_adjuncts.get(&npc_id).unwrap();
        let count = logs_for_npc(&surfaced, &s, &npc_id);
        assert!(count <= 1);
        assert!(adjunct.memories[0].acted || count == 0);
    }

    fn logs_for_npc(logs: &[&LogEntry], sim: &Sim, npc_id: &str) -> usize {
        let name = &sim.world.npcs.get(npc_id).unwrap().name;
        logs.iter().filter(|l| l.summary.starts_with(name.as_str())).count()
    }

    #[test]
    fn test_weak_memories_never_surface() {
        let mut s = sim();
        let npc_id = s.world.npcs.ids()[0].clone();
        remember(&mut s, &npc_id, MemoryCategory::MadeFriend, Emotion::Joyful, 2, "npc-x", false);
        let mut logs = Vec::new();
        for _ in 0..2000 {
            surfacing_tick(&mut s, &mut logs);
        }
        assert!(!s.state.npc_adjuncts.get(&npc_id).unwrap().memories[0].acted);
    }

    #[test]
    fn test_monthly_decay_applies_everywhere() {
        let mut s = sim();
        let ids: Vec<String> = s.world.npcs.ids().into_iter().take(3).collect();
        for id in &ids {
            remember(&mut s, id, MemoryCategory::WasInsulted, Emotion::Bitter, 1, "npc-x", false);
        }
        monthly_decay(&mut s);
        for id in &ids {
            assert!(s.state.npc_adjuncts.get(id).unwrap().memories.is_empty());
        }
    }
}
