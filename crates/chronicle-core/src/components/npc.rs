//! NPCs, Memories, Agendas
//!
//! Every named character is an `Npc`. Characters that react to the world
//! by forming memories and pursuing agendas get a lazily created
//! `NpcReactiveAdjunct` keyed by their id, composition standing in for
//! inheritance.

use serde::{Deserialize, Serialize};

use chronicle_events::WorldTime;

use super::party::CharacterClass;
use super::registry::HasId;

/// Maximum memories one NPC retains.
pub const MEMORY_CAP: usize = 30;

/// A named character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<CharacterClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Settlement id of their home.
    pub home: String,
    /// Settlement id where they currently are.
    pub location: String,
    /// -3 to 3.
    pub reputation: i32,
    pub fame: u32,
    pub alive: bool,
}

impl Npc {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
        home: impl Into<String>,
    ) -> Self {
        let home = home.into();
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            class: None,
            level: None,
            location: home.clone(),
            home,
            reputation: 0,
            fame: 0,
            alive: true,
        }
    }

    /// Shifts reputation, clamped to -3..3.
    pub fn shift_reputation(&mut self, delta: i32) {
        self.reputation = (self.reputation + delta).clamp(-3, 3);
    }
}

impl HasId for Npc {
    fn id(&self) -> &str {
        &self.id
    }
}

/// What kind of thing a memory records.
///
/// Categories group into HARM, POSITIVE, WITNESSED, ACTIONS, and
/// RELATIONSHIP; the group picks the narrative template pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    // HARM
    WasAttacked,
    WasRobbed,
    WasBetrayed,
    WasThreatened,
    WasInsulted,
    WasCheated,
    LostLovedOne,
    LostHome,
    WasExiled,
    WasImprisoned,
    // POSITIVE
    WasRescued,
    WasGifted,
    WasHealed,
    WasPromoted,
    WasPraised,
    FoundLove,
    WonContest,
    // WITNESSED
    WitnessedDeath,
    WitnessedBattle,
    WitnessedMiracle,
    WitnessedCrime,
    WitnessedBetrayal,
    WitnessedDisaster,
    WitnessedProphecy,
    // ACTIONS
    KilledSomeone,
    StoleSomething,
    SavedSomeone,
    BrokeOath,
    KeptOath,
    BetrayedSomeone,
    // RELATIONSHIP
    MadeFriend,
    MadeEnemy,
    FellInLove,
    Grieving,
    Reconciled,
}

/// The five template groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryGroup {
    Harm,
    Positive,
    Witnessed,
    Actions,
    Relationship,
}

impl MemoryCategory {
    pub fn group(self) -> MemoryGroup {
        use MemoryCategory::*;
        match self {
            WasAttacked | WasRobbed | WasBetrayed | WasThreatened | WasInsulted | WasCheated
            | LostLovedOne | LostHome | WasExiled | WasImprisoned => MemoryGroup::Harm,
            WasRescued | WasGifted | WasHealed | WasPromoted | WasPraised | FoundLove
            | WonContest => MemoryGroup::Positive,
            WitnessedDeath | WitnessedBattle | WitnessedMiracle | WitnessedCrime
            | WitnessedBetrayal | WitnessedDisaster | WitnessedProphecy => MemoryGroup::Witnessed,
            KilledSomeone | StoleSomething | SavedSomeone | BrokeOath | KeptOath
            | BetrayedSomeone => MemoryGroup::Actions,
            MadeFriend | MadeEnemy | FellInLove | Grieving | Reconciled => {
                MemoryGroup::Relationship
            }
        }
    }
}

/// Emotional coloring of a memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Angry,
    Grateful,
    Grieving,
    Fearful,
    Joyful,
    Bitter,
    Proud,
    Ashamed,
    Vengeful,
    Hopeful,
    Jealous,
    Loyal,
    Suspicious,
    Heartbroken,
}

/// A memory held by a reactive NPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub category: MemoryCategory,
    pub emotion: Emotion,
    /// 1-10; decays monthly, pruned at 0.
    pub intensity: u8,
    /// Entity id or name the memory is about.
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub timestamp: WorldTime,
    /// Set once the memory has surfaced as behavior or prose.
    pub acted: bool,
    pub secret: bool,
    /// Prose snippet chosen at formation time.
    pub narrative: String,
}

/// Long-lived goal an NPC pursues. Unique per (kind, target).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agenda {
    pub kind: AgendaKind,
    pub target: String,
    /// 1-10.
    pub priority: u8,
    pub formed: WorldTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgendaKind {
    Revenge,
    Protection,
    Ambition,
    Loyalty,
    Greed,
    Fear,
    Love,
    Duty,
    Stronghold,
    Research,
    Nexus,
    Betrayal,
    Romance,
    Redemption,
    Escape,
    Vengeance,
    Inheritance,
    Investigation,
}

/// Reactive state attached to an NPC on first memory. Keyed by NPC id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcReactiveAdjunct {
    /// NPC id this adjunct belongs to.
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub memories: Vec<Memory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agendas: Vec<Agenda>,
    /// Faction id this NPC is loyal to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty: Option<String>,
    /// -10 to 10.
    pub morale: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_acted: Option<WorldTime>,
}

impl NpcReactiveAdjunct {
    pub fn new(npc_id: impl Into<String>) -> Self {
        Self {
            id: npc_id.into(),
            memories: Vec::new(),
            agendas: Vec::new(),
            loyalty: None,
            morale: 0,
            last_acted: None,
        }
    }

    /// Appends a memory and enforces the cap: keep the most intense, break
    /// ties toward the most recent.
    pub fn add_memory(&mut self, memory: Memory) {
        self.memories.push(memory);
        if self.memories.len() > MEMORY_CAP {
            self.memories
                .sort_by(|a, b| b.intensity.cmp(&a.intensity).then(b.timestamp.cmp(&a.timestamp)));
            self.memories.truncate(MEMORY_CAP);
        }
    }

    /// Adds an agenda unless one with the same (kind, target) exists.
    pub fn add_agenda(&mut self, agenda: Agenda) {
        let duplicate = self
            .agendas
            .iter()
            .any(|a| a.kind == agenda.kind && a.target == agenda.target);
        if !duplicate {
            self.agendas.push(agenda);
        }
    }

    /// Shifts morale, clamped to -10..10.
    pub fn shift_morale(&mut self, delta: i32) {
        self.morale = (self.morale + delta).clamp(-10, 10);
    }

    /// Applies monthly decay: every intensity drops by one, zeroes pruned.
    pub fn decay_memories(&mut self) {
        for memory in &mut self.memories {
            memory.intensity = memory.intensity.saturating_sub(1);
        }
        self.memories.retain(|m| m.intensity > 0);
    }
}

impl HasId for NpcReactiveAdjunct {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(id: &str, intensity: u8, hours: i64) -> Memory {
        Memory {
            id: id.to_string(),
            category: MemoryCategory::WasAttacked,
            emotion: Emotion::Angry,
            intensity,
            target: "ant-1".to_string(),
            secondary: None,
            location: None,
            timestamp: WorldTime::start().plus_hours(hours),
            acted: false,
            secret: false,
            narrative: String::new(),
        }
    }

    #[test]
    fn test_memory_cap_evicts_weakest() {
        let mut adj = NpcReactiveAdjunct::new("npc-1");
        for i in 0..MEMORY_CAP {
            adj.add_memory(memory(&format!("mem-{}", i), 5, i as i64));
        }
        // A stronger memory stays, the weakest goes.
        adj.add_memory(memory("mem-strong", 9, 99));
        assert_eq!(adj.memories.len(), MEMORY_CAP);
        assert!(adj.memories.iter().any(|m| m.id == "mem-strong"));

        // A weaker memory than everything present is the one evicted.
        adj.add_memory(memory("mem-weak", 1, 100));
        assert_eq!(adj.memories.len(), MEMORY_CAP);
        assert!(!adj.memories.iter().any(|m| m.id == "mem-weak"));
    }

    #[test]
    fn test_memory_cap_tiebreak_recency() {
        let mut adj = NpcReactiveAdjunct::new("npc-1");
        for i in 0..=MEMORY_CAP {
            adj.add_memory(memory(&format!("mem-{}", i), 5, i as i64));
        }
        // All equal intensity: the oldest is dropped.
        assert!(!adj.memories.iter().any(|m| m.id == "mem-0"));
        assert!(adj.memories.iter().any(|m| m.id == format!("mem-{}", MEMORY_CAP)));
    }

    #[test]
    fn test_agenda_unique_per_kind_target() {
        let mut adj = NpcReactiveAdjunct::new("npc-1");
        let agenda = Agenda {
            kind: AgendaKind::Revenge,
            target: "ant-1".to_string(),
            priority: 8,
            formed: WorldTime::start(),
        };
        adj.add_agenda(agenda.clone());
        adj.add_agenda(agenda);
        assert_eq!(adj.agendas.len(), 1);

        adj.add_agenda(Agenda {
            kind: AgendaKind::Revenge,
            target: "ant-2".to_string(),
            priority: 6,
            formed: WorldTime::start(),
        });
        assert_eq!(adj.agendas.len(), 2);
    }

    #[test]
    fn test_decay_prunes_zero() {
        let mut adj = NpcReactiveAdjunct::new("npc-1");
        adj.add_memory(memory("fading", 1, 0));
        adj.add_memory(memory("lasting", 6, 0));
        adj.decay_memories();
        assert_eq!(adj.memories.len(), 1);
        assert_eq!(adj.memories[0].id, "lasting");
        assert_eq!(adj.memories[0].intensity, 5);
    }

    #[test]
    fn test_category_groups() {
        assert_eq!(MemoryCategory::WasBetrayed.group(), MemoryGroup::Harm);
        assert_eq!(MemoryCategory::WonContest.group(), MemoryGroup::Positive);
        assert_eq!(MemoryCategory::WitnessedDeath.group(), MemoryGroup::Witnessed);
        assert_eq!(MemoryCategory::BrokeOath.group(), MemoryGroup::Actions);
        assert_eq!(MemoryCategory::Reconciled.group(), MemoryGroup::Relationship);
    }

    #[test]
    fn test_npc_reputation_clamp() {
        let mut npc = Npc::new("npc-1", "Maren", "innkeeper", "stl-1");
        npc.shift_reputation(10);
        assert_eq!(npc.reputation, 3);
        npc.shift_reputation(-9);
        assert_eq!(npc.reputation, -3);
    }
}
