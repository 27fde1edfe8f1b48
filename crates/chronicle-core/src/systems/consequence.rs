//! Consequence Queue
//!
//! Actions taken at turn t schedule effects at turn t+d through this
//! queue. Entries are drained in (due turn, priority desc, insertion)
//! order, which keeps deferred effects deterministic. Cancellation is not
//! supported; stale entries self-invalidate at dispatch.

use serde::{Deserialize, Serialize};

use crate::components::story::RumorKind;

/// Deferred-effect payload, one variant per consequence tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsequenceKind {
    SpawnRumor {
        origin: String,
        rumor_kind: RumorKind,
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    SpawnAntagonist {
        archetype: String,
        territory: String,
        threat: u8,
    },
    SettlementChange {
        settlement: String,
        mood_delta: i32,
        unrest_delta: i32,
        note: String,
    },
    TreasureInflux {
        settlement: String,
        amount: i64,
    },
    /// The generic `treasure-{attract}` family: something drawn by word of
    /// treasure arrives near the settlement.
    TreasureAttract {
        attract_type: String,
        settlement: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        item_id: Option<String>,
    },
    GuildHeistTarget {
        settlement: String,
        item_id: String,
    },
    RivalPartyConflict {
        party: String,
        rival: String,
    },
    DragonSeeksTreasure {
        settlement: String,
    },
    AntagonistSeeksItem {
        antagonist: String,
        item_id: String,
    },
    FactionAcquiresItem {
        faction: String,
        item_id: String,
    },
    BanditAmbush {
        settlement: String,
    },
    FactionAction {
        faction: String,
        action: FactionActionKind,
        against: String,
    },
}

/// What a scheduled faction action does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionActionKind {
    Retaliate,
    DeclareWar,
}

/// One queued consequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsequenceEntry {
    pub id: String,
    pub due_turn: u64,
    /// 1-5, higher dispatches first among same-turn entries.
    pub priority: u8,
    /// Monotonic insertion order, the final tiebreak.
    pub insertion: u64,
    pub kind: ConsequenceKind,
}

/// The queue itself. Stored in insertion order; drain sorts the due slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsequenceQueue {
    entries: Vec<ConsequenceEntry>,
    insertion_counter: u64,
}

impl ConsequenceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a consequence `due_in_turns` from `current_turn`.
    pub fn enqueue(&mut self, current_turn: u64, due_in_turns: u64, priority: u8, kind: ConsequenceKind) {
        self.insertion_counter += 1;
        self.entries.push(ConsequenceEntry {
            id: format!("csq-{:06}", self.insertion_counter),
            due_turn: current_turn + due_in_turns,
            priority: priority.clamp(1, 5),
            insertion: self.insertion_counter,
            kind,
        });
    }

    /// Removes and returns every entry due at or before `turn`, ordered by
    /// (due turn asc, priority desc, insertion asc).
    pub fn drain_due(&mut self, turn: u64) -> Vec<ConsequenceEntry> {
        let mut due: Vec<ConsequenceEntry> = Vec::new();
        let mut rest: Vec<ConsequenceEntry> = Vec::new();
        for entry in self.entries.drain(..) {
            if entry.due_turn <= turn {
                due.push(entry);
            } else {
                rest.push(entry);
            }
        }
        self.entries = rest;
        due.sort_by(|a, b| {
            a.due_turn
                .cmp(&b.due_turn)
                .then(b.priority.cmp(&a.priority))
                .then(a.insertion.cmp(&b.insertion))
        });
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest due turn still queued, if any.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_turn).min()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsequenceEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(settlement: &str) -> ConsequenceKind {
        ConsequenceKind::SettlementChange {
            settlement: settlement.to_string(),
            mood_delta: 0,
            unrest_delta: 0,
            note: String::new(),
        }
    }

    #[test]
    fn test_drain_respects_due_turn() {
        let mut q = ConsequenceQueue::new();
        q.enqueue(10, 5, 3, note("a"));
        q.enqueue(10, 1, 3, note("b"));
        assert!(q.drain_due(10).is_empty());
        let due = q.drain_due(11);
        assert_eq!(due.len(), 1);
        assert!(matches!(&due[0].kind, ConsequenceKind::SettlementChange { settlement, .. } if settlement == "b"));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_drain_order_priority_then_insertion() {
        let mut q = ConsequenceQueue::new();
        q.enqueue(0, 2, 1, note("low"));
        q.enqueue(0, 2, 5, note("high"));
        q.enqueue(0, 2, 5, note("high-later"));
        q.enqueue(0, 1, 2, note("earlier-turn"));
        let due = q.drain_due(5);
        let names: Vec<&str> = due
            .iter()
            .map(|e| match &e.kind {
                ConsequenceKind::SettlementChange { settlement, .. } => settlement.as_str(),
                _ => "?",
            })
            .collect();
        assert_eq!(names, vec!["earlier-turn", "high", "high-later", "low"]);
    }

    #[test]
    fn test_priority_clamped() {
        let mut q = ConsequenceQueue::new();
        q.enqueue(0, 1, 99, note("x"));
        let due = q.drain_due(1);
        assert_eq!(due[0].priority, 5);
    }

    #[test]
    fn test_serde_preserves_counter() {
        let mut q = ConsequenceQueue::new();
        q.enqueue(0, 100, 3, note("x"));
        let json = serde_json::to_string(&q).unwrap();
        let mut back: ConsequenceQueue = serde_json::from_str(&json).unwrap();
        back.enqueue(0, 100, 3, note("y"));
        // Insertion ids keep counting from where they left off.
        let due = back.drain_due(100);
        assert_eq!(due[0].id, "csq-000001");
        assert_eq!(due[1].id, "csq-000002");
    }
}
