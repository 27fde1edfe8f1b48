//! World Events
//!
//! Events describe what just happened in the world. The engine dispatches
//! them through per-kind handlers whose state mutations may raise further
//! events; the typed `EventData` payload replaces any free-form map so every
//! handler sees exactly the fields its kind carries.

use serde::{Deserialize, Serialize};

use crate::WorldTime;

/// Primary event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldEventKind {
    Raid,
    Battle,
    Death,
    Robbery,
    Discovery,
    Alliance,
    Betrayal,
    Conquest,
    Disaster,
    Miracle,
    Assassination,
    Recruitment,
    Defection,
    TradeDeal,
    Embargo,
    Festival,
    Plague,
    Famine,
    Uprising,
    Prophecy,
}

impl WorldEventKind {
    /// Returns all kinds, in declaration order.
    pub fn all() -> &'static [WorldEventKind] {
        &[
            WorldEventKind::Raid,
            WorldEventKind::Battle,
            WorldEventKind::Death,
            WorldEventKind::Robbery,
            WorldEventKind::Discovery,
            WorldEventKind::Alliance,
            WorldEventKind::Betrayal,
            WorldEventKind::Conquest,
            WorldEventKind::Disaster,
            WorldEventKind::Miracle,
            WorldEventKind::Assassination,
            WorldEventKind::Recruitment,
            WorldEventKind::Defection,
            WorldEventKind::TradeDeal,
            WorldEventKind::Embargo,
            WorldEventKind::Festival,
            WorldEventKind::Plague,
            WorldEventKind::Famine,
            WorldEventKind::Uprising,
            WorldEventKind::Prophecy,
        ]
    }
}

/// How an NPC relates to another entity, as recorded on a relationship tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Ally,
    Lover,
    Kin,
    Mentor,
    Friend,
    Rival,
    Enemy,
}

impl RelationKind {
    /// Ties close enough that an unavenged death demands a revenge agenda.
    pub fn is_close(self) -> bool {
        matches!(
            self,
            RelationKind::Ally | RelationKind::Lover | RelationKind::Kin | RelationKind::Mentor
        )
    }
}

/// A relationship carried on a death/assassination payload so the memory
/// formation step can reach the bereaved without a graph lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipTie {
    /// NPC id on the other end of the tie.
    pub npc: String,
    pub kind: RelationKind,
    /// Tie strength 1-5; feeds memory intensity.
    pub strength: u8,
}

/// Typed payload, one variant per event kind that carries data.
///
/// Kinds without structured effects (miracle, prophecy, ...) use `General`
/// and flow through the universal post-processors only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventData {
    Raid {
        settlement: String,
        damage: u32,
        casualties: u32,
        loot: i64,
    },
    Battle {
        /// Party, army, or faction id of the winning side.
        victor: String,
        loser: String,
        significance: u8,
    },
    Death {
        victim: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        killed_by: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cause: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        relationships: Vec<RelationshipTie>,
    },
    Robbery {
        caravan: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        settlement: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        owner_faction: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        perpetrator_faction: Option<String>,
        value: i64,
    },
    Assassination {
        victim: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        killed_by: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        relationships: Vec<RelationshipTie>,
    },
    Conquest {
        conqueror: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        previous: Option<String>,
        location: String,
    },
    Alliance {
        first: String,
        second: String,
    },
    Betrayal {
        perpetrator: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        victim_npc: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        victim_party: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        victim_faction: Option<String>,
    },
    General {
        description: String,
    },
}

/// A complete world event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    /// Unique identifier (e.g. "evt-000042").
    pub id: String,
    pub kind: WorldEventKind,
    pub timestamp: WorldTime,
    /// Settlement or place name where the event happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Ids of the entities driving the event.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub victims: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub perpetrators: Vec<String>,
    /// Severity 1-10; gates rumor spreading and story threads.
    pub magnitude: u8,
    /// Whether anyone saw it happen.
    pub witnessed: bool,
    pub data: EventData,
}

impl WorldEvent {
    /// Creates a world event. Magnitude is clamped into 1-10.
    pub fn new(
        id: impl Into<String>,
        kind: WorldEventKind,
        timestamp: WorldTime,
        magnitude: u8,
        data: EventData,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            timestamp,
            location: None,
            actors: Vec::new(),
            victims: Vec::new(),
            perpetrators: Vec::new(),
            magnitude: magnitude.clamp(1, 10),
            witnessed: true,
            data,
        }
    }

    /// Sets the location.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Adds an actor id.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actors.push(actor.into());
        self
    }

    /// Sets the victim ids.
    pub fn with_victims(mut self, victims: Vec<String>) -> Self {
        self.victims = victims;
        self
    }

    /// Sets the perpetrator ids.
    pub fn with_perpetrators(mut self, perpetrators: Vec<String>) -> Self {
        self.perpetrators = perpetrators;
        self
    }

    /// Marks the event as unseen.
    pub fn unwitnessed(mut self) -> Self {
        self.witnessed = false;
        self
    }

    /// True when rumors about this event should spread.
    pub fn spreads_rumors(&self) -> bool {
        self.witnessed && self.magnitude >= 3
    }

    /// Checks whether the given id appears anywhere on the event.
    pub fn involves(&self, id: &str) -> bool {
        self.actors.iter().any(|a| a == id)
            || self.victims.iter().any(|v| v == id)
            || self.perpetrators.iter().any(|p| p == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raid() -> WorldEvent {
        WorldEvent::new(
            "evt-000001",
            WorldEventKind::Raid,
            WorldTime::start(),
            4,
            EventData::Raid {
                settlement: "stl-000001".to_string(),
                damage: 3,
                casualties: 2,
                loot: 150,
            },
        )
        .at("Harrowgate")
        .with_perpetrators(vec!["ant-000001".to_string()])
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&WorldEventKind::TradeDeal).unwrap(), r#""trade_deal""#);
        assert_eq!(serde_json::to_string(&WorldEventKind::Raid).unwrap(), r#""raid""#);
    }

    #[test]
    fn test_all_kinds() {
        assert_eq!(WorldEventKind::all().len(), 20);
    }

    #[test]
    fn test_magnitude_clamped() {
        let evt = WorldEvent::new(
            "evt-1",
            WorldEventKind::Miracle,
            WorldTime::start(),
            99,
            EventData::General {
                description: "a light on the water".to_string(),
            },
        );
        assert_eq!(evt.magnitude, 10);
    }

    #[test]
    fn test_spreads_rumors_gate() {
        let loud = raid();
        assert!(loud.spreads_rumors());

        let quiet = raid().unwitnessed();
        assert!(!quiet.spreads_rumors());

        let minor = WorldEvent::new(
            "evt-2",
            WorldEventKind::Discovery,
            WorldTime::start(),
            1,
            EventData::General {
                description: "an old waymarker".to_string(),
            },
        );
        assert!(!minor.spreads_rumors());
    }

    #[test]
    fn test_involves() {
        let evt = raid();
        assert!(evt.involves("ant-000001"));
        assert!(!evt.involves("npc-000001"));
    }

    #[test]
    fn test_payload_roundtrip() {
        let evt = raid();
        let json = serde_json::to_string(&evt).unwrap();
        let parsed: WorldEvent = serde_json::from_str(&json).unwrap();
        match parsed.data {
            EventData::Raid { damage, casualties, .. } => {
                assert_eq!(damage, 3);
                assert_eq!(casualties, 2);
            }
            _ => panic!("wrong payload variant"),
        }
    }

    #[test]
    fn test_relation_close() {
        assert!(RelationKind::Lover.is_close());
        assert!(RelationKind::Kin.is_close());
        assert!(!RelationKind::Enemy.is_close());
        assert!(!RelationKind::Rival.is_close());
    }
}
