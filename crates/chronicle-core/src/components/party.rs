//! Adventuring Parties
//!
//! A party is the unit that travels, fights, and hauls treasure. The
//! lightweight `Party` record lives in the world registries; the heavier
//! `PartyState` adjunct is created lazily on first reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chronicle_events::WorldTime;

use super::registry::HasId;
use super::world::{HexCoord, Terrain};

/// Adventurer class. Class mix feeds encounter strength bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Fighter,
    Wizard,
    Cleric,
    Rogue,
    Ranger,
    Bard,
}

/// One party member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyMember {
    pub name: String,
    pub class: CharacterClass,
    pub level: u8,
    pub hp: i32,
    pub max_hp: i32,
}

impl PartyMember {
    pub fn new(name: impl Into<String>, class: CharacterClass, level: u8) -> Self {
        let max_hp = 6 + i32::from(level) * 5;
        Self {
            name: name.into(),
            class,
            level,
            hp: max_hp,
            max_hp,
        }
    }
}

/// What a party is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyStatus {
    Idle,
    Travel,
}

/// Long-term inclination that steers destination choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyGoal {
    Explore,
    SeekTreasure,
    Hunt,
    Defend,
}

/// An in-progress journey. Present exactly when status is `Travel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelPlan {
    pub destination: HexCoord,
    /// Display name of the destination (settlement, dungeon, or region).
    pub destination_name: String,
    pub miles_remaining: f64,
    /// Dominant terrain along the route; drives speed and encounter odds.
    pub terrain: Terrain,
}

/// An adventuring party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: String,
    pub members: Vec<PartyMember>,
    pub location: HexCoord,
    pub status: PartyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel: Option<TravelPlan>,
    pub fatigue: u8,
    pub wounded: bool,
    pub rest_hours_remaining: u32,
    pub goal: PartyGoal,
    pub fame: u32,
    pub xp: u64,
}

impl Party {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: HexCoord) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
            location,
            status: PartyStatus::Idle,
            travel: None,
            fatigue: 0,
            wounded: false,
            rest_hours_remaining: 0,
            goal: PartyGoal::Explore,
            fame: 0,
            xp: 0,
        }
    }

    pub fn with_members(mut self, members: Vec<PartyMember>) -> Self {
        self.members = members;
        self
    }

    /// Starts a journey. Status and plan flip together so the
    /// travel-iff-plan invariant cannot be violated piecemeal.
    pub fn begin_travel(&mut self, plan: TravelPlan) {
        self.travel = Some(plan);
        self.status = PartyStatus::Travel;
    }

    /// Ends the journey at the destination, if any.
    pub fn arrive(&mut self) {
        if let Some(plan) = self.travel.take() {
            self.location = plan.destination;
        }
        self.status = PartyStatus::Idle;
    }

    /// Average member level; 1.0 for an empty roster.
    pub fn average_level(&self) -> f64 {
        if self.members.is_empty() {
            return 1.0;
        }
        let total: u32 = self.members.iter().map(|m| u32::from(m.level)).sum();
        f64::from(total) / self.members.len() as f64
    }

    pub fn has_class(&self, class: CharacterClass) -> bool {
        self.members.iter().any(|m| m.class == class)
    }

    /// Pounds of loot the party can haul in one trip.
    pub fn carry_capacity(&self) -> f64 {
        self.members.len() as f64 * 500.0
    }

    /// Abstract combat strength used by hostile encounter resolution.
    pub fn strength(&self) -> f64 {
        let arcane = if self.has_class(CharacterClass::Wizard) { 0.06 } else { 0.0 };
        let divine = if self.has_class(CharacterClass::Cleric) { 0.04 } else { 0.0 };
        let thief = if self.has_class(CharacterClass::Rogue) { 0.03 } else { 0.0 };
        0.6 + f64::from(self.fame) * 0.02 + arcane + divine + thief + (self.average_level() - 1.0) * 0.05
    }
}

impl HasId for Party {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A quest a party has taken on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub kind: QuestKind,
    pub target: String,
    pub taken_at: WorldTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    Hunt,
    Rescue,
    Escort,
    Recover,
}

/// Lazily created per-party adjunct state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyState {
    /// Party id this state belongs to.
    pub id: String,
    /// -10 to 10.
    pub morale: i32,
    pub resources: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enemies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quests: Vec<Quest>,
    /// Names of notable foes slain.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kills: Vec<String>,
    /// Reputation per settlement id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reputation: BTreeMap<String, i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendetta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protectee: Option<String>,
}

impl PartyState {
    pub fn new(party_id: impl Into<String>) -> Self {
        Self {
            id: party_id.into(),
            morale: 0,
            resources: 0,
            enemies: Vec::new(),
            allies: Vec::new(),
            quests: Vec::new(),
            kills: Vec::new(),
            reputation: BTreeMap::new(),
            vendetta: None,
            protectee: None,
        }
    }

    /// Shifts morale, clamped to -10..10.
    pub fn shift_morale(&mut self, delta: i32) {
        self.morale = (self.morale + delta).clamp(-10, 10);
    }

    /// Records an enemy, deduplicated.
    pub fn add_enemy(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.enemies.contains(&id) {
            self.allies.retain(|a| a != &id);
            self.enemies.push(id);
        }
    }

    pub fn add_ally(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.allies.contains(&id) {
            self.allies.push(id);
        }
    }
}

impl HasId for PartyState {
    fn id(&self) -> &str {
        &self.id
    }
}
