//! Factions and Settlement Politics
//!
//! Factions are persistent powers with attitudes toward settlements. Their
//! heavier political state, and per-settlement civic state, are lazy
//! adjuncts created on first reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::registry::HasId;
use super::world::Good;

/// What a faction is organized around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionFocus {
    Trade,
    Military,
    Religious,
    Arcane,
    Thieves,
}

/// A persistent power in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: String,
    pub name: String,
    pub focus: FactionFocus,
    /// Attitude toward each settlement id, -5..5.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attitudes: BTreeMap<String, i32>,
    pub wealth: i64,
}

impl Faction {
    pub fn new(id: impl Into<String>, name: impl Into<String>, focus: FactionFocus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            focus,
            attitudes: BTreeMap::new(),
            wealth: 0,
        }
    }

    pub fn attitude_toward(&self, settlement_id: &str) -> i32 {
        self.attitudes.get(settlement_id).copied().unwrap_or(0)
    }

    pub fn set_attitude(&mut self, settlement_id: impl Into<String>, value: i32) {
        self.attitudes.insert(settlement_id.into(), value.clamp(-5, 5));
    }
}

impl HasId for Faction {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A recorded grievance that can escalate to war.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasusBelli {
    pub against: String,
    pub reason: String,
    pub magnitude: u8,
}

/// Operation kinds a faction can queue for daily resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    RaidPreparation,
    Recruit,
    Fortify,
    TradeMission,
}

/// A queued faction operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionOperation {
    pub kind: OperationKind,
    /// Settlement or faction id the operation concerns.
    pub target: String,
}

/// Lazily created political state for a faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionState {
    /// Faction id this state belongs to.
    pub id: String,
    /// 0-100.
    pub power: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub territory: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enemies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allies: Vec<String>,
    pub resources: i64,
    /// -10 to 10.
    pub morale: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_needs: Vec<Good>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub casus_belli: Vec<CasusBelli>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<FactionOperation>,
    pub recent_losses: u32,
    pub recent_wins: u32,
}

impl FactionState {
    pub fn new(faction_id: impl Into<String>) -> Self {
        Self {
            id: faction_id.into(),
            power: 30,
            territory: Vec::new(),
            enemies: Vec::new(),
            allies: Vec::new(),
            resources: 0,
            morale: 0,
            resource_needs: Vec::new(),
            casus_belli: Vec::new(),
            operations: Vec::new(),
            recent_losses: 0,
            recent_wins: 0,
        }
    }

    /// Shifts power, clamped to 0..100.
    pub fn shift_power(&mut self, delta: i32) {
        self.power = (i32::from(self.power) + delta).clamp(0, 100) as u8;
    }

    /// Shifts morale, clamped to -10..10.
    pub fn shift_morale(&mut self, delta: i32) {
        self.morale = (self.morale + delta).clamp(-10, 10);
    }

    /// Declares enmity; drops any standing alliance first.
    pub fn declare_enemy(&mut self, faction_id: impl Into<String>) {
        let faction_id = faction_id.into();
        if faction_id == self.id {
            return;
        }
        self.allies.retain(|a| a != &faction_id);
        if !self.enemies.contains(&faction_id) {
            self.enemies.push(faction_id);
        }
    }

    /// Forms an alliance; drops any standing enmity first.
    pub fn declare_ally(&mut self, faction_id: impl Into<String>) {
        let faction_id = faction_id.into();
        if faction_id == self.id {
            return;
        }
        self.enemies.retain(|e| e != &faction_id);
        if !self.allies.contains(&faction_id) {
            self.allies.push(faction_id);
        }
    }

    pub fn holds(&self, settlement_id: &str) -> bool {
        self.territory.iter().any(|t| t == settlement_id)
    }

    pub fn add_territory(&mut self, settlement_id: impl Into<String>) {
        let settlement_id = settlement_id.into();
        if !self.holds(&settlement_id) {
            self.territory.push(settlement_id);
        }
    }

    pub fn remove_territory(&mut self, settlement_id: &str) {
        self.territory.retain(|t| t != settlement_id);
    }
}

impl HasId for FactionState {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Price trend for a good at a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    Low,
    Normal,
    High,
}

/// Lazily created civic state for a settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementState {
    /// Settlement id this state belongs to.
    pub id: String,
    pub prosperity: i32,
    pub safety: i32,
    /// 0-10.
    pub unrest: i32,
    pub population_delta: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_events: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controlled_by: Option<String>,
    pub contested: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruler_npc_id: Option<String>,
    pub defense_level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease: Option<String>,
    pub quarantined: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub price_trends: BTreeMap<Good, PriceTrend>,
}

impl SettlementState {
    pub fn new(settlement_id: impl Into<String>) -> Self {
        Self {
            id: settlement_id.into(),
            prosperity: 0,
            safety: 0,
            unrest: 0,
            population_delta: 0,
            recent_events: Vec::new(),
            controlled_by: None,
            contested: false,
            ruler_npc_id: None,
            defense_level: 1,
            disease: None,
            quarantined: false,
            price_trends: BTreeMap::new(),
        }
    }

    /// Shifts unrest, clamped to 0..10.
    pub fn shift_unrest(&mut self, delta: i32) {
        self.unrest = (self.unrest + delta).clamp(0, 10);
    }

    /// Records a short event note, keeping the most recent ten.
    pub fn note_event(&mut self, note: impl Into<String>) {
        self.recent_events.push(note.into());
        if self.recent_events.len() > 10 {
            let excess = self.recent_events.len() - 10;
            self.recent_events.drain(0..excess);
        }
    }
}

impl HasId for SettlementState {
    fn id(&self) -> &str {
        &self.id
    }
}
