//! Ships, Routes, Pirates, Distant Lands
//!
//! The naval world: sea routes between ports, merchant ships working them,
//! pirate fleets preying on them, and the lazily generated distant lands
//! and figures sailors bring stories about.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chronicle_events::WorldTime;

use super::registry::{HasId, Registry};
use super::world::Good;

/// Where a ship is in its working life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipStatus {
    Docked,
    AtSea,
    Damaged,
    Shipwrecked,
    Becalmed,
}

/// A ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub id: String,
    pub name: String,
    /// Key into the ship type content table.
    pub ship_type: String,
    /// Owner id: settlement, faction, or captain NPC.
    pub owner: String,
    pub status: ShipStatus,
    /// Settlement id of the home harbor.
    pub home_port: String,
    /// Settlement id when docked; route id while at sea.
    pub current_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departed_at: Option<WorldTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrives_at: Option<WorldTime>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cargo: BTreeMap<Good, u32>,
    pub crew: u32,
    pub marines: u32,
    /// 0-100 hull condition.
    pub condition: u8,
}

impl Ship {
    /// Shifts condition, clamped to 0..100.
    pub fn shift_condition(&mut self, delta: i32) {
        self.condition = (i32::from(self.condition) + delta).clamp(0, 100) as u8;
    }

    /// Docks the ship at a port and clears voyage fields.
    pub fn dock_at(&mut self, port_id: impl Into<String>) {
        self.status = ShipStatus::Docked;
        self.current_location = port_id.into();
        self.destination = None;
        self.departed_at = None;
        self.arrives_at = None;
    }
}

impl HasId for Ship {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A sea lane between two ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeaRoute {
    pub id: String,
    /// Settlement ids of the two endpoints.
    pub from: String,
    pub to: String,
    pub distance_days: u32,
    /// 1-4.
    pub danger: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_goods: Vec<Good>,
}

impl SeaRoute {
    /// The endpoint that is not `port`.
    pub fn other_end(&self, port: &str) -> Option<&str> {
        if self.from == port {
            Some(&self.to)
        } else if self.to == port {
            Some(&self.from)
        } else {
            None
        }
    }

    pub fn touches(&self, port: &str) -> bool {
        self.from == port || self.to == port
    }
}

impl HasId for SeaRoute {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A pirate fleet working a set of routes.
///
/// Pirate notoriety runs 0-100 (a career scale, unlike the 0-10 antagonist
/// scale); at 80 the captain graduates to a full antagonist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PirateFleet {
    pub id: String,
    pub name: String,
    pub captain: String,
    pub ships: u32,
    pub crew: u32,
    /// Route ids this fleet hunts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub territory: Vec<String>,
    /// 0-100.
    pub notoriety: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_raid: Option<WorldTime>,
    pub bounty: i64,
    pub active: bool,
}

impl PirateFleet {
    /// Shifts notoriety, clamped to 0..100.
    pub fn shift_notoriety(&mut self, delta: i32) {
        self.notoriety = (i32::from(self.notoriety) + delta).clamp(0, 100) as u8;
    }

    /// Raids respect a three-day cooldown.
    pub fn can_raid(&self, now: WorldTime) -> bool {
        match self.last_raid {
            Some(last) => now.days_since(last) >= 3,
            None => true,
        }
    }
}

impl HasId for PirateFleet {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A far country sailors tell of. Generated lazily, then reused so the
/// distant world stays small and consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistantLand {
    pub id: String,
    pub name: String,
    pub flavor: String,
}

impl HasId for DistantLand {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A famous name from over the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistantFigure {
    pub id: String,
    pub name: String,
    pub title: String,
}

impl HasId for DistantFigure {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Per-port cached naval state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortActivity {
    /// Settlement id of the port.
    pub id: String,
    pub ships_in_port: u32,
    /// Goods recently landed from elsewhere.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exotic_goods: Vec<Good>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_arrival: Option<WorldTime>,
}

impl PortActivity {
    pub fn new(settlement_id: impl Into<String>) -> Self {
        Self {
            id: settlement_id.into(),
            ships_in_port: 0,
            exotic_goods: Vec::new(),
            last_arrival: None,
        }
    }

    /// Records a landed good, deduplicated, most recent last, capped at 8.
    pub fn land_good(&mut self, good: Good) {
        self.exotic_goods.retain(|&g| g != good);
        self.exotic_goods.push(good);
        if self.exotic_goods.len() > 8 {
            self.exotic_goods.remove(0);
        }
    }
}

impl HasId for PortActivity {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A recorded wreck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipwreck {
    pub ship_id: String,
    pub ship_name: String,
    /// Route id where she went down.
    pub route_id: String,
    pub occurred: WorldTime,
}

/// All naval bookkeeping, serialized under `state.navalState`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavalState {
    pub routes: Registry<SeaRoute>,
    pub port_activity: Registry<PortActivity>,
    pub distant_lands: Registry<DistantLand>,
    pub distant_figures: Registry<DistantFigure>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wrecks: Vec<Shipwreck>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_other_end() {
        let r = SeaRoute {
            id: "rte-1".to_string(),
            from: "stl-1".to_string(),
            to: "stl-2".to_string(),
            distance_days: 2,
            danger: 1,
            primary_goods: vec![Good::Fish],
        };
        assert_eq!(r.other_end("stl-1"), Some("stl-2"));
        assert_eq!(r.other_end("stl-2"), Some("stl-1"));
        assert_eq!(r.other_end("stl-3"), None);
    }

    #[test]
    fn test_pirate_raid_cooldown() {
        let now = WorldTime::start();
        let mut fleet = PirateFleet {
            id: "prt-1".to_string(),
            name: "The Black Gull".to_string(),
            captain: "Sessa Redmane".to_string(),
            ships: 2,
            crew: 60,
            territory: vec!["rte-1".to_string()],
            notoriety: 10,
            last_raid: None,
            bounty: 0,
            active: true,
        };
        assert!(fleet.can_raid(now));
        fleet.last_raid = Some(now);
        assert!(!fleet.can_raid(now.plus_hours(24)));
        assert!(fleet.can_raid(now.plus_hours(72)));
    }

    #[test]
    fn test_ship_dock_clears_voyage() {
        let mut ship = Ship {
            id: "shp-1".to_string(),
            name: "Dawn Hart".to_string(),
            ship_type: "cog".to_string(),
            owner: "stl-1".to_string(),
            status: ShipStatus::AtSea,
            home_port: "stl-1".to_string(),
            current_location: "rte-1".to_string(),
            destination: Some("stl-2".to_string()),
            departed_at: Some(WorldTime::start()),
            arrives_at: Some(WorldTime::start().plus_hours(48)),
            cargo: BTreeMap::new(),
            crew: 12,
            marines: 0,
            condition: 100,
        };
        ship.dock_at("stl-2");
        assert_eq!(ship.status, ShipStatus::Docked);
        assert!(ship.destination.is_none());
        assert!(ship.arrives_at.is_none());
    }

    #[test]
    fn test_port_exotic_goods_dedup() {
        let mut port = PortActivity::new("stl-1");
        port.land_good(Good::Fish);
        port.land_good(Good::Salt);
        port.land_good(Good::Fish);
        assert_eq!(port.exotic_goods, vec![Good::Salt, Good::Fish]);
    }

    #[test]
    fn test_condition_clamped() {
        let mut ship = Ship {
            id: "shp-1".to_string(),
            name: "Dawn Hart".to_string(),
            ship_type: "cog".to_string(),
            owner: "stl-1".to_string(),
            status: ShipStatus::Docked,
            home_port: "stl-1".to_string(),
            current_location: "stl-1".to_string(),
            destination: None,
            departed_at: None,
            arrives_at: None,
            cargo: BTreeMap::new(),
            crew: 12,
            marines: 0,
            condition: 50,
        };
        ship.shift_condition(-200);
        assert_eq!(ship.condition, 0);
        ship.shift_condition(150);
        assert_eq!(ship.condition, 100);
    }
}
