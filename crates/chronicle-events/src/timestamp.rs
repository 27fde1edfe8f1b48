//! Simulation Clock
//!
//! World time is a real UTC instant. The fantasy calendar (seasons, moon
//! phases, festival days) is derived from it, so all arithmetic lives on the
//! instant and derivations stay consistent with each other.
//!
//! # Example
//!
//! ```
//! use chronicle_events::WorldTime;
//!
//! let t = WorldTime::start();
//! let later = t.plus_hours(26);
//! assert!(later > t);
//! assert_eq!(later.hours_since(t), 26);
//! ```

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A point in world time.
///
/// Serializes to an ISO-8601 UTC string ("1372-06-01T07:00:00Z") so
/// snapshots stay byte-stable and human-readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorldTime(DateTime<Utc>);

impl WorldTime {
    /// The canonical genesis instant for new worlds.
    pub fn start() -> Self {
        // Early summer, morning. Chosen so the first simulated day has
        // daylight travel hours ahead of it.
        Self(
            Utc.with_ymd_and_hms(1372, 6, 1, 7, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        )
    }

    /// Builds a world time from calendar components. Returns `None` for
    /// invalid dates.
    pub fn from_ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Self)
    }

    /// Returns this time advanced by `hours`.
    pub fn plus_hours(self, hours: i64) -> Self {
        Self(self.0 + Duration::hours(hours))
    }

    /// Returns this time advanced by whole days.
    pub fn plus_days(self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Whole hours elapsed since `earlier` (negative if `earlier` is later).
    pub fn hours_since(self, earlier: WorldTime) -> i64 {
        (self.0 - earlier.0).num_hours()
    }

    /// Whole days elapsed since `earlier`.
    pub fn days_since(self, earlier: WorldTime) -> i64 {
        (self.0 - earlier.0).num_days()
    }

    /// Hour of day, 0-23.
    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    /// Calendar month, 1-12.
    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// Day of month, 1-31.
    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Calendar year.
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Days since the unix epoch. Used for moon-phase derivation; may be
    /// negative for early calendar years, callers must use `rem_euclid`.
    pub fn days_since_epoch(self) -> i64 {
        self.0.timestamp().div_euclid(86_400)
    }

    /// True when `self` and `other` fall on the same UTC calendar date.
    ///
    /// Day-boundary detection belongs to the orchestrator alone; it calls
    /// this on consecutive hourly instants.
    pub fn same_day_as(self, other: WorldTime) -> bool {
        self.0.date_naive() == other.0.date_naive()
    }

    /// Night spans the hours before 6:00 and from 18:00 onward.
    pub fn is_night(self) -> bool {
        let h = self.hour();
        h < 6 || h >= 18
    }

    /// Season derived from the calendar month.
    pub fn season(self) -> Season {
        match self.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    /// Moon phase on a fixed 30-day cycle from the epoch.
    pub fn moon_phase(self) -> MoonPhase {
        match self.days_since_epoch().rem_euclid(30) {
            0 | 1 => MoonPhase::New,
            2..=13 => MoonPhase::Waxing,
            14..=16 => MoonPhase::Full,
            _ => MoonPhase::Waning,
        }
    }
}

/// Season of the year, derived from the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub fn all() -> &'static [Season] {
        &[Season::Winter, Season::Spring, Season::Summer, Season::Autumn]
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Winter => write!(f, "winter"),
            Season::Spring => write!(f, "spring"),
            Season::Summer => write!(f, "summer"),
            Season::Autumn => write!(f, "autumn"),
        }
    }
}

/// Phase of the moon on the fixed 30-day cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhase {
    New,
    Waxing,
    Full,
    Waning,
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoonPhase::New => write!(f, "new moon"),
            MoonPhase::Waxing => write!(f, "waxing moon"),
            MoonPhase::Full => write!(f, "full moon"),
            MoonPhase::Waning => write!(f, "waning moon"),
        }
    }
}

impl fmt::Display for WorldTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

/// Error type for parsing a WorldTime from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWorldTimeError(pub String);

impl fmt::Display for ParseWorldTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid world time: '{}', expected ISO-8601 UTC", self.0)
    }
}

impl std::error::Error for ParseWorldTimeError {}

impl FromStr for WorldTime {
    type Err = ParseWorldTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|_| ParseWorldTimeError(s.to_string()))
    }
}

// Serialize as a plain ISO string, not a struct.
impl Serialize for WorldTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WorldTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_components() {
        let t = WorldTime::start();
        assert_eq!(t.year(), 1372);
        assert_eq!(t.month(), 6);
        assert_eq!(t.day(), 1);
        assert_eq!(t.hour(), 7);
    }

    #[test]
    fn test_plus_hours_rolls_day() {
        let t = WorldTime::start();
        let next = t.plus_hours(17);
        assert_eq!(next.hour(), 0);
        assert_eq!(next.day(), 2);
        assert!(!next.same_day_as(t));
    }

    #[test]
    fn test_same_day_within_day() {
        let t = WorldTime::start();
        assert!(t.plus_hours(5).same_day_as(t));
    }

    #[test]
    fn test_night_boundaries() {
        let midnight = WorldTime::from_ymd_hms(1372, 6, 2, 0, 0, 0).unwrap();
        let dawn = WorldTime::from_ymd_hms(1372, 6, 2, 6, 0, 0).unwrap();
        let dusk = WorldTime::from_ymd_hms(1372, 6, 2, 18, 0, 0).unwrap();
        let late = WorldTime::from_ymd_hms(1372, 6, 2, 23, 0, 0).unwrap();
        assert!(midnight.is_night());
        assert!(!dawn.is_night());
        assert!(dusk.is_night());
        assert!(late.is_night());
    }

    #[test]
    fn test_display_iso() {
        let t = WorldTime::start();
        assert_eq!(t.to_string(), "1372-06-01T07:00:00Z");
    }

    #[test]
    fn test_serde_roundtrip() {
        let t = WorldTime::start().plus_hours(100);
        let json = serde_json::to_string(&t).unwrap();
        let parsed: WorldTime = serde_json::from_str(&json).unwrap();
        assert_eq!(t, parsed);
    }

    #[test]
    fn test_serialize_as_string() {
        let t = WorldTime::start();
        assert_eq!(serde_json::to_string(&t).unwrap(), r#""1372-06-01T07:00:00Z""#);
    }

    #[test]
    fn test_parse_error() {
        assert!("not a time".parse::<WorldTime>().is_err());
        assert!("1372-13-99T00:00:00Z".parse::<WorldTime>().is_err());
    }

    #[test]
    fn test_hours_since() {
        let t = WorldTime::start();
        assert_eq!(t.plus_hours(48).hours_since(t), 48);
        assert_eq!(t.hours_since(t.plus_hours(3)), -3);
    }

    #[test]
    fn test_days_since_epoch_stable() {
        let a = WorldTime::start();
        let b = a.plus_hours(24);
        assert_eq!(b.days_since_epoch() - a.days_since_epoch(), 1);
    }

    #[test]
    fn test_season_by_month() {
        assert_eq!(WorldTime::from_ymd_hms(1372, 1, 10, 0, 0, 0).unwrap().season(), Season::Winter);
        assert_eq!(WorldTime::from_ymd_hms(1372, 4, 10, 0, 0, 0).unwrap().season(), Season::Spring);
        assert_eq!(WorldTime::from_ymd_hms(1372, 7, 10, 0, 0, 0).unwrap().season(), Season::Summer);
        assert_eq!(WorldTime::from_ymd_hms(1372, 10, 10, 0, 0, 0).unwrap().season(), Season::Autumn);
        assert_eq!(WorldTime::from_ymd_hms(1372, 12, 10, 0, 0, 0).unwrap().season(), Season::Winter);
    }

    #[test]
    fn test_moon_cycle_thirty_days() {
        let t = WorldTime::start();
        assert_eq!(t.moon_phase(), t.plus_days(30).moon_phase());
        assert_eq!(t.moon_phase(), t.plus_days(60).moon_phase());
        // All four phases occur within one cycle.
        let mut seen = std::collections::HashSet::new();
        for d in 0..30 {
            seen.insert(format!("{}", t.plus_days(d).moon_phase()));
        }
        assert_eq!(seen.len(), 4);
    }
}
