//! Calendar and Weather
//!
//! Day-granular derivations: weather regeneration, festival days, and the
//! season/moon context other subsystems read. All date arithmetic lives on
//! `WorldTime`; this module only reacts to the day rollover the
//! orchestrator detects.

use chronicle_events::{EventData, LogCategory, LogEntry, WorldEvent, WorldEventKind};

use crate::components::world::Weather;
use crate::content::ContentTables;
use crate::state::Sim;

use super::prose;

/// Chance the weather simply holds from one day to the next.
const WEATHER_PERSISTENCE: f64 = 0.6;

/// Regenerates the weather for a new day and logs a change of sky.
pub fn weather_daily_tick(sim: &mut Sim, content: &ContentTables, logs: &mut Vec<LogEntry>) {
    let old = sim.world.weather.kind;

    let new = if sim.state.rng.chance(WEATHER_PERSISTENCE) {
        old
    } else {
        let season = sim.meta.world_time.season();
        match content.weather_odds.get(&season) {
            Some(odds) if !odds.is_empty() => {
                let weights: Vec<u32> = odds.iter().map(|o| o.weight).collect();
                let idx = sim.state.rng.weighted(&weights);
                odds[idx].kind
            }
            _ => old,
        }
    };

    if new != old {
        sim.world.weather = Weather {
            kind: new,
            since: sim.meta.world_time,
        };
        let p = prose::weather_prose(old, new);
        logs.push(sim.log(LogCategory::Weather, p.summary).with_details(p.details));
    } else {
        // Same sky, still worth a line at the day boundary.
        let p = prose::weather_prose(old, new);
        logs.push(sim.log(LogCategory::Weather, format!("{} again", p.summary)));
    }
}

/// Checks the holiday table; on a festival day every settlement takes a
/// mood lift and one festival event enters the causal record.
pub fn festival_check(sim: &mut Sim, content: &ContentTables, logs: &mut Vec<LogEntry>) -> Option<WorldEvent> {
    let time = sim.meta.world_time;
    let holiday = content.holiday_on(time.month(), time.day())?;
    let name = holiday.name.clone();

    for settlement in sim.world.settlements.iter_mut() {
        settlement.shift_mood(1);
    }

    logs.push(
        sim.log(
            LogCategory::Festival,
            format!("{} is kept across the land", name),
        )
        .with_details("Work stops early, fires are lit, and old songs get new verses."),
    );

    let id = sim.next_id("evt");
    Some(
        WorldEvent::new(
            id,
            WorldEventKind::Festival,
            time,
            2,
            EventData::General {
                description: name,
            },
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup;
    use crate::state::WorldArchetype;

    fn sim() -> Sim {
        let content = ContentTables::default();
        setup::genesis("calendar-test", WorldArchetype::Standard, &content)
    }

    #[test]
    fn test_weather_tick_is_deterministic() {
        let content = ContentTables::default();
        let mut a = sim();
        let mut b = sim();
        let mut logs_a = Vec::new();
        let mut logs_b = Vec::new();
        for _ in 0..10 {
            weather_daily_tick(&mut a, &content, &mut logs_a);
            weather_daily_tick(&mut b, &content, &mut logs_b);
        }
        assert_eq!(a.world.weather.kind, b.world.weather.kind);
        let summaries_a: Vec<&str> = logs_a.iter().map(|l| l.summary.as_str()).collect();
        let summaries_b: Vec<&str> = logs_b.iter().map(|l| l.summary.as_str()).collect();
        assert_eq!(summaries_a, summaries_b);
    }

    #[test]
    fn test_weather_tick_always_logs() {
        let content = ContentTables::default();
        let mut s = sim();
        let mut logs = Vec::new();
        weather_daily_tick(&mut s, &content, &mut logs);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].category, LogCategory::Weather);
    }

    #[test]
    fn test_festival_on_holiday() {
        let content = ContentTables::default();
        let mut s = sim();
        // The Long Sun falls on the 21st of the sixth month.
        s.meta.world_time = chronicle_events::WorldTime::from_ymd_hms(1372, 6, 21, 9, 0, 0).unwrap();
        let moods_before: Vec<i32> = s.world.settlements.iter().map(|x| x.mood).collect();
        let mut logs = Vec::new();
        let evt = festival_check(&mut s, &content, &mut logs);
        assert!(evt.is_some());
        assert_eq!(evt.map(|e| e.kind), Some(WorldEventKind::Festival));
        assert_eq!(logs.len(), 1);
        for (settlement, before) in s.world.settlements.iter().zip(moods_before) {
            assert!(settlement.mood >= before);
        }
    }

    #[test]
    fn test_no_festival_on_ordinary_day() {
        let content = ContentTables::default();
        let mut s = sim();
        s.meta.world_time = chronicle_events::WorldTime::from_ymd_hms(1372, 6, 3, 9, 0, 0).unwrap();
        let mut logs = Vec::new();
        assert!(festival_check(&mut s, &content, &mut logs).is_none());
        assert!(logs.is_empty());
    }
}
