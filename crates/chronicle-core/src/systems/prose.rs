//! Prose Composer
//!
//! Deterministic string assembly for the narrative log. Every function is a
//! pure function of its arguments and the RNG; there is no global state and
//! no template cache.

use chronicle_events::WorldTime;

use crate::components::world::{Terrain, WeatherKind};
use crate::rng::SimRng;

/// A composed summary/details pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Prose {
    pub summary: String,
    pub details: String,
}

/// Everything a scene description can draw on.
#[derive(Debug, Clone, Copy)]
pub struct SceneContext {
    pub time: WorldTime,
    pub weather: WeatherKind,
    pub terrain: Option<Terrain>,
    /// Settlement mood, when the scene is in town.
    pub mood: Option<i32>,
}

/// Time-of-day phrase.
pub fn time_of_day(time: WorldTime) -> &'static str {
    match time.hour() {
        0..=4 => "in the dead of night",
        5..=7 => "at first light",
        8..=11 => "in the morning",
        12..=14 => "at midday",
        15..=17 => "in the late afternoon",
        18..=20 => "at dusk",
        _ => "under a dark sky",
    }
}

/// Weather phrase.
pub fn weather_phrase(kind: WeatherKind) -> &'static str {
    match kind {
        WeatherKind::Clear => "under clear skies",
        WeatherKind::Overcast => "beneath a grey ceiling of cloud",
        WeatherKind::Rain => "through steady rain",
        WeatherKind::Storm => "as a storm lashes the land",
        WeatherKind::Fog => "in a clinging fog",
        WeatherKind::Snow => "through falling snow",
        WeatherKind::Sweltering => "in sweltering heat",
    }
}

/// Terrain phrase.
pub fn terrain_phrase(terrain: Terrain) -> &'static str {
    match terrain {
        Terrain::Road => "on the old road",
        Terrain::Clear => "across open country",
        Terrain::Forest => "beneath the forest canopy",
        Terrain::Hills => "among the windswept hills",
        Terrain::Mountains => "on the high mountain paths",
        Terrain::Swamp => "in the stinking mire",
        Terrain::Desert => "over the burning sands",
        Terrain::Coastal => "along the sea cliffs",
        Terrain::River => "by the riverbank",
        Terrain::Ocean | Terrain::Reef => "on the open water",
    }
}

/// Settlement vibe phrase from its mood band.
pub fn vibe_phrase(mood: i32) -> &'static str {
    match mood {
        i32::MIN..=-4 => "where fear hangs over every doorway",
        -3..=-2 => "where the streets are sullen and watchful",
        -1..=1 => "where life grinds on as it always has",
        2..=3 => "where the taverns are loud and generous",
        _ => "where the whole town feels like a festival",
    }
}

fn scene_fragment(rng: &mut SimRng, ctx: &SceneContext) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.push(weather_phrase(ctx.weather).to_string());
    parts.push(time_of_day(ctx.time).to_string());
    if let Some(terrain) = ctx.terrain {
        parts.push(terrain_phrase(terrain).to_string());
    }
    if let Some(mood) = ctx.mood {
        parts.push(vibe_phrase(mood).to_string());
    }
    // Two fragments read better than four; keep the weather and one other.
    let second = if parts.len() > 2 {
        let idx = 1 + rng.int(parts.len() as u64 - 1) as usize;
        parts.swap_remove(idx)
    } else {
        parts.pop().unwrap_or_default()
    };
    format!("{}, {}", parts[0], second)
}

/// Prose for an encounter, shaped by the reaction.
pub fn encounter_prose(
    rng: &mut SimRng,
    ctx: &SceneContext,
    party_name: &str,
    creature: &str,
    hostile: bool,
    cautious: bool,
) -> Prose {
    let scene = scene_fragment(rng, ctx);
    let summary = if hostile {
        format!("{} are set upon by {}", party_name, creature)
    } else if cautious {
        format!("{} cross paths with wary {}", party_name, creature)
    } else {
        format!("{} share the road with {}", party_name, creature)
    };
    let color: &[&str] = if hostile {
        &[
            "Steel is drawn before a word is spoken.",
            "There is no parley to be had.",
            "The first arrow decides the matter.",
        ]
    } else if cautious {
        &[
            "Hands rest on hilts until the distance opens again.",
            "Neither side turns its back first.",
            "A few hard looks are traded, and nothing else.",
        ]
    } else {
        &[
            "News and a little tobacco change hands.",
            "They part with a nod and no names given.",
            "For an hour the road feels less lonely.",
        ]
    };
    let line = rng.pick(color).map(|s| *s).unwrap_or("");
    Prose {
        summary,
        details: format!("Traveling {}. {}", scene, line),
    }
}

/// Prose for a party arriving at its destination.
pub fn arrival_prose(rng: &mut SimRng, ctx: &SceneContext, party_name: &str, destination: &str) -> Prose {
    let scene = scene_fragment(rng, ctx);
    let closers = [
        "Boots are scraped, packs dropped, and the first round ordered.",
        "They arrive dusty but whole.",
        "The road is behind them, for now.",
    ];
    let line = rng.pick(&closers).map(|s| *s).unwrap_or("");
    Prose {
        summary: format!("{} arrive at {}", party_name, destination),
        details: format!("They come in {}. {}", scene, line),
    }
}

/// Prose for a weather change.
pub fn weather_prose(old: WeatherKind, new: WeatherKind) -> Prose {
    let summary = match new {
        WeatherKind::Clear => "The skies clear".to_string(),
        WeatherKind::Overcast => "Clouds roll in and stay".to_string(),
        WeatherKind::Rain => "Rain sets in".to_string(),
        WeatherKind::Storm => "A storm breaks over the region".to_string(),
        WeatherKind::Fog => "Fog swallows the lowlands".to_string(),
        WeatherKind::Snow => "Snow begins to fall".to_string(),
        WeatherKind::Sweltering => "The heat turns oppressive".to_string(),
    };
    let details = if old == new {
        String::new()
    } else {
        format!("The day before passed {}.", weather_phrase(old))
    };
    Prose { summary, details }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SceneContext {
        SceneContext {
            time: WorldTime::start(),
            weather: WeatherKind::Rain,
            terrain: Some(Terrain::Forest),
            mood: None,
        }
    }

    #[test]
    fn test_pure_per_call() {
        let mut a = SimRng::from_seed("p");
        let mut b = SimRng::from_seed("p");
        let x = encounter_prose(&mut a, &ctx(), "The Gilded Blades", "bandits", true, false);
        let y = encounter_prose(&mut b, &ctx(), "The Gilded Blades", "bandits", true, false);
        assert_eq!(x, y);
    }

    #[test]
    fn test_reaction_shapes_summary() {
        let mut rng = SimRng::from_seed("p");
        let hostile = encounter_prose(&mut rng, &ctx(), "Oath of Six", "wolves", true, false);
        assert!(hostile.summary.contains("set upon"));
        let friendly = encounter_prose(&mut rng, &ctx(), "Oath of Six", "pilgrims", false, false);
        assert!(friendly.summary.contains("share the road"));
    }

    #[test]
    fn test_time_of_day_buckets() {
        assert_eq!(time_of_day(WorldTime::from_ymd_hms(1372, 6, 2, 2, 0, 0).unwrap()), "in the dead of night");
        assert_eq!(time_of_day(WorldTime::from_ymd_hms(1372, 6, 2, 13, 0, 0).unwrap()), "at midday");
        assert_eq!(time_of_day(WorldTime::from_ymd_hms(1372, 6, 2, 22, 0, 0).unwrap()), "under a dark sky");
    }

    #[test]
    fn test_weather_prose_mentions_previous() {
        let p = weather_prose(WeatherKind::Clear, WeatherKind::Storm);
        assert!(p.details.contains("clear skies"));
        let same = weather_prose(WeatherKind::Rain, WeatherKind::Rain);
        assert!(same.details.is_empty());
    }
}
