//! Story Threads and Rumors
//!
//! A story thread is a named arc tracking tension across events with shared
//! actors. Rumors are freshness-decaying information items attached to a
//! settlement of origin.

use serde::{Deserialize, Serialize};

use super::registry::HasId;

/// What kind of arc a thread tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadType {
    Vendetta,
    War,
    RisingThreat,
    Intrigue,
    Tragedy,
}

/// Lifecycle phase of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadPhase {
    Inciting,
    Rising,
    Climax,
    Resolution,
}

/// A named narrative arc. `resolved` is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryThread {
    pub id: String,
    pub thread_type: ThreadType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<String>,
    /// 0-10.
    pub tension: u8,
    pub phase: ThreadPhase,
    /// Short prose beats, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beats: Vec<String>,
    pub resolved: bool,
}

impl StoryThread {
    pub fn new(
        id: impl Into<String>,
        thread_type: ThreadType,
        title: impl Into<String>,
        actors: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            thread_type,
            title: title.into(),
            actors,
            tension: 1,
            phase: ThreadPhase::Inciting,
            beats: Vec::new(),
            resolved: false,
        }
    }

    /// Shifts tension (clamped 0..10) and advances the phase when the new
    /// tension crosses a threshold. Resolved threads never move again.
    pub fn shift_tension(&mut self, delta: i32) {
        if self.resolved {
            return;
        }
        self.tension = (i32::from(self.tension) + delta).clamp(0, 10) as u8;
        self.phase = match self.phase {
            ThreadPhase::Inciting if self.tension >= 4 => ThreadPhase::Rising,
            ThreadPhase::Rising if self.tension >= 8 => ThreadPhase::Climax,
            other => other,
        };
    }

    /// Adds a beat, keeping the most recent twelve.
    pub fn add_beat(&mut self, beat: impl Into<String>) {
        self.beats.push(beat.into());
        if self.beats.len() > 12 {
            let excess = self.beats.len() - 12;
            self.beats.drain(0..excess);
        }
    }

    /// Moves to resolution and marks the thread terminal.
    pub fn resolve(&mut self, final_beat: impl Into<String>) {
        if self.resolved {
            return;
        }
        self.phase = ThreadPhase::Resolution;
        self.resolved = true;
        self.add_beat(final_beat);
    }

    pub fn involves(&self, actor: &str) -> bool {
        self.actors.iter().any(|a| a == actor)
    }
}

impl HasId for StoryThread {
    fn id(&self) -> &str {
        &self.id
    }
}

/// What a rumor is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RumorKind {
    Treasure,
    Antagonist,
    War,
    Strange,
    DistantLand,
}

/// A freshness-decaying information item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rumor {
    pub id: String,
    pub kind: RumorKind,
    pub text: String,
    /// Id or name of what the rumor points at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Settlement id where it circulates.
    pub origin: String,
    /// Days until it fades; removed at 0.
    pub freshness: u32,
}

impl Rumor {
    pub fn new(
        id: impl Into<String>,
        kind: RumorKind,
        text: impl Into<String>,
        origin: impl Into<String>,
        freshness: u32,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            text: text.into(),
            target: None,
            origin: origin.into(),
            freshness,
        }
    }

    pub fn about(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// One day of decay. Returns true while the rumor is still alive.
    pub fn decay(&mut self) -> bool {
        self.freshness = self.freshness.saturating_sub(1);
        self.freshness > 0
    }
}

impl HasId for Rumor {
    fn id(&self) -> &str {
        &self.id
    }
}
