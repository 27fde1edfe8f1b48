//! Engine error kinds.
//!
//! `ContentTable` and `Serialization` bubble to the public API caller.
//! `InvariantViolation` is recovered inside the orchestrator: the tick
//! reverts and the simulation stays runnable. `EmptyPool` is always
//! recovered where it occurs; a subsystem that cannot pick simply yields
//! no event.

use thiserror::Error;

/// All error conditions the engine can surface.
#[derive(Debug, Error)]
pub enum SimError {
    /// Malformed or missing content table entry. Fatal at bootstrap, never
    /// raised during a tick.
    #[error("content table error: {0}")]
    ContentTable(String),

    /// Snapshot could not be parsed or carries the wrong schema version.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// World state failed a post-tick consistency check.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A random pick found nothing to pick from.
    #[error("empty pool: {0}")]
    EmptyPool(&'static str),
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Serialization(err.to_string())
    }
}

/// Convenience alias used throughout the engine.
pub type SimResult<T> = Result<T, SimError>;
