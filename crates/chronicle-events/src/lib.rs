//! Shared schema types for the chronicle engine.
//!
//! This crate defines the data that crosses the engine boundary: the
//! narrative log (`LogEntry`), the causal record (`WorldEvent`), and the
//! simulation clock (`WorldTime`). It carries no engine logic so that
//! companion tools can parse simulator output without linking the engine.

pub mod event;
pub mod log;
pub mod timestamp;

pub use event::{EventData, RelationKind, RelationshipTie, WorldEvent, WorldEventKind};
pub use log::{LogCategory, LogEntry, LogFilter};
pub use timestamp::{MoonPhase, Season, WorldTime};
