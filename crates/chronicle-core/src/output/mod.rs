//! Output
//!
//! Snapshot serialization for companion tools and for resuming runs.

pub mod snapshot;
