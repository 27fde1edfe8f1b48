//! Chronicle Engine
//!
//! A deterministic, tick-driven fantasy-world simulator. A world is grown
//! from a textual seed; everything after genesis is a pure function of
//! `(world state, seed, elapsed hours)`, producing both updated state and
//! a chronological narrative log.
//!
//! # Example
//!
//! ```
//! use chronicle_core::{Simulation, WorldArchetype};
//!
//! let mut sim = Simulation::new("alpha", WorldArchetype::Standard).unwrap();
//! let logs = sim.advance(24);
//! let snapshot = sim.snapshot().unwrap();
//!
//! // Same seed, same day, same chronicle.
//! let mut again = Simulation::new("alpha", WorldArchetype::Standard).unwrap();
//! let logs_again = again.advance(24);
//! assert_eq!(logs.len(), logs_again.len());
//! assert_eq!(snapshot, again.snapshot().unwrap());
//! ```

pub mod components;
pub mod content;
pub mod error;
pub mod output;
pub mod rng;
pub mod setup;
pub mod sim;
pub mod state;
pub mod systems;

pub use content::ContentTables;
pub use error::{SimError, SimResult};
pub use sim::{verify_invariants, Simulation};
pub use state::{Sim, WorldArchetype, SCHEMA_VERSION};

// Re-export the schema crate so callers need only one dependency.
pub use chronicle_events as events;
