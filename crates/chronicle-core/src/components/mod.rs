//! World Components
//!
//! Plain data types for every entity the simulation tracks, plus the
//! insertion-ordered registries that hold them. Relations between entities
//! are ids, never direct handles, so records referencing the dead stay
//! valid.

pub mod army;
pub mod antagonist;
pub mod faction;
pub mod naval;
pub mod npc;
pub mod party;
pub mod registry;
pub mod story;
pub mod treasure;
pub mod world;

pub use registry::{HasId, Registry};
