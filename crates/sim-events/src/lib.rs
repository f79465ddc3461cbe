//! Shared event and outcome types for the mafia simulation.
//!
//! This crate contains pure data structures with no game logic.
//! It is a dependency for all other crates in the workspace.

pub mod event;
pub mod snapshot;

// Re-export event types
pub use event::{AgentId, MatchEvent, Role, StatementKind, Team};

// Re-export snapshot types
pub use snapshot::{EvolutionReport, GenerationStats, MatchOutcome};
