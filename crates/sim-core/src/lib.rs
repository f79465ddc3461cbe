//! Core match simulation: genomes, beliefs, agent policy, game engine.
//!
//! One [`engine::MafiaGame`] owns everything a match needs - roster, agent
//! belief states, and a seeded random stream - so independent matches can
//! run on independent workers without shared state.

pub mod agent;
pub mod belief;
pub mod config;
pub mod engine;
pub mod genome;
pub mod logger;

pub use agent::Agent;
pub use belief::BeliefState;
pub use config::{ConfigError, GameConfig};
pub use engine::MafiaGame;
pub use genome::Genome;
pub use logger::MatchLogger;

/// Random stream owned by a single match or optimizer run.
///
/// Core code never touches ambient/global randomness; every consumer is
/// handed one of these, seeded by its caller, so runs are reproducible.
pub type SimRng = rand::rngs::SmallRng;
