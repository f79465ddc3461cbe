//! Outcome and Report Types
//!
//! Serializable summaries consumed by the driver for console and JSON output.

use serde::{Deserialize, Serialize};

use crate::event::Team;

/// Final result of a single match.
///
/// `winner` is `None` when the match hit the day cap without either win
/// condition firing. `days` is the day counter at exit, which is one past
/// the cap for capped matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: Option<Team>,
    pub days: u32,
}

/// Fitness summary for one completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub best_fitness: f32,
    pub avg_fitness: f32,
}

/// Full report of an evolution run, written as JSON by the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionReport {
    pub seed: u64,
    pub generations: u32,
    pub history: Vec<GenerationStats>,
    pub showcase: Option<MatchOutcome>,
}
