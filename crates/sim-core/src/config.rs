//! Game Configuration
//!
//! Match parameters with defaults matching the standard 8-player setup.
//! Values outside their documented ranges are a caller contract violation
//! and fail fast at validation; everything else the engine resolves itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters for a single match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Roster size per match (>= 2)
    pub num_players: usize,
    /// Fraction of the roster assigned mafia, in [0, 1]
    pub mafia_ratio: f32,
    /// Fraction of the roster assigned detective, in [0, 1]
    pub detective_prob: f32,
    /// Fraction of the roster assigned doctor, in [0, 1]
    pub doctor_prob: f32,
    /// Day cap; a match still undecided after this many days ends unresolved
    pub max_days: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 8,
            mafia_ratio: 0.25,
            detective_prob: 0.125,
            doctor_prob: 0.125,
            max_days: 20,
        }
    }
}

impl GameConfig {
    /// Checks parameter ranges. Role-count overflow is not an error here;
    /// the engine's shrink policy always produces a valid roster.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_players < 2 {
            return Err(ConfigError::RosterTooSmall(self.num_players));
        }
        for (name, value) in [
            ("mafia_ratio", self.mafia_ratio),
            ("detective_prob", self.detective_prob),
            ("doctor_prob", self.doctor_prob),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange {
                    name,
                    value,
                });
            }
        }
        if self.max_days == 0 {
            return Err(ConfigError::ZeroDayCap);
        }
        Ok(())
    }
}

/// Errors from invalid match parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("roster size {0} is too small, need at least 2 players")]
    RosterTooSmall(usize),
    #[error("{name} must be in [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f32 },
    #[error("max_days must be at least 1")]
    ZeroDayCap,
}
