//! Configuration loading for the evolver.
//!
//! Tuning parameters live in an optional TOML file; every field has a
//! default so a partial (or absent) file works. Invalid rates fail fast
//! at construction, per the caller contract.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use sim_core::GameConfig;

/// Genetic algorithm parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolverConfig {
    /// Number of genomes in the population (>= 1)
    pub population_size: usize,
    /// Fraction of the population copied verbatim each generation, in [0, 1]
    pub elitism_rate: f32,
    /// Per-trait mutation probability, in [0, 1]
    pub mutation_rate: f32,
    /// Maximum per-trait mutation delta, in [0, 1]
    pub mutation_strength: f32,
    /// Individuals sampled per tournament draw (>= 1)
    pub tournament_size: usize,
    /// Matches played per roster group when evaluating fitness (>= 1)
    pub games_per_individual: u32,
}

impl Default for EvolverConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            elitism_rate: 0.2,
            mutation_rate: 0.1,
            mutation_strength: 0.2,
            tournament_size: 3,
            games_per_individual: 5,
        }
    }
}

impl EvolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::EmptyTournament);
        }
        if self.games_per_individual == 0 {
            return Err(ConfigError::ZeroGames);
        }
        for (name, value) in [
            ("elitism_rate", self.elitism_rate),
            ("mutation_rate", self.mutation_rate),
            ("mutation_strength", self.mutation_strength),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

/// Complete tuning file: evolver plus per-match game parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    pub evolver: EvolverConfig,
    pub game: GameConfig,
}

impl TuningConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: TuningConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.evolver.validate()?;
        self.game.validate()?;
        Ok(())
    }
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("population_size must be at least 1")]
    EmptyPopulation,
    #[error("tournament_size must be at least 1")]
    EmptyTournament,
    #[error("games_per_individual must be at least 1")]
    ZeroGames,
    #[error("{name} must be in [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f32 },
    #[error("invalid game config: {0}")]
    Game(#[from] sim_core::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
