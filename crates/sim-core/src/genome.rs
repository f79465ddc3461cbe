//! Strategy Genome
//!
//! The evolvable trait vector governing one agent's decision policy.
//! All traits live in [0, 1]. A genome is immutable once created;
//! mutation and crossover always produce a new genome.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::SimRng;

/// Number of evolvable traits.
pub const TRAIT_COUNT: usize = 13;

/// Trait names in the fixed order used by [`Genome::as_array`].
pub const TRAIT_NAMES: [&str; TRAIT_COUNT] = [
    "accusation_threshold",
    "false_accusation_rate",
    "deception_skill",
    "self_preservation",
    "trust_baseline",
    "trust_change_rate",
    "vote_randomness",
    "detective_strategy",
    "doctor_strategy",
    "bluff_chance",
    "bluff_confidence",
    "verbosity",
    "defensiveness",
];

/// One agent's strategy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    /// Probability of attempting an accusation each discussion turn
    pub accusation_threshold: f32,
    /// Chance of accusing without a strong suspicion
    pub false_accusation_rate: f32,
    /// How effectively a mafia member lies (gates cover statements)
    pub deception_skill: f32,
    /// Weight on own survival over team objectives
    pub self_preservation: f32,
    /// Starting disposition toward strangers
    pub trust_baseline: f32,
    /// How quickly trust moves on new evidence
    pub trust_change_rate: f32,
    /// Chance of casting a uniformly random vote
    pub vote_randomness: f32,
    /// Detective dial: < 0.5 investigates the most suspicious, else random
    pub detective_strategy: f32,
    /// Doctor dial: < 0.3 self-protect, < 0.7 protect value, else infer risk
    pub doctor_strategy: f32,
    /// Chance to bluff about own role
    pub bluff_chance: f32,
    /// Confidence projected while bluffing
    pub bluff_confidence: f32,
    /// How much the agent talks
    pub verbosity: f32,
    /// How strongly the agent reacts to being accused
    pub defensiveness: f32,
}

impl Genome {
    /// Draws a fresh genome from the initial trait distributions.
    pub fn random(rng: &mut SimRng) -> Self {
        Self {
            accusation_threshold: rng.gen_range(0.4..0.8),
            false_accusation_rate: rng.gen_range(0.0..0.3),
            deception_skill: rng.gen_range(0.3..0.9),
            self_preservation: rng.gen_range(0.5..1.0),
            trust_baseline: rng.gen_range(0.3..0.7),
            trust_change_rate: rng.gen_range(0.05..0.2),
            vote_randomness: rng.gen_range(0.0..0.3),
            detective_strategy: rng.gen_range(0.0..1.0),
            doctor_strategy: rng.gen_range(0.0..1.0),
            bluff_chance: rng.gen_range(0.1..0.5),
            bluff_confidence: rng.gen_range(0.5..1.0),
            verbosity: rng.gen_range(0.2..0.8),
            defensiveness: rng.gen_range(0.2..0.8),
        }
    }

    /// Trait values in the fixed order of [`TRAIT_NAMES`].
    pub fn as_array(&self) -> [f32; TRAIT_COUNT] {
        [
            self.accusation_threshold,
            self.false_accusation_rate,
            self.deception_skill,
            self.self_preservation,
            self.trust_baseline,
            self.trust_change_rate,
            self.vote_randomness,
            self.detective_strategy,
            self.doctor_strategy,
            self.bluff_chance,
            self.bluff_confidence,
            self.verbosity,
            self.defensiveness,
        ]
    }

    /// Rebuilds a genome from trait values in [`TRAIT_NAMES`] order.
    pub fn from_array(values: [f32; TRAIT_COUNT]) -> Self {
        Self {
            accusation_threshold: values[0],
            false_accusation_rate: values[1],
            deception_skill: values[2],
            self_preservation: values[3],
            trust_baseline: values[4],
            trust_change_rate: values[5],
            vote_randomness: values[6],
            detective_strategy: values[7],
            doctor_strategy: values[8],
            bluff_chance: values[9],
            bluff_confidence: values[10],
            verbosity: values[11],
            defensiveness: values[12],
        }
    }

    /// Returns a mutated copy. Each trait independently mutates with
    /// probability `rate`, perturbed by a uniform delta in
    /// [-strength, strength] and clamped to [0, 1].
    pub fn mutated(&self, rng: &mut SimRng, rate: f32, strength: f32) -> Self {
        let mut values = self.as_array();
        for value in values.iter_mut() {
            if rng.gen::<f32>() < rate {
                let delta = rng.gen_range(-strength..=strength);
                *value = (*value + delta).clamp(0.0, 1.0);
            }
        }
        Self::from_array(values)
    }

    /// Uniform crossover: each trait is inherited whole from one of the
    /// two parents with 50/50 probability. Never blends values.
    pub fn crossover(rng: &mut SimRng, parent1: &Genome, parent2: &Genome) -> Self {
        let a = parent1.as_array();
        let b = parent2.as_array();
        let mut values = [0.0; TRAIT_COUNT];
        for i in 0..TRAIT_COUNT {
            values[i] = if rng.gen::<f32>() < 0.5 { a[i] } else { b[i] };
        }
        Self::from_array(values)
    }
}
