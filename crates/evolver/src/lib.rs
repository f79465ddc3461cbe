//! Evolutionary optimizer for mafia strategy genomes.
//!
//! Each generation the population is split into roster-sized groups,
//! each group plays several independent matches, and per-slot fitness is
//! averaged across them. Reproduction is tournament selection, uniform
//! crossover, and clamped mutation, with the top performers carried over
//! verbatim. The optimizer owns one random stream seeded by the caller;
//! every match it launches gets its own derived seed, so whole runs
//! replay deterministically and matches could be farmed out to parallel
//! workers without sharing generator state.

pub mod config;

pub use config::{ConfigError, EvolverConfig, TuningConfig};

use rand::{Rng, SeedableRng};
use tracing::info;

use sim_core::{GameConfig, Genome, MafiaGame, SimRng};
use sim_events::GenerationStats;

/// Drives the evolution of a genome population across generations.
pub struct Evolver {
    config: EvolverConfig,
    game_config: GameConfig,
    rng: SimRng,
    population: Vec<Genome>,
    generation: u32,
    history: Vec<GenerationStats>,
}

impl Evolver {
    /// Validates the configuration and draws an initial random population.
    pub fn new(
        config: EvolverConfig,
        game_config: GameConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        game_config.validate()?;

        let mut rng = SimRng::seed_from_u64(seed);
        let population = (0..config.population_size)
            .map(|_| Genome::random(&mut rng))
            .collect();

        Ok(Self {
            config,
            game_config,
            rng,
            population,
            generation: 0,
            history: Vec::new(),
        })
    }

    /// The current population, in slot order.
    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    /// Per-generation best/average fitness for all generations run so far.
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Number of completed generations.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// The showcase genome: slot 0 of the population. Elites are inserted
    /// in descending fitness order, so once at least one generation has
    /// run with a nonzero elitism rate this is the top performer of the
    /// last evaluated generation.
    pub fn best_genome(&self) -> &Genome {
        &self.population[0]
    }

    /// Runs `generations` full cycles and returns their stats. Zero
    /// generations is a no-op: the initial population survives unchanged
    /// and no history is recorded.
    pub fn evolve(&mut self, generations: u32) -> Vec<GenerationStats> {
        let mut stats = Vec::with_capacity(generations as usize);

        for _ in 0..generations {
            self.generation += 1;

            let fitness = self.evaluate_population();
            let best = fitness.iter().copied().fold(f32::MIN, f32::max);
            let avg = fitness.iter().sum::<f32>() / fitness.len() as f32;

            let entry = GenerationStats {
                generation: self.generation,
                best_fitness: best,
                avg_fitness: avg,
            };
            info!(
                generation = self.generation,
                best_fitness = best,
                avg_fitness = avg,
                "generation evaluated"
            );
            self.history.push(entry);
            stats.push(entry);

            self.reproduce(&fitness);
        }

        stats
    }

    /// Evaluates the whole population: roster-sized groups, several games
    /// each, fitness averaged per slot. Short final groups are padded
    /// with throwaway random genomes whose scores are discarded.
    fn evaluate_population(&mut self) -> Vec<f32> {
        let pop_size = self.config.population_size;
        let roster = self.game_config.num_players;
        let games = self.config.games_per_individual;

        let mut fitness = vec![0.0f32; pop_size];

        let mut group_start = 0;
        while group_start < pop_size {
            let group_end = (group_start + roster).min(pop_size);
            let mut group: Vec<Genome> =
                self.population[group_start..group_end].to_vec();
            while group.len() < roster {
                group.push(Genome::random(&mut self.rng));
            }

            let mut totals = vec![0.0f32; roster];
            for _ in 0..games {
                let seed = self.rng.gen::<u64>();
                let mut game = MafiaGame::new(self.game_config.clone(), &group, seed);
                game.run();
                for (slot, score) in game.player_fitness().into_iter().enumerate() {
                    totals[slot] += score;
                }
            }

            for slot in 0..(group_end - group_start) {
                fitness[group_start + slot] = totals[slot] / games as f32;
            }

            group_start = group_end;
        }

        fitness
    }

    /// Tournament selection: sample without replacement, keep the fittest.
    fn tournament_select(&mut self, fitness: &[f32]) -> usize {
        let pop_size = self.config.population_size;
        let draw = self.config.tournament_size.min(pop_size);
        let sample = rand::seq::index::sample(&mut self.rng, pop_size, draw);

        let mut winner = sample.index(0);
        for candidate in sample.iter() {
            if fitness[candidate] > fitness[winner] {
                winner = candidate;
            }
        }
        winner
    }

    /// Builds the next generation: elites copied verbatim, the rest bred
    /// by crossover of two tournament winners plus mutation. The old
    /// population is replaced wholesale.
    fn reproduce(&mut self, fitness: &[f32]) {
        let pop_size = self.config.population_size;
        let elite_count = (self.config.elitism_rate * pop_size as f32) as usize;

        let mut by_fitness: Vec<usize> = (0..pop_size).collect();
        by_fitness.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));

        let mut next: Vec<Genome> = by_fitness
            .iter()
            .take(elite_count)
            .map(|&idx| self.population[idx].clone())
            .collect();

        while next.len() < pop_size {
            let parent1 = self.tournament_select(fitness);
            let parent2 = self.tournament_select(fitness);
            let child = Genome::crossover(
                &mut self.rng,
                &self.population[parent1],
                &self.population[parent2],
            );
            let child = child.mutated(
                &mut self.rng,
                self.config.mutation_rate,
                self.config.mutation_strength,
            );
            next.push(child);
        }

        self.population = next;
    }
}
