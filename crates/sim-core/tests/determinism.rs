//! Determinism verification tests
//!
//! A match owns its random stream, so identical seeds must replay
//! identical matches, event for event.

use rand::SeedableRng;
use sim_core::{GameConfig, Genome, MafiaGame, SimRng};

fn genomes(n: usize, seed: u64) -> Vec<Genome> {
    let mut rng = SimRng::seed_from_u64(seed);
    (0..n).map(|_| Genome::random(&mut rng)).collect()
}

#[test]
fn test_same_seed_replays_identically() {
    let config = GameConfig::default();
    let population = genomes(8, 7);

    let mut first = MafiaGame::new(config.clone(), &population, 42);
    let outcome1 = first.run();

    let mut second = MafiaGame::new(config, &population, 42);
    let outcome2 = second.run();

    assert_eq!(outcome1, outcome2);
    assert_eq!(first.events(), second.events());
    assert_eq!(first.player_fitness(), second.player_fitness());
}

#[test]
fn test_different_seeds_diverge() {
    let config = GameConfig::default();
    let population = genomes(8, 7);

    let mut first = MafiaGame::new(config.clone(), &population, 1);
    first.run();
    let mut second = MafiaGame::new(config, &population, 2);
    second.run();

    // Role shuffles alone make identical event streams vanishingly unlikely.
    assert_ne!(first.events(), second.events());
}

#[test]
fn test_genome_generation_determinism() {
    let a = genomes(10, 42);
    let b = genomes(10, 42);
    assert_eq!(a, b);

    let c = genomes(10, 43);
    assert_ne!(a, c);
}
