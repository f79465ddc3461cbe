//! Evolution integration tests
//!
//! Small end-to-end optimizer runs over real matches.

use evolver::{Evolver, EvolverConfig, TuningConfig};
use sim_core::GameConfig;

fn quick_config() -> (EvolverConfig, GameConfig) {
    let evolver = EvolverConfig {
        population_size: 12,
        games_per_individual: 2,
        ..EvolverConfig::default()
    };
    let game = GameConfig {
        num_players: 8,
        max_days: 12,
        ..GameConfig::default()
    };
    (evolver, game)
}

#[test]
fn test_short_run_produces_history() {
    let (evolver_config, game_config) = quick_config();
    let mut evolver = Evolver::new(evolver_config, game_config, 42).unwrap();

    let stats = evolver.evolve(3);

    assert_eq!(stats.len(), 3);
    assert_eq!(evolver.history().len(), 3);
    for entry in &stats {
        assert!(entry.best_fitness >= entry.avg_fitness);
        // Survival alone guarantees positive fitness.
        assert!(entry.avg_fitness > 0.0);
    }
    assert_eq!(evolver.population().len(), 12);
}

#[test]
fn test_population_not_divisible_by_roster() {
    // 12 genomes over 8-player rosters: the second group is padded with
    // throwaway random genomes whose scores are discarded.
    let (evolver_config, game_config) = quick_config();
    let mut evolver = Evolver::new(evolver_config, game_config, 9).unwrap();

    let stats = evolver.evolve(1);

    assert_eq!(stats.len(), 1);
    assert_eq!(evolver.population().len(), 12);
}

#[test]
fn test_zero_elitism_still_fills_population() {
    let (mut evolver_config, game_config) = quick_config();
    evolver_config.elitism_rate = 0.0;
    let mut evolver = Evolver::new(evolver_config, game_config, 3).unwrap();

    evolver.evolve(2);

    assert_eq!(evolver.population().len(), 12);
}

#[test]
fn test_tuning_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tuning.toml");
    std::fs::write(
        &path,
        r#"
        [evolver]
        population_size = 24
        elitism_rate = 0.25

        [game]
        num_players = 6
        mafia_ratio = 0.3
        "#,
    )
    .unwrap();

    let tuning = TuningConfig::from_file(&path).unwrap();
    assert_eq!(tuning.evolver.population_size, 24);
    assert_eq!(tuning.game.num_players, 6);

    let evolver = Evolver::new(tuning.evolver, tuning.game, 1).unwrap();
    assert_eq!(evolver.population().len(), 24);
}
