//! End-to-end match tests
//!
//! Full matches on the standard 8-player roster with fixed seeds.

use rand::SeedableRng;
use sim_core::{GameConfig, Genome, MafiaGame, SimRng};
use sim_events::{Role, Team};

fn genomes(n: usize, seed: u64) -> Vec<Genome> {
    let mut rng = SimRng::seed_from_u64(seed);
    (0..n).map(|_| Genome::random(&mut rng)).collect()
}

#[test]
fn test_standard_match_completes() {
    let config = GameConfig::default();
    let roles = vec![
        Role::Mafia,
        Role::Mafia,
        Role::Detective,
        Role::Doctor,
        Role::Villager,
        Role::Villager,
        Role::Villager,
        Role::Villager,
    ];
    let mut game =
        MafiaGame::with_assigned_roles(config.clone(), &genomes(8, 101), roles, 101);
    let outcome = game.run();

    assert!(outcome.days <= config.max_days + 1);
    assert!(
        outcome.winner.is_some(),
        "an 8-player match with 2 mafia should resolve within the cap"
    );

    let fitness = game.player_fitness();
    assert_eq!(fitness.len(), 8);

    // Team-win bonus applies to every member of the winning team, dead or alive.
    let winner = outcome.winner.unwrap();
    for agent in game.agents() {
        if agent.role.team() == winner {
            assert!(
                fitness[agent.id] >= 100.0,
                "agent {} on the winning team scored only {}",
                agent.id,
                fitness[agent.id]
            );
        }
    }
}

#[test]
fn test_match_produces_readable_log() {
    let mut game = MafiaGame::new(GameConfig::default(), &genomes(8, 102), 102);
    game.run();

    let lines = game.log_lines();
    assert!(!lines.is_empty());
    assert!(lines[0].starts_with("Roles assigned:"));
    assert!(lines.iter().any(|l| l.starts_with("-- Day 1 --")));
    if game.outcome().winner == Some(Team::Town) {
        assert!(lines.iter().any(|l| l.contains("Town wins")));
    }
}

#[test]
fn test_belief_invariants_hold_after_full_match() {
    let mut game = MafiaGame::new(GameConfig::default(), &genomes(8, 103), 103);
    game.run();

    for agent in game.agents() {
        // Every probability stays a probability.
        for target in 0..8 {
            for role in Role::ALL {
                let p = agent.beliefs.role_belief(role, target);
                assert!(
                    (0.0..=1.0).contains(&p),
                    "agent {} holds belief {} about target {}",
                    agent.id,
                    p,
                    target
                );
            }
        }
        // Agents are certain of their own role.
        assert!((agent.beliefs.role_belief(agent.role, agent.id) - 1.0).abs() < 1e-6);
    }

    // Survivors witnessed every elimination, so each dead agent's revealed
    // role is held with certainty.
    let survivors: Vec<_> = game.agents().iter().filter(|a| a.alive).collect();
    let dead: Vec<_> = game.agents().iter().filter(|a| !a.alive).collect();
    assert!(!dead.is_empty());
    for observer in &survivors {
        for victim in &dead {
            let p = observer.beliefs.role_belief(victim.role, victim.id);
            assert!(
                (p - 1.0).abs() < 1e-6,
                "agent {} is unsure of dead agent {}'s role ({})",
                observer.id,
                victim.id,
                p
            );
        }
    }
}

#[test]
fn test_trust_stays_bounded() {
    let mut game = MafiaGame::new(GameConfig::default(), &genomes(8, 104), 104);
    game.run();

    for agent in game.agents() {
        for target in 0..8 {
            let trust = agent.beliefs.trust(target);
            assert!((0.0..=1.0).contains(&trust));
        }
    }
}
