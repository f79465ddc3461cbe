//! Game Engine
//!
//! Phase-based state machine for one match: day discussion, day voting,
//! then the three night phases in fixed order, repeating until a win
//! condition fires or the day cap runs out. The engine owns the roster,
//! the event log, and the match's random stream; agents act in ascending
//! id order so a fixed seed replays identically.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use sim_events::{AgentId, MatchEvent, MatchOutcome, Role, StatementKind, Team};

use crate::agent::Agent;
use crate::config::GameConfig;
use crate::genome::Genome;
use crate::SimRng;

/// The engine's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    DayDiscussion,
    DayVoting,
    NightMafia,
    NightDetective,
    NightDoctor,
}

/// One full match among a fixed roster of agents.
pub struct MafiaGame {
    config: GameConfig,
    rng: SimRng,
    agents: Vec<Agent>,
    /// Alive agent ids, kept in ascending order
    alive: Vec<AgentId>,
    day: u32,
    phase: Phase,
    game_over: bool,
    winner: Option<Team>,
    night_kill_target: Option<AgentId>,
    protected: Option<AgentId>,
    protector: Option<AgentId>,
    events: Vec<MatchEvent>,
    death_day: Vec<Option<u32>>,
}

impl MafiaGame {
    /// Builds a match with uniformly shuffled role assignment.
    ///
    /// Slots beyond `genomes.len()` receive freshly drawn random genomes.
    /// The caller is expected to have validated `config`.
    pub fn new(config: GameConfig, genomes: &[Genome], seed: u64) -> Self {
        let mut rng = SimRng::seed_from_u64(seed);
        let roles = assign_roles(&config, &mut rng);
        Self::build(config, genomes, roles, rng)
    }

    /// Builds a match with an explicit role layout instead of a shuffle.
    /// Useful for scripted scenarios; `roles` must cover the full roster.
    pub fn with_assigned_roles(
        config: GameConfig,
        genomes: &[Genome],
        roles: Vec<Role>,
        seed: u64,
    ) -> Self {
        assert_eq!(roles.len(), config.num_players, "one role per roster slot");
        let rng = SimRng::seed_from_u64(seed);
        Self::build(config, genomes, roles, rng)
    }

    fn build(
        config: GameConfig,
        genomes: &[Genome],
        roles: Vec<Role>,
        mut rng: SimRng,
    ) -> Self {
        let num_players = config.num_players;
        let mut agents = Vec::with_capacity(num_players);
        for (id, role) in roles.iter().enumerate() {
            let genome = genomes
                .get(id)
                .cloned()
                .unwrap_or_else(|| Genome::random(&mut rng));
            agents.push(Agent::new(id, num_players, *role, genome));
        }

        let counts = |role: Role| roles.iter().filter(|&&r| r == role).count();
        let events = vec![MatchEvent::RolesAssigned {
            mafia: counts(Role::Mafia),
            detectives: counts(Role::Detective),
            doctors: counts(Role::Doctor),
            villagers: counts(Role::Villager),
        }];

        Self {
            config,
            rng,
            agents,
            alive: (0..num_players).collect(),
            day: 0,
            phase: Phase::DayDiscussion,
            game_over: false,
            winner: None,
            night_kill_target: None,
            protected: None,
            protector: None,
            events,
            death_day: vec![None; num_players],
        }
    }

    /// Runs the match to completion: a winner, or the day cap.
    ///
    /// A match that exceeds the cap undecided keeps `winner` unset; the
    /// returned day counter is wherever the loop stopped.
    pub fn run(&mut self) -> MatchOutcome {
        self.day = 1;

        while !self.game_over && self.day <= self.config.max_days {
            self.events.push(MatchEvent::DayBegan { day: self.day });

            self.phase = Phase::DayDiscussion;
            self.run_day_discussion();

            self.phase = Phase::DayVoting;
            self.run_day_voting();
            if self.game_over {
                break;
            }

            self.events.push(MatchEvent::NightBegan { day: self.day });
            self.night_kill_target = None;
            self.protected = None;
            self.protector = None;

            self.phase = Phase::NightMafia;
            self.run_night_mafia();
            self.phase = Phase::NightDetective;
            self.run_night_detective();
            self.phase = Phase::NightDoctor;
            self.run_night_doctor();

            self.resolve_night();
            self.check_game_over();

            self.day += 1;
        }

        let outcome = self.outcome();
        debug!(winner = ?outcome.winner, days = outcome.days, "match finished");
        outcome
    }

    /// Winner and day count so far.
    pub fn outcome(&self) -> MatchOutcome {
        MatchOutcome {
            winner: self.winner,
            days: self.day,
        }
    }

    /// The structured event log, in order.
    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    /// The event log rendered as human-readable lines.
    pub fn log_lines(&self) -> Vec<String> {
        self.events.iter().map(|e| e.to_string()).collect()
    }

    /// The full roster (slot index == agent id), dead agents included.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Ids of agents still alive, ascending.
    pub fn alive(&self) -> &[AgentId] {
        &self.alive
    }

    /// Current phase (the last phase entered once the match is over).
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Per-slot fitness: survival time, team-win bonus, and role bonuses
    /// (mafia deception, detective investigations, doctor saves).
    pub fn player_fitness(&self) -> Vec<f32> {
        let last_day = self.day.min(self.config.max_days);

        self.agents
            .iter()
            .map(|agent| {
                let survival = self.death_day[agent.id].unwrap_or(last_day) as f32;
                let mut fitness = survival * 10.0;

                if self.winner == Some(agent.role.team()) {
                    fitness += 100.0;
                }

                match agent.role {
                    Role::Mafia => {
                        let deceptions = agent
                            .statements_made
                            .iter()
                            .filter(|s| match (s.kind, s.subject) {
                                // Cover statements for an accomplice, or
                                // accusations thrown at innocents.
                                (StatementKind::Defend, Some(subject)) => {
                                    agent.beliefs.facts().is_known(subject, Role::Mafia)
                                }
                                (StatementKind::Accuse, Some(subject)) => {
                                    !agent.beliefs.facts().is_known(subject, Role::Mafia)
                                }
                                _ => false,
                            })
                            .count();
                        fitness += deceptions as f32 * 5.0;
                    }
                    Role::Detective => {
                        fitness += agent.beliefs.investigation_count() as f32 * 10.0;
                    }
                    Role::Doctor => {
                        fitness += agent.saves as f32 * 25.0;
                    }
                    Role::Villager => {}
                }

                fitness
            })
            .collect()
    }

    /// Each alive agent speaks once, in ascending id order. Statements
    /// broadcast synchronously, so later speakers react to earlier ones
    /// within the same day.
    fn run_day_discussion(&mut self) {
        let alive = self.alive.clone();
        for &speaker in &alive {
            let statement =
                self.agents[speaker].make_statement(&alive, self.day, &mut self.rng);

            self.events.push(MatchEvent::Statement {
                day: self.day,
                speaker,
                role: self.agents[speaker].role,
                kind: statement.kind,
                subject: statement.subject,
            });

            for &observer in &alive {
                if observer != speaker {
                    self.agents[observer].observe_statement(
                        speaker,
                        statement.kind,
                        statement.subject,
                        self.day,
                    );
                }
            }
        }
    }

    /// Each alive agent votes (or abstains); votes broadcast like
    /// statements. The plurality target is eliminated, ties broken
    /// uniformly at random among the leaders.
    fn run_day_voting(&mut self) {
        let alive = self.alive.clone();
        let mut tally: HashMap<AgentId, usize> = HashMap::new();

        for &voter in &alive {
            let target = self.agents[voter].choose_vote(&alive, &mut self.rng);
            self.events.push(MatchEvent::Vote {
                day: self.day,
                voter,
                target,
            });
            if let Some(target) = target {
                *tally.entry(target).or_insert(0) += 1;
            }
            for &observer in &alive {
                self.agents[observer].observe_vote(voter, target, self.day);
            }
        }

        let Some(&max_votes) = tally.values().max() else {
            self.events.push(MatchEvent::NoElimination { day: self.day });
            return;
        };

        let mut leaders: Vec<AgentId> = tally
            .iter()
            .filter(|&(_, &count)| count == max_votes)
            .map(|(&id, _)| id)
            .collect();
        leaders.sort_unstable();

        // choose() is total over the non-empty leader set.
        if let Some(&eliminated) = leaders.choose(&mut self.rng) {
            self.eliminate(eliminated, false);
            self.check_game_over();
        }
    }

    /// Every alive mafia member picks a target; the engine arbitrates by
    /// choosing uniformly among the non-abstaining picks.
    fn run_night_mafia(&mut self) {
        let alive = self.alive.clone();
        let mafia: Vec<AgentId> = alive
            .iter()
            .copied()
            .filter(|&id| self.agents[id].role == Role::Mafia)
            .collect();

        let mut choices = Vec::new();
        for &id in &mafia {
            if let Some(target) = self.agents[id].night_action(&alive, &mut self.rng) {
                choices.push(target);
            }
        }

        if let Some(&target) = choices.choose(&mut self.rng) {
            self.night_kill_target = Some(target);
            self.events.push(MatchEvent::MafiaTarget {
                day: self.day,
                target,
            });
        }
    }

    /// Each alive detective investigates; only that detective learns the
    /// result. The log line is display-only.
    fn run_night_detective(&mut self) {
        let alive = self.alive.clone();
        let detectives: Vec<AgentId> = alive
            .iter()
            .copied()
            .filter(|&id| self.agents[id].role == Role::Detective)
            .collect();

        for &id in &detectives {
            if let Some(target) = self.agents[id].night_action(&alive, &mut self.rng) {
                let is_mafia = self.agents[target].role == Role::Mafia;
                self.agents[id].observe_investigation(target, is_mafia);
                self.events.push(MatchEvent::Investigation {
                    day: self.day,
                    detective: id,
                    target,
                    is_mafia,
                });
            }
        }
    }

    /// Each alive doctor picks a protection target. With multiple doctors
    /// the last one processed (ascending id) overwrites the choice.
    fn run_night_doctor(&mut self) {
        let alive = self.alive.clone();
        let doctors: Vec<AgentId> = alive
            .iter()
            .copied()
            .filter(|&id| self.agents[id].role == Role::Doctor)
            .collect();

        for &id in &doctors {
            if let Some(target) = self.agents[id].night_action(&alive, &mut self.rng) {
                self.protected = Some(target);
                self.protector = Some(id);
                self.events.push(MatchEvent::Protection {
                    day: self.day,
                    doctor: id,
                    target,
                });
            }
        }
    }

    /// Applies the night's kill unless protection blocked it.
    fn resolve_night(&mut self) {
        let Some(target) = self.night_kill_target else {
            return;
        };

        if self.protected == Some(target) {
            self.events.push(MatchEvent::KillPrevented {
                day: self.day,
                target,
            });
            if let Some(protector) = self.protector {
                self.agents[protector].saves += 1;
            }
        } else {
            self.eliminate(target, true);
        }
    }

    /// Removes an agent and broadcasts the death (with role reveal) to
    /// everyone still alive.
    fn eliminate(&mut self, agent: AgentId, at_night: bool) {
        if !self.alive.contains(&agent) {
            return;
        }

        self.agents[agent].alive = false;
        self.alive.retain(|&id| id != agent);
        self.death_day[agent] = Some(self.day);

        let role = self.agents[agent].role;
        self.events.push(MatchEvent::Eliminated {
            day: self.day,
            agent,
            role,
            at_night,
        });
        debug!(agent, %role, at_night, day = self.day, "agent eliminated");

        let alive = self.alive.clone();
        for &observer in &alive {
            self.agents[observer].observe_death(agent, at_night, role);
        }
    }

    /// Win check, run after every elimination: town wins when no mafia
    /// remain; mafia win the moment they match or outnumber the town.
    fn check_game_over(&mut self) {
        if self.game_over {
            return;
        }

        let alive_mafia = self
            .alive
            .iter()
            .filter(|&&id| self.agents[id].role == Role::Mafia)
            .count();
        let alive_town = self.alive.len() - alive_mafia;

        let winner = if alive_mafia == 0 {
            Some(Team::Town)
        } else if alive_mafia >= alive_town {
            Some(Team::Mafia)
        } else {
            None
        };

        if let Some(team) = winner {
            self.game_over = true;
            self.winner = Some(team);
            self.events.push(MatchEvent::GameOver {
                day: self.day,
                winner: team,
            });
        }
    }
}

/// Role assignment per config: mafia count from the ratio (at least 1),
/// detective/doctor counts from their probabilities (bumped to 1 when the
/// probability is positive but the floor is 0). Overflow shrinks detective
/// first, then doctor, then mafia down to its floor of 1. The layout is
/// then shuffled uniformly.
fn assign_roles(config: &GameConfig, rng: &mut SimRng) -> Vec<Role> {
    let n = config.num_players;

    let mut mafia = ((n as f32 * config.mafia_ratio) as usize).max(1);
    let mut detectives = (n as f32 * config.detective_prob) as usize;
    let mut doctors = (n as f32 * config.doctor_prob) as usize;

    if config.detective_prob > 0.0 && detectives == 0 {
        detectives = 1;
    }
    if config.doctor_prob > 0.0 && doctors == 0 {
        doctors = 1;
    }

    let mut total = mafia + detectives + doctors;
    while total > n && (detectives > 0 || doctors > 0) {
        if detectives > 0 {
            detectives -= 1;
            total -= 1;
        }
        if total > n && doctors > 0 {
            doctors -= 1;
            total -= 1;
        }
    }
    while total > n && mafia > 1 {
        mafia -= 1;
        total -= 1;
    }

    let mut roles = Vec::with_capacity(n);
    roles.extend(std::iter::repeat(Role::Mafia).take(mafia));
    roles.extend(std::iter::repeat(Role::Detective).take(detectives));
    roles.extend(std::iter::repeat(Role::Doctor).take(doctors));
    roles.extend(std::iter::repeat(Role::Villager).take(n - roles.len()));

    roles.shuffle(rng);
    roles
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn genomes(n: usize, seed: u64) -> Vec<Genome> {
        let mut rng = SimRng::seed_from_u64(seed);
        (0..n).map(|_| Genome::random(&mut rng)).collect()
    }

    fn count(roles: &[Role], role: Role) -> usize {
        roles.iter().filter(|&&r| r == role).count()
    }

    #[test]
    fn test_role_assignment_standard_roster() {
        let config = GameConfig::default();
        let mut rng = SimRng::seed_from_u64(1);
        let roles = assign_roles(&config, &mut rng);

        assert_eq!(roles.len(), 8);
        assert_eq!(count(&roles, Role::Mafia), 2);
        assert_eq!(count(&roles, Role::Detective), 1);
        assert_eq!(count(&roles, Role::Doctor), 1);
        assert_eq!(count(&roles, Role::Villager), 4);
    }

    #[test]
    fn test_role_assignment_bumps_special_roles() {
        // Probabilities too small to floor to 1, but positive.
        let config = GameConfig {
            num_players: 4,
            mafia_ratio: 0.25,
            detective_prob: 0.1,
            doctor_prob: 0.1,
            max_days: 20,
        };
        let mut rng = SimRng::seed_from_u64(2);
        let roles = assign_roles(&config, &mut rng);

        assert_eq!(count(&roles, Role::Mafia), 1);
        assert_eq!(count(&roles, Role::Detective), 1);
        assert_eq!(count(&roles, Role::Doctor), 1);
        assert_eq!(count(&roles, Role::Villager), 1);
    }

    #[test]
    fn test_role_assignment_shrinks_overflow() {
        // 2 players cannot hold mafia + detective + doctor; shrink policy
        // drops detective first, then doctor, never mafia below 1.
        let config = GameConfig {
            num_players: 2,
            mafia_ratio: 1.0,
            detective_prob: 0.9,
            doctor_prob: 0.9,
            max_days: 20,
        };
        let mut rng = SimRng::seed_from_u64(3);
        let roles = assign_roles(&config, &mut rng);

        assert_eq!(roles.len(), 2);
        assert!(count(&roles, Role::Mafia) >= 1);
        assert_eq!(
            count(&roles, Role::Mafia)
                + count(&roles, Role::Detective)
                + count(&roles, Role::Doctor)
                + count(&roles, Role::Villager),
            2
        );
    }

    #[test]
    fn test_zero_probability_means_no_special_role() {
        let config = GameConfig {
            num_players: 6,
            mafia_ratio: 0.2,
            detective_prob: 0.0,
            doctor_prob: 0.0,
            max_days: 20,
        };
        let mut rng = SimRng::seed_from_u64(4);
        let roles = assign_roles(&config, &mut rng);

        assert_eq!(count(&roles, Role::Detective), 0);
        assert_eq!(count(&roles, Role::Doctor), 0);
    }

    #[test]
    fn test_town_wins_when_lone_mafia_eliminated() {
        let config = GameConfig {
            num_players: 8,
            mafia_ratio: 0.125,
            ..GameConfig::default()
        };
        let roles = vec![
            Role::Mafia,
            Role::Detective,
            Role::Doctor,
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Villager,
        ];
        let mut game = MafiaGame::with_assigned_roles(config, &genomes(8, 5), roles, 5);
        game.day = 1;

        game.eliminate(0, false);
        game.check_game_over();

        assert!(game.game_over);
        assert_eq!(game.winner, Some(Team::Town));
    }

    #[test]
    fn test_mafia_wins_immediately_on_majority() {
        let config = GameConfig {
            num_players: 4,
            mafia_ratio: 0.5,
            ..GameConfig::default()
        };
        let roles = vec![Role::Mafia, Role::Mafia, Role::Detective, Role::Villager];
        let mut game = MafiaGame::with_assigned_roles(config, &genomes(4, 6), roles, 6);
        game.day = 1;

        // Eliminating the villager leaves 2 mafia vs 1 town.
        game.eliminate(3, false);
        game.check_game_over();

        assert!(game.game_over);
        assert_eq!(game.winner, Some(Team::Mafia));
    }

    #[test]
    fn test_mafia_wins_on_tie() {
        let config = GameConfig {
            num_players: 4,
            mafia_ratio: 0.25,
            detective_prob: 0.0,
            doctor_prob: 0.0,
            max_days: 20,
        };
        let roles = vec![Role::Mafia, Role::Villager, Role::Villager, Role::Villager];
        let mut game = MafiaGame::with_assigned_roles(config, &genomes(4, 7), roles, 7);
        game.day = 1;

        game.eliminate(1, false);
        game.check_game_over();
        assert!(!game.game_over, "3 players left, mafia not yet at parity");

        game.eliminate(2, false);
        game.check_game_over();
        assert!(game.game_over, "1 mafia vs 1 town is a mafia win");
        assert_eq!(game.winner, Some(Team::Mafia));
    }

    #[test]
    fn test_elimination_reveals_role_to_survivors() {
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
        let mut game = MafiaGame::with_assigned_roles(config, &genomes(8, 8), roles, 8);
        game.day = 1;

        game.eliminate(0, false);

        for &survivor in game.alive() {
            assert!(
                game.agents[survivor]
                    .beliefs
                    .facts()
                    .is_known(0, Role::Mafia),
                "survivor {} missed the reveal",
                survivor
            );
        }
        assert_eq!(game.death_day[0], Some(1));
    }

    #[test]
    fn test_doctor_save_blocks_kill_and_counts() {
        let config = GameConfig::default();
        let roles = vec![
            Role::Mafia,
            Role::Doctor,
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Villager,
        ];
        let mut game = MafiaGame::with_assigned_roles(config, &genomes(8, 9), roles, 9);
        game.day = 1;

        game.night_kill_target = Some(2);
        game.protected = Some(2);
        game.protector = Some(1);
        game.resolve_night();

        assert!(game.alive().contains(&2));
        assert_eq!(game.agents[1].saves, 1);
        assert!(game
            .events()
            .iter()
            .any(|e| matches!(e, MatchEvent::KillPrevented { target: 2, .. })));
    }

    #[test]
    fn test_match_runs_to_outcome() {
        let config = GameConfig::default();
        let mut game = MafiaGame::new(config.clone(), &genomes(8, 10), 10);
        let outcome = game.run();

        assert!(outcome.days >= 1);
        assert!(outcome.days <= config.max_days + 1);
        if outcome.winner.is_some() {
            let alive_mafia = game
                .alive()
                .iter()
                .filter(|&&id| game.agents()[id].role == Role::Mafia)
                .count();
            match outcome.winner {
                Some(Team::Town) => assert_eq!(alive_mafia, 0),
                Some(Team::Mafia) => {
                    assert!(alive_mafia >= game.alive().len() - alive_mafia)
                }
                None => unreachable!(),
            }
        }
    }

    #[test]
    fn test_fitness_rewards_winning_team() {
        let config = GameConfig::default();
        let mut game = MafiaGame::new(config, &genomes(8, 11), 11);
        game.run();
        let fitness = game.player_fitness();

        assert_eq!(fitness.len(), 8);
        if let Some(winner) = game.outcome().winner {
            for agent in game.agents() {
                if agent.role.team() == winner {
                    assert!(
                        fitness[agent.id] >= 100.0,
                        "winning-team agent {} scored {}",
                        agent.id,
                        fitness[agent.id]
                    );
                }
            }
        }
    }
}
