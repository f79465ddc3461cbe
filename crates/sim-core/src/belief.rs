//! Belief System
//!
//! Each agent privately tracks, for every player, the probability of
//! holding each role, a trust scalar, and a table of hard facts learned
//! from authoritative reveals. Noisy social signals (votes, statements)
//! nudge probabilities and trust; reveals and investigations set
//! certainties outright.
//!
//! Belief shifts are clamped to [0.05, 0.95] before renormalization so
//! nothing short of an authoritative reveal can reach exact certainty.

use std::collections::HashMap;

use serde::Serialize;
use sim_events::{AgentId, Role, StatementKind};

/// Lower clamp for non-authoritative belief shifts.
pub const BELIEF_FLOOR: f32 = 0.05;
/// Upper clamp for non-authoritative belief shifts.
pub const BELIEF_CEIL: f32 = 0.95;

/// Magnitude of a single vote- or retaliation-driven belief shift.
const BELIEF_SHIFT: f32 = 0.1;
/// Scale applied to speaker trust when weighing an unverifiable statement.
const UNVERIFIED_STATEMENT_WEIGHT: f32 = 0.05;

/// Hard role knowledge, indexed by role and polarity.
///
/// Membership in a "not" set pins the matching probability at zero; the
/// two polarities never disagree because only reveals write here.
#[derive(Debug, Clone, Default)]
pub struct FactTable {
    is: [std::collections::HashSet<AgentId>; 4],
    is_not: [std::collections::HashSet<AgentId>; 4],
}

impl FactTable {
    pub fn mark_is(&mut self, agent: AgentId, role: Role) {
        self.is[role.index()].insert(agent);
    }

    pub fn mark_is_not(&mut self, agent: AgentId, role: Role) {
        self.is_not[role.index()].insert(agent);
    }

    pub fn is_known(&self, agent: AgentId, role: Role) -> bool {
        self.is[role.index()].contains(&agent)
    }

    pub fn is_known_not(&self, agent: AgentId, role: Role) -> bool {
        self.is_not[role.index()].contains(&agent)
    }

    /// All agents known to hold `role`.
    pub fn known(&self, role: Role) -> &std::collections::HashSet<AgentId> {
        &self.is[role.index()]
    }
}

/// An authoritative observation recorded by the owning agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Observation {
    Investigation { target: AgentId, is_mafia: bool },
    Death {
        agent: AgentId,
        at_night: bool,
        role: Role,
    },
}

/// One statement as remembered by an observer (and by its speaker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatementRecord {
    pub day: u32,
    pub kind: StatementKind,
    pub subject: Option<AgentId>,
}

/// One observed vote. `target` is `None` for an abstention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteRecord {
    pub day: u32,
    pub voter: AgentId,
    pub target: Option<AgentId>,
}

/// An agent's private probabilistic model of the table.
#[derive(Debug, Clone)]
pub struct BeliefState {
    owner: AgentId,
    num_players: usize,
    /// Per-role probability vectors, indexed by `Role::index()`
    role_beliefs: [Vec<f32>; 4],
    facts: FactTable,
    trust: Vec<f32>,
    observations: Vec<Observation>,
    statements: HashMap<AgentId, Vec<StatementRecord>>,
    votes: Vec<VoteRecord>,
}

impl BeliefState {
    /// Fresh, maximally uncertain beliefs. The owner's own entries start
    /// zeroed and become certain once its role is revealed to it.
    pub fn new(owner: AgentId, num_players: usize) -> Self {
        let uniform = 1.0 / num_players as f32;
        let mut role_beliefs: [Vec<f32>; 4] =
            std::array::from_fn(|_| vec![uniform; num_players]);
        for beliefs in &mut role_beliefs {
            beliefs[owner] = 0.0;
        }

        let mut trust = vec![0.5; num_players];
        trust[owner] = 1.0;

        Self {
            owner,
            num_players,
            role_beliefs,
            facts: FactTable::default(),
            trust,
            observations: Vec::new(),
            statements: HashMap::new(),
            votes: Vec::new(),
        }
    }

    /// Absorbs a definitive role reveal for `agent`.
    ///
    /// Sets certainty across all four role dimensions and records the
    /// symmetric facts (a revealed mafia is known not-detective,
    /// not-doctor, not-villager, and vice versa). Idempotent.
    pub fn record_role_reveal(&mut self, agent: AgentId, role: Role) {
        if agent == self.owner {
            for r in Role::ALL {
                self.role_beliefs[r.index()][agent] = if r == role { 1.0 } else { 0.0 };
            }
            self.facts.mark_is(agent, role);
            return;
        }

        for r in Role::ALL {
            if r == role {
                self.role_beliefs[r.index()][agent] = 1.0;
                self.facts.mark_is(agent, r);
            } else {
                self.role_beliefs[r.index()][agent] = 0.0;
                self.facts.mark_is_not(agent, r);
            }
        }
        self.normalize_agent(agent);
    }

    /// Absorbs an observed vote and adjusts suspicion of the voter when
    /// the target's alignment is already known.
    pub fn record_vote(&mut self, voter: AgentId, target: Option<AgentId>, day: u32) {
        self.votes.push(VoteRecord { day, voter, target });

        let Some(target) = target else { return };
        if voter == self.owner || self.facts.is_known(voter, Role::Mafia) {
            return;
        }

        if self.facts.is_known(target, Role::Mafia) {
            // Voting against a known mafia reads as town-aligned.
            self.adjust_trust(voter, 0.1);
            self.shift_mafia_belief(voter, false);
        } else if self.facts.is_known_not(target, Role::Mafia) {
            // Voting against a known innocent reads as hostile.
            self.adjust_trust(voter, -0.1);
            self.shift_mafia_belief(voter, true);
        }
    }

    /// Absorbs an observed day statement.
    ///
    /// Statements validated or contradicted by hard facts move trust and
    /// suspicion of the speaker; unverifiable claims nudge the subject's
    /// mafia probability by a trust-weighted amount.
    pub fn record_statement(
        &mut self,
        speaker: AgentId,
        kind: StatementKind,
        subject: Option<AgentId>,
        day: u32,
    ) {
        self.statements
            .entry(speaker)
            .or_default()
            .push(StatementRecord { day, kind, subject });

        if speaker == self.owner {
            return;
        }

        match (kind, subject) {
            (StatementKind::Accuse, Some(subject)) => {
                if self.facts.is_known(subject, Role::Mafia) {
                    self.adjust_trust(speaker, 0.15);
                    self.shift_mafia_belief(speaker, false);
                } else if self.facts.is_known_not(subject, Role::Mafia) {
                    self.adjust_trust(speaker, -0.1);
                    self.shift_mafia_belief(speaker, true);
                } else {
                    let weight = self.trust[speaker] * UNVERIFIED_STATEMENT_WEIGHT;
                    let current = self.role_beliefs[Role::Mafia.index()][subject];
                    self.role_beliefs[Role::Mafia.index()][subject] =
                        (current + weight).min(BELIEF_CEIL);
                    self.normalize_agent(subject);
                }
            }
            (StatementKind::Defend, Some(subject)) => {
                if self.facts.is_known_not(subject, Role::Mafia) {
                    self.adjust_trust(speaker, 0.1);
                    self.shift_mafia_belief(speaker, false);
                } else if self.facts.is_known(subject, Role::Mafia) {
                    // Defending a known mafia marks the speaker as suspect.
                    self.adjust_trust(speaker, -0.15);
                    self.shift_mafia_belief(speaker, true);
                } else {
                    let weight = self.trust[speaker] * UNVERIFIED_STATEMENT_WEIGHT;
                    let current = self.role_beliefs[Role::Mafia.index()][subject];
                    self.role_beliefs[Role::Mafia.index()][subject] =
                        (current - weight).max(BELIEF_FLOOR);
                    self.normalize_agent(subject);
                }
            }
            _ => {}
        }
    }

    /// Absorbs an investigation result. A mafia hit is a full reveal;
    /// a clear zeroes mafia probability without pinning the exact role.
    pub fn record_investigation(&mut self, target: AgentId, is_mafia: bool) {
        if is_mafia {
            self.record_role_reveal(target, Role::Mafia);
        } else {
            self.role_beliefs[Role::Mafia.index()][target] = 0.0;
            self.facts.mark_is_not(target, Role::Mafia);
        }
        self.observations
            .push(Observation::Investigation { target, is_mafia });
    }

    /// Absorbs a death, revealing the victim's role. An unexplained night
    /// kill of a town member raises suspicion on everyone the victim had
    /// accused, since mafia tend to retaliate against accusers.
    pub fn record_death(&mut self, agent: AgentId, at_night: bool, role: Role) {
        self.record_role_reveal(agent, role);
        self.observations.push(Observation::Death {
            agent,
            at_night,
            role,
        });

        if at_night && role != Role::Mafia {
            let accused: Vec<AgentId> = self
                .statements
                .get(&agent)
                .map(|records| {
                    records
                        .iter()
                        .filter(|r| r.kind == StatementKind::Accuse)
                        .filter_map(|r| r.subject)
                        .collect()
                })
                .unwrap_or_default();

            for suspect in accused {
                if !self.facts.is_known_not(suspect, Role::Mafia) {
                    self.shift_mafia_belief(suspect, true);
                }
            }
        }
    }

    /// Alive agents ranked by descending mafia probability, owner excluded.
    pub fn ranked_mafia(&self, alive: &[AgentId]) -> Vec<(AgentId, f32)> {
        self.ranked_by(&self.role_beliefs[Role::Mafia.index()], alive)
    }

    /// Alive agents ranked by descending detective probability, owner excluded.
    pub fn ranked_detective(&self, alive: &[AgentId]) -> Vec<(AgentId, f32)> {
        self.ranked_by(&self.role_beliefs[Role::Detective.index()], alive)
    }

    /// Alive agents ranked by descending doctor probability, owner excluded.
    pub fn ranked_doctor(&self, alive: &[AgentId]) -> Vec<(AgentId, f32)> {
        self.ranked_by(&self.role_beliefs[Role::Doctor.index()], alive)
    }

    /// Alive agents ranked by descending trust, owner excluded.
    pub fn ranked_trust(&self, alive: &[AgentId]) -> Vec<(AgentId, f32)> {
        self.ranked_by(&self.trust, alive)
    }

    /// Current probability that `agent` holds `role`, as this owner sees it.
    pub fn role_belief(&self, role: Role, agent: AgentId) -> f32 {
        self.role_beliefs[role.index()][agent]
    }

    /// Current trust in `agent`.
    pub fn trust(&self, agent: AgentId) -> f32 {
        self.trust[agent]
    }

    /// The hard-fact table.
    pub fn facts(&self) -> &FactTable {
        &self.facts
    }

    /// Everything the owner remembers `speaker` saying.
    pub fn statements_by(&self, speaker: AgentId) -> &[StatementRecord] {
        self.statements
            .get(&speaker)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Speakers with at least one remembered statement, ascending id.
    pub fn speakers(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.statements.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Full observation log, in arrival order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of investigation results absorbed (detective fitness signal).
    pub fn investigation_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|o| matches!(o, Observation::Investigation { .. }))
            .count()
    }

    /// Observed votes, in arrival order.
    pub fn vote_history(&self) -> &[VoteRecord] {
        &self.votes
    }

    fn adjust_trust(&mut self, agent: AgentId, delta: f32) {
        self.trust[agent] = (self.trust[agent] + delta).clamp(0.0, 1.0);
    }

    /// Nudges the mafia probability of `agent` by the standard shift,
    /// clamped away from certainty, then renormalizes.
    fn shift_mafia_belief(&mut self, agent: AgentId, increase: bool) {
        let current = self.role_beliefs[Role::Mafia.index()][agent];
        let shifted = if increase {
            (current + BELIEF_SHIFT).min(BELIEF_CEIL)
        } else {
            (current - BELIEF_SHIFT).max(BELIEF_FLOOR)
        };
        self.role_beliefs[Role::Mafia.index()][agent] = shifted;
        self.normalize_all();
    }

    /// Renormalizes one agent's four role probabilities to sum to 1.
    /// A zero sum is left untouched rather than divided.
    fn normalize_agent(&mut self, agent: AgentId) {
        let total: f32 = Role::ALL
            .iter()
            .map(|r| self.role_beliefs[r.index()][agent])
            .sum();
        if total > 0.0 {
            for r in Role::ALL {
                self.role_beliefs[r.index()][agent] /= total;
            }
        }
    }

    fn normalize_all(&mut self) {
        for agent in 0..self.num_players {
            self.normalize_agent(agent);
        }
    }

    fn ranked_by(&self, values: &[f32], alive: &[AgentId]) -> Vec<(AgentId, f32)> {
        let mut ranked: Vec<(AgentId, f32)> = alive
            .iter()
            .copied()
            .filter(|&id| id != self.owner)
            .map(|id| (id, values[id]))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}
