//! Agent Policy
//!
//! An agent combines its genome and belief state into concrete decisions:
//! who to vote for, what to say, and what to do at night. Every decision
//! is a pure function of (genome, beliefs, role, alive set, rng); "no
//! valid target" always comes back as `None` and is treated as an
//! abstention by the engine, never as an error.

use rand::seq::SliceRandom;
use rand::Rng;

use sim_events::{AgentId, Role, StatementKind};

use crate::belief::{BeliefState, StatementRecord};
use crate::genome::Genome;
use crate::SimRng;

/// Probability of attempting a defense when no accusation was produced.
const DEFEND_CHANCE: f32 = 0.4;
/// Mafia preference for accusing a suspected detective over a trusted agent.
const MAFIA_MISDIRECT_DETECTIVE_CHANCE: f32 = 0.7;
/// Town only defends agents whose mafia probability is below this.
const DEFEND_SUSPICION_CEILING: f32 = 0.3;

/// One player in a match: identity, role, strategy, and private beliefs.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub role: Role,
    pub alive: bool,
    pub genome: Genome,
    pub beliefs: BeliefState,
    /// Statements this agent has made, in order (mafia fitness signal)
    pub statements_made: Vec<StatementRecord>,
    /// Night kills prevented while this agent's protection was active
    pub saves: u32,
}

impl Agent {
    /// Creates an agent with its role already assigned; the agent's own
    /// beliefs immediately reflect that certainty.
    pub fn new(id: AgentId, num_players: usize, role: Role, genome: Genome) -> Self {
        let mut beliefs = BeliefState::new(id, num_players);
        beliefs.record_role_reveal(id, role);
        Self {
            id,
            role,
            alive: true,
            genome,
            beliefs,
            statements_made: Vec::new(),
            saves: 0,
        }
    }

    /// Observes another player's death.
    pub fn observe_death(&mut self, agent: AgentId, at_night: bool, role: Role) {
        self.beliefs.record_death(agent, at_night, role);
    }

    /// Observes a vote (or abstention).
    pub fn observe_vote(&mut self, voter: AgentId, target: Option<AgentId>, day: u32) {
        self.beliefs.record_vote(voter, target, day);
    }

    /// Observes a day statement made by another player.
    pub fn observe_statement(
        &mut self,
        speaker: AgentId,
        kind: StatementKind,
        subject: Option<AgentId>,
        day: u32,
    ) {
        self.beliefs.record_statement(speaker, kind, subject, day);
    }

    /// Absorbs an investigation result (detective only receives these).
    pub fn observe_investigation(&mut self, target: AgentId, is_mafia: bool) {
        self.beliefs.record_investigation(target, is_mafia);
    }

    /// Picks a day-vote target, or `None` to abstain.
    pub fn choose_vote(&self, alive: &[AgentId], rng: &mut SimRng) -> Option<AgentId> {
        if alive.len() <= 1 {
            return None;
        }

        if rng.gen::<f32>() < self.genome.vote_randomness {
            return self.random_other(alive, rng);
        }

        match self.role {
            Role::Mafia => self.mafia_vote(alive, rng),
            _ => self.town_vote(alive, rng),
        }
    }

    /// Produces this turn's statement and records it against the agent's
    /// own history. The engine broadcasts it to everyone else.
    pub fn make_statement(
        &mut self,
        alive: &[AgentId],
        day: u32,
        rng: &mut SimRng,
    ) -> StatementRecord {
        let mut kind = None;
        let mut subject = None;

        if rng.gen::<f32>() < self.genome.accusation_threshold {
            if let Some(target) = self.accusation_target(alive, rng) {
                kind = Some(StatementKind::Accuse);
                subject = Some(target);
            }
        }

        if kind.is_none() && rng.gen::<f32>() < DEFEND_CHANCE {
            if let Some(target) = self.defense_target(alive, rng) {
                kind = Some(StatementKind::Defend);
                subject = Some(target);
            }
        }

        let record = StatementRecord {
            day,
            kind: kind.unwrap_or(StatementKind::Comment),
            subject,
        };
        self.statements_made.push(record);
        record
    }

    /// Role-gated night decision: mafia pick a kill, detectives a suspect,
    /// doctors a protection target. Villagers have no night action.
    pub fn night_action(&self, alive: &[AgentId], rng: &mut SimRng) -> Option<AgentId> {
        if alive.len() <= 1 {
            return None;
        }

        match self.role {
            Role::Mafia => self.kill_target(alive, rng),
            Role::Detective => self.investigation_target(alive, rng),
            Role::Doctor => Some(self.protection_target(alive, rng)),
            Role::Villager => None,
        }
    }

    fn mafia_vote(&self, alive: &[AgentId], rng: &mut SimRng) -> Option<AgentId> {
        // Score non-mafia players by how dangerous they look: suspected
        // detectives weigh double, distrust fills in the rest.
        let mut threats: Vec<(AgentId, f32)> = Vec::new();
        for (id, prob) in self.beliefs.ranked_detective(alive) {
            if !self.beliefs.facts().is_known(id, Role::Mafia) {
                threats.push((id, 2.0 * prob));
            }
        }
        for (id, trust) in self.beliefs.ranked_trust(alive) {
            if !self.beliefs.facts().is_known(id, Role::Mafia) {
                threats.push((id, 1.0 - trust));
            }
        }
        threats.sort_by(|a, b| b.1.total_cmp(&a.1));

        if let Some(&(id, _)) = threats.first() {
            return Some(id);
        }

        let fallback: Vec<AgentId> = alive
            .iter()
            .copied()
            .filter(|&id| id != self.id && !self.beliefs.facts().is_known(id, Role::Mafia))
            .collect();
        fallback.choose(rng).copied()
    }

    fn town_vote(&self, alive: &[AgentId], rng: &mut SimRng) -> Option<AgentId> {
        if let Some(&(id, _)) = self.beliefs.ranked_mafia(alive).first() {
            return Some(id);
        }
        // No suspicion signal at all: fall back to the least trusted agent.
        if let Some(&(id, _)) = self.beliefs.ranked_trust(alive).last() {
            return Some(id);
        }
        self.random_other(alive, rng)
    }

    fn accusation_target(&self, alive: &[AgentId], rng: &mut SimRng) -> Option<AgentId> {
        match self.role {
            Role::Mafia => {
                // Misdirect: go after a likely detective, or failing that
                // a well-trusted townsperson whose fall costs the town most.
                let valid: Vec<AgentId> = alive
                    .iter()
                    .copied()
                    .filter(|&id| {
                        id != self.id && !self.beliefs.facts().is_known(id, Role::Mafia)
                    })
                    .collect();
                if valid.is_empty() {
                    return None;
                }

                let detectives = self.beliefs.ranked_detective(&valid);
                if !detectives.is_empty()
                    && rng.gen::<f32>() < MAFIA_MISDIRECT_DETECTIVE_CHANCE
                {
                    return Some(detectives[0].0);
                }
                if let Some(&(id, _)) = self.beliefs.ranked_trust(&valid).first() {
                    return Some(id);
                }
                valid.choose(rng).copied()
            }
            _ => {
                let suspects = self.beliefs.ranked_mafia(alive);
                let &(target, prob) = suspects.first()?;
                if prob > 0.5 || rng.gen::<f32>() < self.genome.false_accusation_rate {
                    Some(target)
                } else {
                    None
                }
            }
        }
    }

    fn defense_target(&self, alive: &[AgentId], rng: &mut SimRng) -> Option<AgentId> {
        match self.role {
            Role::Mafia => {
                // Cover for a known accomplice, gated by deception skill.
                let fellow: Vec<AgentId> = alive
                    .iter()
                    .copied()
                    .filter(|&id| {
                        id != self.id && self.beliefs.facts().is_known(id, Role::Mafia)
                    })
                    .collect();
                if !fellow.is_empty() && rng.gen::<f32>() < self.genome.deception_skill {
                    return fellow.choose(rng).copied();
                }
                None
            }
            _ => self
                .beliefs
                .ranked_trust(alive)
                .into_iter()
                .find(|&(id, _)| {
                    self.beliefs.role_belief(Role::Mafia, id) < DEFEND_SUSPICION_CEILING
                })
                .map(|(id, _)| id),
        }
    }

    fn kill_target(&self, alive: &[AgentId], rng: &mut SimRng) -> Option<AgentId> {
        let valid: Vec<AgentId> = alive
            .iter()
            .copied()
            .filter(|&id| id != self.id && !self.beliefs.facts().is_known(id, Role::Mafia))
            .collect();
        if valid.is_empty() {
            return None;
        }

        let detective_suspects: Vec<(AgentId, f32)> = self
            .beliefs
            .ranked_detective(&valid)
            .into_iter()
            .filter(|&(_, p)| p > 0.5)
            .collect();
        let doctor_suspects: Vec<(AgentId, f32)> = self
            .beliefs
            .ranked_doctor(&valid)
            .into_iter()
            .filter(|&(_, p)| p > 0.5)
            .collect();

        // Threat score: likely detectives x3, likely doctors x2, a flat
        // bump per accusation aimed at us, plus general distrust.
        let mut best: Option<(AgentId, f32)> = None;
        for &id in &valid {
            let mut score = 0.0;
            if let Some(&(_, p)) = detective_suspects.iter().find(|&&(d, _)| d == id) {
                score += 3.0 * p;
            }
            if let Some(&(_, p)) = doctor_suspects.iter().find(|&&(d, _)| d == id) {
                score += 2.0 * p;
            }
            for statement in self.beliefs.statements_by(id) {
                if statement.kind == StatementKind::Accuse
                    && statement.subject == Some(self.id)
                {
                    score += 2.0;
                }
            }
            score += 1.0 - self.beliefs.trust(id);

            // Strictly-greater keeps the earliest id on ties.
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((id, score)),
            }
        }

        best.map(|(id, _)| id)
            .or_else(|| valid.choose(rng).copied())
    }

    fn investigation_target(&self, alive: &[AgentId], rng: &mut SimRng) -> Option<AgentId> {
        // Skip anyone already resolved either way.
        let valid: Vec<AgentId> = alive
            .iter()
            .copied()
            .filter(|&id| {
                id != self.id
                    && !self.beliefs.facts().is_known(id, Role::Mafia)
                    && !self.beliefs.facts().is_known_not(id, Role::Mafia)
            })
            .collect();
        if valid.is_empty() {
            return None;
        }

        if self.genome.detective_strategy < 0.5 {
            if let Some(&(id, _)) = self.beliefs.ranked_mafia(&valid).first() {
                return Some(id);
            }
        }
        valid.choose(rng).copied()
    }

    fn protection_target(&self, alive: &[AgentId], rng: &mut SimRng) -> AgentId {
        let dial = self.genome.doctor_strategy;

        if dial < 0.3 {
            return self.id;
        }

        if dial < 0.7 {
            // Protect whoever the town can least afford to lose.
            let detectives = self.beliefs.ranked_detective(alive);
            if let Some(&(id, prob)) = detectives.first() {
                if prob > 0.6 {
                    return id;
                }
            }
            if let Some(&(id, _)) = self.beliefs.ranked_trust(alive).first() {
                return id;
            }
        } else if let Some(id) = self.at_risk_target(alive) {
            return id;
        }

        alive.choose(rng).copied().unwrap_or(self.id)
    }

    /// Guesses tonight's mafia target from the table talk of suspected
    /// mafia: the agent they mention most (accused or defended) is the
    /// one most likely to be involved in their plans.
    fn at_risk_target(&self, alive: &[AgentId]) -> Option<AgentId> {
        let mut mentions: Vec<AgentId> = Vec::new();
        for speaker in self.beliefs.speakers() {
            let suspected = self.beliefs.facts().is_known(speaker, Role::Mafia)
                || self.beliefs.role_belief(Role::Mafia, speaker) > 0.6;
            if !suspected {
                continue;
            }
            for statement in self.beliefs.statements_by(speaker) {
                if let Some(subject) = statement.subject {
                    if alive.contains(&subject) {
                        mentions.push(subject);
                    }
                }
            }
        }

        // Most frequent mention wins; ties go to the first seen.
        let mut best: Option<(AgentId, usize)> = None;
        let mut seen: Vec<AgentId> = Vec::new();
        for &id in &mentions {
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
            let count = mentions.iter().filter(|&&m| m == id).count();
            match best {
                Some((_, top)) if count <= top => {}
                _ => best = Some((id, count)),
            }
        }
        best.map(|(id, _)| id)
    }

    fn random_other(&self, alive: &[AgentId], rng: &mut SimRng) -> Option<AgentId> {
        let valid: Vec<AgentId> = alive
            .iter()
            .copied()
            .filter(|&id| id != self.id)
            .collect();
        valid.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn fixed_genome() -> Genome {
        let mut rng = SimRng::seed_from_u64(1);
        Genome::random(&mut rng)
    }

    #[test]
    fn test_villager_has_no_night_action() {
        let agent = Agent::new(0, 6, Role::Villager, fixed_genome());
        let mut rng = SimRng::seed_from_u64(2);
        assert_eq!(agent.night_action(&[0, 1, 2, 3], &mut rng), None);
    }

    #[test]
    fn test_lone_survivor_abstains() {
        let agent = Agent::new(0, 6, Role::Mafia, fixed_genome());
        let mut rng = SimRng::seed_from_u64(3);
        assert_eq!(agent.choose_vote(&[0], &mut rng), None);
        assert_eq!(agent.night_action(&[0], &mut rng), None);
    }

    #[test]
    fn test_vote_never_targets_self() {
        let agent = Agent::new(0, 6, Role::Villager, fixed_genome());
        let alive = vec![0, 1, 2, 3, 4, 5];
        let mut rng = SimRng::seed_from_u64(4);
        for _ in 0..50 {
            if let Some(target) = agent.choose_vote(&alive, &mut rng) {
                assert_ne!(target, 0);
            }
        }
    }

    #[test]
    fn test_mafia_never_kills_known_accomplice() {
        let mut agent = Agent::new(0, 6, Role::Mafia, fixed_genome());
        agent.beliefs.record_role_reveal(1, Role::Mafia);
        let alive = vec![0, 1, 2, 3, 4, 5];
        let mut rng = SimRng::seed_from_u64(5);
        for _ in 0..50 {
            let target = agent.night_action(&alive, &mut rng);
            assert!(target.is_some());
            assert_ne!(target, Some(0));
            assert_ne!(target, Some(1));
        }
    }

    #[test]
    fn test_mafia_prioritizes_accusers_at_night() {
        let mut agent = Agent::new(0, 6, Role::Mafia, fixed_genome());
        // Agent 4 accused us twice; nobody else stands out.
        agent.beliefs.record_statement(4, StatementKind::Accuse, Some(0), 1);
        agent.beliefs.record_statement(4, StatementKind::Accuse, Some(0), 2);
        let alive = vec![0, 1, 2, 3, 4, 5];
        let mut rng = SimRng::seed_from_u64(6);
        assert_eq!(agent.night_action(&alive, &mut rng), Some(4));
    }

    #[test]
    fn test_detective_skips_resolved_players() {
        let mut genome = fixed_genome();
        genome.detective_strategy = 0.9; // random-investigation strategy
        let mut agent = Agent::new(0, 4, Role::Detective, genome);
        agent.beliefs.record_investigation(1, true);
        agent.beliefs.record_investigation(2, false);
        let alive = vec![0, 1, 2, 3];
        let mut rng = SimRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(agent.night_action(&alive, &mut rng), Some(3));
        }
    }

    #[test]
    fn test_detective_abstains_when_everyone_resolved() {
        let mut agent = Agent::new(0, 3, Role::Detective, fixed_genome());
        agent.beliefs.record_investigation(1, true);
        agent.beliefs.record_investigation(2, false);
        let mut rng = SimRng::seed_from_u64(8);
        assert_eq!(agent.night_action(&[0, 1, 2], &mut rng), None);
    }

    #[test]
    fn test_doctor_self_protect_dial() {
        let mut genome = fixed_genome();
        genome.doctor_strategy = 0.1;
        let agent = Agent::new(2, 6, Role::Doctor, genome);
        let mut rng = SimRng::seed_from_u64(9);
        assert_eq!(agent.night_action(&[0, 1, 2, 3], &mut rng), Some(2));
    }

    #[test]
    fn test_doctor_risk_inference_follows_mafia_chatter() {
        let mut genome = fixed_genome();
        genome.doctor_strategy = 0.9;
        let mut agent = Agent::new(0, 6, Role::Doctor, genome);
        // Agent 3 is known mafia and keeps talking about agent 5.
        agent.beliefs.record_death(3, false, Role::Mafia);
        agent.beliefs.record_statement(3, StatementKind::Accuse, Some(5), 1);
        agent.beliefs.record_statement(3, StatementKind::Accuse, Some(5), 2);
        agent.beliefs.record_statement(3, StatementKind::Defend, Some(4), 2);
        let alive = vec![0, 1, 2, 4, 5];
        let mut rng = SimRng::seed_from_u64(10);
        assert_eq!(agent.night_action(&alive, &mut rng), Some(5));
    }

    #[test]
    fn test_statement_recorded_against_speaker() {
        let mut agent = Agent::new(0, 6, Role::Villager, fixed_genome());
        let mut rng = SimRng::seed_from_u64(11);
        let alive = vec![0, 1, 2, 3, 4, 5];

        let statement = agent.make_statement(&alive, 1, &mut rng);
        assert_eq!(agent.statements_made.len(), 1);
        assert_eq!(agent.statements_made[0], statement);
    }

    #[test]
    fn test_town_votes_top_suspect() {
        let mut agent = Agent::new(0, 6, Role::Villager, fixed_genome());
        agent.genome.vote_randomness = 0.0;
        agent.beliefs.record_investigation(3, true);
        let alive = vec![0, 1, 2, 3, 4, 5];
        let mut rng = SimRng::seed_from_u64(12);
        assert_eq!(agent.choose_vote(&alive, &mut rng), Some(3));
    }
}
