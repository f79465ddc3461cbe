//! Event Types
//!
//! Structured match events. Each event renders to a human-readable log
//! line via `Display`; the JSONL match log serializes the same values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable integer identifier for an agent within one match.
///
/// Slot indices are assigned at match start and double as the index into
/// the engine's agent roster and the optimizer's per-group fitness table.
pub type AgentId = usize;

/// The four roles a player can hold for the duration of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Mafia,
    Detective,
    Doctor,
    Villager,
}

impl Role {
    /// All role variants in canonical order. Belief tables index by this order.
    pub const ALL: [Role; 4] = [Role::Mafia, Role::Detective, Role::Doctor, Role::Villager];

    /// Canonical index of this role, matching the order of [`Role::ALL`].
    pub fn index(self) -> usize {
        match self {
            Role::Mafia => 0,
            Role::Detective => 1,
            Role::Doctor => 2,
            Role::Villager => 3,
        }
    }

    /// The team this role belongs to.
    pub fn team(self) -> Team {
        match self {
            Role::Mafia => Team::Mafia,
            _ => Team::Town,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Mafia => "MAFIA",
            Role::Detective => "DETECTIVE",
            Role::Doctor => "DOCTOR",
            Role::Villager => "VILLAGER",
        };
        write!(f, "{}", name)
    }
}

/// The two competing sides. Every non-mafia role counts as town.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Mafia,
    Town,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Mafia => write!(f, "MAFIA"),
            Team::Town => write!(f, "TOWN"),
        }
    }
}

/// Categorical statement types exchanged during day discussion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Accuse the subject of being mafia
    Accuse,
    /// Defend the subject against accusations
    Defend,
    /// Subjectless filler talk
    Comment,
}

/// A single structured match event, appended in order by the game engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    /// Role counts fixed at match start
    RolesAssigned {
        mafia: usize,
        detectives: usize,
        doctors: usize,
        villagers: usize,
    },
    /// A new day's discussion is beginning
    DayBegan { day: u32 },
    /// Night phases are beginning
    NightBegan { day: u32 },
    /// A statement made during day discussion
    Statement {
        day: u32,
        speaker: AgentId,
        role: Role,
        kind: StatementKind,
        subject: Option<AgentId>,
    },
    /// A day vote (target `None` means abstain)
    Vote {
        day: u32,
        voter: AgentId,
        target: Option<AgentId>,
    },
    /// An agent left the game
    Eliminated {
        day: u32,
        agent: AgentId,
        role: Role,
        at_night: bool,
    },
    /// The day vote produced no elimination
    NoElimination { day: u32 },
    /// The mafia's arbitrated kill choice for the night
    MafiaTarget { day: u32, target: AgentId },
    /// A detective's investigation result
    Investigation {
        day: u32,
        detective: AgentId,
        target: AgentId,
        is_mafia: bool,
    },
    /// A doctor's protection choice for the night
    Protection {
        day: u32,
        doctor: AgentId,
        target: AgentId,
    },
    /// The mafia kill was blocked by protection
    KillPrevented { day: u32, target: AgentId },
    /// A win condition fired and the match is over
    GameOver { day: u32, winner: Team },
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchEvent::RolesAssigned {
                mafia,
                detectives,
                doctors,
                villagers,
            } => write!(
                f,
                "Roles assigned: {} Mafia, {} Detective, {} Doctor, {} Villagers",
                mafia, detectives, doctors, villagers
            ),
            MatchEvent::DayBegan { day } => write!(f, "-- Day {} --", day),
            MatchEvent::NightBegan { day } => write!(f, "-- Night {} --", day),
            MatchEvent::Statement {
                speaker,
                role,
                kind,
                subject,
                ..
            } => {
                write!(f, "Player {} ({}): ", speaker, role)?;
                match (kind, subject) {
                    (StatementKind::Accuse, Some(s)) => {
                        write!(f, "I suspect Player {} of being mafia.", s)
                    }
                    (StatementKind::Defend, Some(s)) => {
                        write!(f, "I believe Player {} is innocent.", s)
                    }
                    _ => write!(f, "I'm observing everyone's behavior closely."),
                }
            }
            MatchEvent::Vote { voter, target, .. } => match target {
                Some(t) => write!(f, "Player {} votes for Player {}", voter, t),
                None => write!(f, "Player {} abstains from voting", voter),
            },
            MatchEvent::Eliminated {
                agent,
                role,
                at_night,
                ..
            } => {
                if *at_night {
                    write!(f, "Player {} ({}) was eliminated during the night", agent, role)
                } else {
                    write!(f, "Player {} ({}) was eliminated by town vote", agent, role)
                }
            }
            MatchEvent::NoElimination { .. } => write!(f, "No one was eliminated in the vote"),
            MatchEvent::MafiaTarget { target, .. } => {
                write!(f, "Mafia chose to target Player {} for elimination", target)
            }
            MatchEvent::Investigation {
                detective,
                target,
                is_mafia,
                ..
            } => write!(
                f,
                "Detective {} investigated Player {} and found they are {}",
                detective,
                target,
                if *is_mafia { "mafia" } else { "not mafia" }
            ),
            MatchEvent::Protection { doctor, target, .. } => {
                write!(f, "Doctor {} chose to protect Player {}", doctor, target)
            }
            MatchEvent::KillPrevented { target, .. } => write!(
                f,
                "The doctor's protection saved Player {} from elimination",
                target
            ),
            MatchEvent::GameOver { winner, .. } => match winner {
                Team::Town => write!(f, "Game over - Town wins! All mafia eliminated."),
                Team::Mafia => {
                    write!(f, "Game over - Mafia wins! They equal or outnumber the town.")
                }
            },
        }
    }
}
