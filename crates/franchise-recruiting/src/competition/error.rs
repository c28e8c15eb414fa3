use serde::Serialize;

use super::domain::{CandidateId, CandidateStatus, League, ProfileId, TeamId};

/// Errors raised while applying a mutation to the competition engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompetitionError {
    #[error("recruiting cycle is locked while the weekly resolution runs")]
    CycleLocked,
    #[error("team {session} may not modify records owned by team {owner}")]
    PermissionDenied { session: TeamId, owner: TeamId },
    #[error("board for team {team} is full ({capacity} candidates)")]
    CapacityExceeded { team: TeamId, capacity: usize },
    #[error("candidate {candidate} is already on the board of team {team}")]
    AlreadyOnBoard { team: TeamId, candidate: CandidateId },
    #[error("invalid promise: {}", .0.join("; "))]
    InvalidPromiseConfiguration(Vec<String>),
    #[error("invalid AI settings: {}", .0.join("; "))]
    InvalidAiSettings(Vec<String>),
    #[error("candidate {0} is not registered")]
    UnknownCandidate(CandidateId),
    #[error("team {0} is not registered")]
    UnknownTeam(TeamId),
    #[error("ledger entry {0} does not exist")]
    UnknownProfile(ProfileId),
    #[error("candidate {candidate} is {} and no longer on the market", .status.label())]
    CandidateUnavailable {
        candidate: CandidateId,
        status: CandidateStatus,
    },
    #[error("candidate {candidate} is not on the board of team {team}")]
    NotOnBoard { team: TeamId, candidate: CandidateId },
    #[error("scholarship offer to candidate {candidate} was revoked by team {team}")]
    OfferRevoked { team: TeamId, candidate: CandidateId },
    #[error("team {0} has no scholarships left to offer")]
    NoScholarshipsAvailable(TeamId),
    #[error("{} does not use scholarship offers", .0.label())]
    ScholarshipsNotOffered(League),
    #[error("field '{0}' cannot be updated")]
    UnsupportedField(String),
}

impl CompetitionError {
    /// Human-readable messages for local validation failures.
    pub fn messages(&self) -> Vec<String> {
        match self {
            CompetitionError::InvalidPromiseConfiguration(messages)
            | CompetitionError::InvalidAiSettings(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Non-blocking condition surfaced alongside an accepted mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    WeeklyBudgetExceeded { spent: f64, budget: f64 },
}

impl ValidationWarning {
    pub fn message(&self) -> String {
        match self {
            ValidationWarning::WeeklyBudgetExceeded { spent, budget } => format!(
                "weekly allocation {:.1} exceeds the {:.1} point budget",
                spent, budget
            ),
        }
    }
}
