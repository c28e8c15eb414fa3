//! Candidate competition engine: teams invest points in recruits, transfers, and free
//! agents, and the engine projects who is leading and how likely each team is to sign.
//!
//! The remote store stays authoritative. [`RecruitingService`] applies each write to the
//! in-memory [`CompetitionEngine`], forwards it through a [`MutationGateway`], and rolls
//! the engine back when the store refuses it.

pub mod board;
pub mod domain;
pub mod engine;
pub mod error;
pub mod gate;
pub mod gateway;
pub(crate) mod guard;
pub mod import;
pub mod ledger;
pub mod modifiers;
pub mod requests;
pub mod router;
mod scholarship;
pub mod scouting;
pub mod service;
pub mod standings;

#[cfg(test)]
mod tests;

pub use board::{BoardManager, BudgetStatus};
pub use domain::{
    AiSettings, BoardEntry, Candidate, CandidateId, CandidateStatus, League, Market, ProfileId,
    Promise, PromiseType, RecruitingSettings, ScoutAttribute, TeamId, TeamIdentity, TeamProfile,
};
pub use engine::{BoardEntryView, BoardReceipt, BoardView, CompetitionEngine, PointsReceipt};
pub use error::{CompetitionError, ValidationWarning};
pub use gate::{CycleGate, CycleState};
pub use gateway::{GatewayError, MutationGateway};
pub use import::{LedgerImportError, LedgerSnapshotImporter};
pub use ledger::{PointsLedger, DEFAULT_CYCLE_POINT_CAP};
pub use modifiers::{ModifierCalculator, ModifierComponent, ModifierTable, PromiseRule, SeasonOutlook};
pub use requests::{
    AddToBoardRequest, AiSettingsRequest, CancelPromiseRequest, CycleStateRequest, Mutation,
    PromiseRequest, RemoveFromBoardRequest, ScholarshipAttribute, ScholarshipRequest,
    ScoutRequest, UpdatePointsRequest, CURRENT_WEEKS_POINTS_FIELD,
};
pub use router::{cycle_sync_router, recruiting_router, SYNC_KEY_HEADER, TEAM_HEADER};
pub use scouting::ScoutReport;
pub use service::{RecruitingService, RecruitingServiceError};
pub use standings::{
    ScoredProfile, Standing, Standings, StandingsCache, StandingsProjector, DISPLAY_LEADER_LIMIT,
    RUNNING_THRESHOLD_RATIO,
};
