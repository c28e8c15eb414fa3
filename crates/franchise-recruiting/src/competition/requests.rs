//! Request payloads exchanged with the UI and forwarded to the remote store.
//!
//! Field names keep the casing the remote store expects (`CandidateID`, `ProfileID`, ...).

use serde::{Deserialize, Serialize};

use super::domain::{Candidate, CandidateId, ProfileId, PromiseType, ScoutAttribute, TeamId};
use super::gate::CycleState;

/// The only ledger field the points endpoint may write.
pub const CURRENT_WEEKS_POINTS_FIELD: &str = "CurrentWeeksPoints";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddToBoardRequest {
    #[serde(rename = "CandidateID")]
    pub candidate_id: CandidateId,
    /// Team adding the candidate.
    #[serde(rename = "ProfileID")]
    pub profile_id: TeamId,
    #[serde(rename = "CandidateSnapshot", default)]
    pub candidate_snapshot: Option<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveFromBoardRequest {
    #[serde(rename = "CandidateID")]
    pub candidate_id: CandidateId,
    #[serde(rename = "ProfileID")]
    pub profile_id: TeamId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePointsRequest {
    /// Ledger row being updated.
    #[serde(rename = "ProfileID")]
    pub profile_id: ProfileId,
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScholarshipAttribute {
    /// Offer when none is outstanding, otherwise rescind the offer.
    Scholarship,
    /// Flip the revoked flag that blocks further point allocation.
    ScholarshipRevoked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipRequest {
    #[serde(rename = "CandidateID")]
    pub candidate_id: CandidateId,
    #[serde(rename = "ProfileID")]
    pub profile_id: TeamId,
    #[serde(rename = "Attribute")]
    pub attribute: ScholarshipAttribute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutRequest {
    #[serde(rename = "CandidateID")]
    pub candidate_id: CandidateId,
    #[serde(rename = "ProfileID")]
    pub profile_id: TeamId,
    #[serde(rename = "Attribute")]
    pub attribute: ScoutAttribute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromiseRequest {
    #[serde(rename = "CandidateID")]
    pub candidate_id: CandidateId,
    #[serde(rename = "PromiseType")]
    pub promise_type: PromiseType,
    #[serde(rename = "PromiseWeight")]
    pub promise_weight: u32,
    #[serde(rename = "Benchmark", default)]
    pub benchmark: Option<f64>,
    #[serde(rename = "BenchmarkStr", default)]
    pub benchmark_str: Option<String>,
    #[serde(rename = "IsActive")]
    pub is_active: bool,
    #[serde(rename = "TeamID")]
    pub team_id: TeamId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelPromiseRequest {
    #[serde(rename = "CandidateID")]
    pub candidate_id: CandidateId,
    #[serde(rename = "TeamID")]
    pub team_id: TeamId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSettingsRequest {
    #[serde(rename = "AIStarMin")]
    pub ai_star_min: u8,
    #[serde(rename = "AIStarMax")]
    pub ai_star_max: u8,
    #[serde(rename = "AIMinThreshold")]
    pub ai_min_threshold: u32,
    #[serde(rename = "AIMaxThreshold")]
    pub ai_max_threshold: u32,
    #[serde(rename = "IsAI")]
    pub is_ai: bool,
    #[serde(rename = "OffensiveScheme", default)]
    pub offensive_scheme: Option<String>,
    #[serde(rename = "DefensiveScheme", default)]
    pub defensive_scheme: Option<String>,
}

/// Published by the weekly sync job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleStateRequest {
    #[serde(rename = "State")]
    pub state: CycleState,
    #[serde(rename = "Week")]
    pub week: u32,
}

/// Accepted mutation forwarded to the remote store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Mutation {
    AddToBoard(AddToBoardRequest),
    RemoveFromBoard(RemoveFromBoardRequest),
    UpdatePoints(UpdatePointsRequest),
    ToggleScholarship(ScholarshipRequest),
    ScoutAttribute(ScoutRequest),
    SavePromise(PromiseRequest),
    CancelPromise(CancelPromiseRequest),
    SaveAiSettings {
        team_id: TeamId,
        settings: AiSettingsRequest,
    },
}

impl Mutation {
    pub const fn label(&self) -> &'static str {
        match self {
            Mutation::AddToBoard(_) => "add_to_board",
            Mutation::RemoveFromBoard(_) => "remove_from_board",
            Mutation::UpdatePoints(_) => "update_points",
            Mutation::ToggleScholarship(_) => "toggle_scholarship",
            Mutation::ScoutAttribute(_) => "scout_attribute",
            Mutation::SavePromise(_) => "save_promise",
            Mutation::CancelPromise(_) => "cancel_promise",
            Mutation::SaveAiSettings { .. } => "save_ai_settings",
        }
    }
}
