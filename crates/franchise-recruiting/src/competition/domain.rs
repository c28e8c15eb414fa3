use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for candidates (recruits, portal entries, free agents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub u32);

/// Identifier wrapper for teams competing on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u32);

/// Row identifier of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub u64);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Leagues sharing the competition engine. Only display fields differ between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum League {
    CollegeFootball,
    ProFootball,
    CollegeHockey,
    ProHockey,
    CollegeBasketball,
    ProBasketball,
}

impl League {
    pub const fn label(self) -> &'static str {
        match self {
            League::CollegeFootball => "College Football",
            League::ProFootball => "Pro Football",
            League::CollegeHockey => "College Hockey",
            League::ProHockey => "Pro Hockey",
            League::CollegeBasketball => "College Basketball",
            League::ProBasketball => "Pro Basketball",
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            League::CollegeFootball => "cfb",
            League::ProFootball => "nfl",
            League::CollegeHockey => "chl",
            League::ProHockey => "phl",
            League::CollegeBasketball => "cbb",
            League::ProBasketball => "nba",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cfb" => Some(League::CollegeFootball),
            "nfl" => Some(League::ProFootball),
            "chl" => Some(League::CollegeHockey),
            "phl" => Some(League::ProHockey),
            "cbb" => Some(League::CollegeBasketball),
            "nba" => Some(League::ProBasketball),
            _ => None,
        }
    }

    /// Football and basketball recruiting gate point allocation behind a scholarship offer.
    pub const fn uses_scholarships(self) -> bool {
        matches!(self, League::CollegeFootball | League::CollegeBasketball)
    }
}

/// Which pool the candidate entered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    Recruiting,
    TransferPortal,
    FreeAgency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateStatus {
    Uncommitted,
    Signed,
    Withdrawn,
}

impl CandidateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CandidateStatus::Uncommitted => "uncommitted",
            CandidateStatus::Signed => "signed",
            CandidateStatus::Withdrawn => "withdrawn",
        }
    }
}

/// Prospective player being competed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub league: League,
    pub market: Market,
    pub position: String,
    #[serde(default)]
    pub archetype: String,
    #[serde(default)]
    pub stars: u8,
    /// Fixed for transfers, absent for fresh recruits.
    #[serde(default)]
    pub origin_team: Option<TeamId>,
    pub status: CandidateStatus,
    /// `None` when the candidate's country has no state field.
    #[serde(default)]
    pub home_state: Option<String>,
    pub country: String,
    #[serde(default)]
    pub is_redshirting: bool,
    /// Hidden until a team scouts it.
    #[serde(default, skip_serializing)]
    pub potential_grade: Option<String>,
}

impl Candidate {
    pub fn is_available(&self) -> bool {
        self.status == CandidateStatus::Uncommitted
    }
}

/// Team display identity carried on ledger rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamIdentity {
    pub id: TeamId,
    pub abbreviation: String,
}

/// Hidden candidate fields a team may reveal by scouting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoutAttribute {
    PotentialGrade,
    Personality,
    RecruitingBias,
    WorkEthic,
}

/// One team's interest-point record for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamProfile {
    pub id: ProfileId,
    pub candidate_id: CandidateId,
    pub team: TeamIdentity,
    pub total_points: f64,
    pub current_cycle_points: f64,
    pub removed_from_board: bool,
    pub scholarship_offered: bool,
    pub scholarship_revoked: bool,
    pub scouted: BTreeSet<ScoutAttribute>,
    pub updated_at: DateTime<Utc>,
}

impl TeamProfile {
    /// Points committed before the current cycle's allocation.
    pub fn committed_points(&self) -> f64 {
        (self.total_points - self.current_cycle_points).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PromiseType {
    NoRedshirt,
    Wins,
    HomeStateGame,
    PlayingTime,
    GameplanFit,
}

impl PromiseType {
    pub const fn label(self) -> &'static str {
        match self {
            PromiseType::NoRedshirt => "No Redshirt",
            PromiseType::Wins => "Wins",
            PromiseType::HomeStateGame => "Home State Game",
            PromiseType::PlayingTime => "Playing Time",
            PromiseType::GameplanFit => "Gameplan Fit",
        }
    }
}

/// Conditional commitment a team makes to a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promise {
    pub candidate_id: CandidateId,
    pub team_id: TeamId,
    pub promise_type: PromiseType,
    /// Strength of the commitment, 0 through 100.
    pub weight: u8,
    pub benchmark: Option<f64>,
    pub benchmark_str: Option<String>,
    pub is_active: bool,
}

/// Membership of a candidate on a team's active board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEntry {
    pub team_id: TeamId,
    pub candidate_id: CandidateId,
    pub added_at: DateTime<Utc>,
}

/// Inputs consumed by the automated point-allocation process for AI-controlled teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSettings {
    pub is_ai: bool,
    pub star_min: u8,
    pub star_max: u8,
    pub min_threshold: u32,
    pub max_threshold: u32,
    pub offensive_scheme: Option<String>,
    pub defensive_scheme: Option<String>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            is_ai: false,
            star_min: 1,
            star_max: 5,
            min_threshold: 5,
            max_threshold: 20,
            offensive_scheme: None,
            defensive_scheme: None,
        }
    }
}

/// Team-level limits governing its board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitingSettings {
    pub team: TeamIdentity,
    pub weekly_points: f64,
    pub board_capacity: usize,
    pub scholarships_available: u32,
    pub ai: AiSettings,
}

impl RecruitingSettings {
    pub fn runs_scheme(&self, scheme: &str) -> bool {
        let scheme = scheme.trim();
        [&self.ai.offensive_scheme, &self.ai.defensive_scheme]
            .into_iter()
            .flatten()
            .any(|candidate| candidate.trim().eq_ignore_ascii_case(scheme))
    }
}
