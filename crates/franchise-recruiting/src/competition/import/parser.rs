use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::competition::domain::{CandidateId, CandidateStatus, League, ProfileId, TeamId};

use super::LedgerImportError;

/// One validated ledger row from a snapshot export.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LedgerRecord {
    pub(crate) line: u64,
    pub(crate) profile_id: Option<ProfileId>,
    pub(crate) candidate_id: CandidateId,
    pub(crate) candidate_name: String,
    pub(crate) league: League,
    pub(crate) status: CandidateStatus,
    pub(crate) team_id: TeamId,
    pub(crate) team_abbreviation: String,
    pub(crate) total_points: f64,
    pub(crate) current_cycle_points: f64,
    pub(crate) removed_from_board: bool,
    pub(crate) scholarship_offered: bool,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<LedgerRecord>, LedgerImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<LedgerRow>().enumerate() {
        let row = record?;
        // header occupies line 1
        let line = index as u64 + 2;
        records.push(row.validate(line)?);
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(rename = "ProfileID", default)]
    profile_id: Option<u64>,
    #[serde(rename = "CandidateID")]
    candidate_id: u32,
    #[serde(rename = "CandidateName")]
    candidate_name: String,
    #[serde(rename = "League")]
    league: String,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(rename = "TeamID")]
    team_id: u32,
    #[serde(rename = "TeamAbbr")]
    team_abbreviation: String,
    #[serde(rename = "TotalPoints")]
    total_points: f64,
    #[serde(rename = "CurrentWeeksPoints")]
    current_weeks_points: f64,
    #[serde(rename = "RemovedFromBoard", default, deserialize_with = "flag")]
    removed_from_board: bool,
    #[serde(rename = "Scholarship", default, deserialize_with = "flag")]
    scholarship: bool,
}

impl LedgerRow {
    fn validate(self, line: u64) -> Result<LedgerRecord, LedgerImportError> {
        let invalid = |reason: String| LedgerImportError::InvalidRow { line, reason };

        let league = League::from_code(&self.league)
            .ok_or_else(|| invalid(format!("unknown league code '{}'", self.league)))?;
        let status = match self.status.as_deref() {
            None => CandidateStatus::Uncommitted,
            Some(value) => parse_status(value)
                .ok_or_else(|| invalid(format!("unknown candidate status '{value}'")))?,
        };
        if !self.total_points.is_finite() || self.total_points < 0.0 {
            return Err(invalid(format!(
                "total points must be a non-negative number (found {})",
                self.total_points
            )));
        }
        if !self.current_weeks_points.is_finite() || self.current_weeks_points < 0.0 {
            return Err(invalid(format!(
                "current week points must be a non-negative number (found {})",
                self.current_weeks_points
            )));
        }
        if self.current_weeks_points > self.total_points {
            return Err(invalid(format!(
                "current week points {} exceed total points {}",
                self.current_weeks_points, self.total_points
            )));
        }

        Ok(LedgerRecord {
            line,
            profile_id: self.profile_id.map(ProfileId),
            candidate_id: CandidateId(self.candidate_id),
            candidate_name: self.candidate_name,
            league,
            status,
            team_id: TeamId(self.team_id),
            team_abbreviation: self.team_abbreviation,
            total_points: self.total_points,
            current_cycle_points: self.current_weeks_points,
            removed_from_board: self.removed_from_board,
            scholarship_offered: self.scholarship,
        })
    }
}

fn parse_status(value: &str) -> Option<CandidateStatus> {
    match value.trim().to_ascii_lowercase().as_str() {
        "uncommitted" | "open" => Some(CandidateStatus::Uncommitted),
        "signed" | "committed" => Some(CandidateStatus::Signed),
        "withdrawn" => Some(CandidateStatus::Withdrawn),
        _ => None,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") | Some("n") => Ok(false),
        Some("true") | Some("1") | Some("yes") | Some("y") => Ok(true),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a boolean flag, found '{other}'"
        ))),
    }
}
