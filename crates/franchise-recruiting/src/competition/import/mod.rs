//! Ledger snapshot import from the remote store's CSV export.

mod parser;

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::competition::domain::{
    Candidate, CandidateId, Market, ProfileId, TeamId, TeamIdentity, TeamProfile,
};
use crate::competition::engine::CompetitionEngine;
use crate::config::EngineConfig;

use parser::LedgerRecord;

#[derive(Debug)]
pub enum LedgerImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for LedgerImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerImportError::Io(err) => write!(f, "failed to read ledger export: {}", err),
            LedgerImportError::Csv(err) => write!(f, "invalid ledger CSV data: {}", err),
            LedgerImportError::InvalidRow { line, reason } => {
                write!(f, "ledger row on line {} rejected: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for LedgerImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerImportError::Io(err) => Some(err),
            LedgerImportError::Csv(err) => Some(err),
            LedgerImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for LedgerImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for LedgerImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Hydrates a [`CompetitionEngine`] from an exported ledger snapshot.
pub struct LedgerSnapshotImporter;

impl LedgerSnapshotImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        config: EngineConfig,
        imported_at: DateTime<Utc>,
    ) -> Result<CompetitionEngine, LedgerImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, config, imported_at)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        config: EngineConfig,
        imported_at: DateTime<Utc>,
    ) -> Result<CompetitionEngine, LedgerImportError> {
        let records = parser::parse_records(reader)?;
        let mut engine = CompetitionEngine::new(config);

        let mut seen: BTreeSet<(CandidateId, TeamId)> = BTreeSet::new();
        let mut seen_ids: BTreeSet<ProfileId> = BTreeSet::new();
        for record in &records {
            if !seen.insert((record.candidate_id, record.team_id)) {
                return Err(LedgerImportError::InvalidRow {
                    line: record.line,
                    reason: format!(
                        "duplicate row for candidate {} and team {}",
                        record.candidate_id, record.team_id
                    ),
                });
            }
            if let Some(id) = record.profile_id {
                if !seen_ids.insert(id) {
                    return Err(LedgerImportError::InvalidRow {
                        line: record.line,
                        reason: format!("duplicate profile id {}", id),
                    });
                }
            }
        }

        let mut next_id = records
            .iter()
            .filter_map(|record| record.profile_id)
            .map(|id| id.0)
            .max()
            .unwrap_or(0)
            + 1;
        let mut teams: BTreeSet<TeamId> = BTreeSet::new();

        for record in records {
            if engine.candidate(record.candidate_id).is_err() {
                engine.register_candidate(candidate_from_record(&record));
            }
            if teams.insert(record.team_id) {
                engine.register_team(TeamIdentity {
                    id: record.team_id,
                    abbreviation: record.team_abbreviation.clone(),
                });
            }

            let id = match record.profile_id {
                Some(id) => id,
                None => {
                    let id = ProfileId(next_id);
                    next_id += 1;
                    id
                }
            };
            engine.restore_profile(
                TeamProfile {
                    id,
                    candidate_id: record.candidate_id,
                    team: TeamIdentity {
                        id: record.team_id,
                        abbreviation: record.team_abbreviation,
                    },
                    total_points: record.total_points,
                    current_cycle_points: record.current_cycle_points,
                    removed_from_board: record.removed_from_board,
                    scholarship_offered: record.scholarship_offered,
                    scholarship_revoked: false,
                    scouted: BTreeSet::new(),
                    updated_at: imported_at,
                },
                imported_at,
            );
        }

        Ok(engine)
    }
}

fn candidate_from_record(record: &LedgerRecord) -> Candidate {
    Candidate {
        id: record.candidate_id,
        name: record.candidate_name.clone(),
        league: record.league,
        market: Market::Recruiting,
        position: String::new(),
        archetype: String::new(),
        stars: 0,
        origin_team: None,
        status: record.status,
        home_state: None,
        country: String::new(),
        is_redshirting: false,
        potential_grade: None,
    }
}
