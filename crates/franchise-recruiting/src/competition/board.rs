use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{BoardEntry, Candidate, CandidateId, RecruitingSettings, TeamId, TeamProfile};
use super::error::{CompetitionError, ValidationWarning};
use super::gate::CycleGate;
use super::ledger::{ensure_owner, PointsLedger};

/// Weekly spend for one team compared with its budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub team_id: TeamId,
    pub spent: f64,
    pub weekly_points: f64,
}

impl BudgetStatus {
    pub fn is_over_budget(&self) -> bool {
        self.spent > self.weekly_points
    }

    pub fn remaining(&self) -> f64 {
        self.weekly_points - self.spent
    }

    pub fn warning(&self) -> Option<ValidationWarning> {
        self.is_over_budget()
            .then(|| ValidationWarning::WeeklyBudgetExceeded {
                spent: self.spent,
                budget: self.weekly_points,
            })
    }
}

/// Which candidates each team actively tracks.
#[derive(Debug, Clone, Default)]
pub struct BoardManager {
    boards: BTreeMap<TeamId, BTreeMap<CandidateId, BoardEntry>>,
}

impl BoardManager {
    pub fn contains(&self, team: TeamId, candidate: CandidateId) -> bool {
        self.boards
            .get(&team)
            .map(|board| board.contains_key(&candidate))
            .unwrap_or(false)
    }

    pub fn entries(&self, team: TeamId) -> impl Iterator<Item = &BoardEntry> + '_ {
        self.boards.get(&team).into_iter().flat_map(|board| board.values())
    }

    pub fn board_len(&self, team: TeamId) -> usize {
        self.boards.get(&team).map(BTreeMap::len).unwrap_or(0)
    }

    /// Put a candidate on the team's board and make sure a ledger row exists for it.
    pub fn add_to_board(
        &mut self,
        gate: &CycleGate,
        ledger: &mut PointsLedger,
        session: TeamId,
        settings: &RecruitingSettings,
        candidate: &Candidate,
        now: DateTime<Utc>,
    ) -> Result<(BoardEntry, TeamProfile), CompetitionError> {
        gate.ensure_open()?;
        let team = settings.team.id;
        ensure_owner(session, team)?;

        if !candidate.is_available() {
            return Err(CompetitionError::CandidateUnavailable {
                candidate: candidate.id,
                status: candidate.status,
            });
        }
        if self.contains(team, candidate.id) {
            return Err(CompetitionError::AlreadyOnBoard {
                team,
                candidate: candidate.id,
            });
        }
        if self.board_len(team) >= settings.board_capacity {
            return Err(CompetitionError::CapacityExceeded {
                team,
                capacity: settings.board_capacity,
            });
        }

        let entry = BoardEntry {
            team_id: team,
            candidate_id: candidate.id,
            added_at: now,
        };
        self.boards
            .entry(team)
            .or_default()
            .insert(candidate.id, entry.clone());
        let profile = ledger.open_profile(candidate.id, &settings.team, now).clone();

        Ok((entry, profile))
    }

    /// Take a candidate off the board and mark its ledger row removed.
    /// Returns `false` when neither was present.
    pub fn remove_from_board(
        &mut self,
        gate: &CycleGate,
        ledger: &mut PointsLedger,
        session: TeamId,
        team: TeamId,
        candidate: CandidateId,
        now: DateTime<Utc>,
    ) -> Result<bool, CompetitionError> {
        gate.ensure_open()?;
        ensure_owner(session, team)?;

        let dropped = self
            .boards
            .get_mut(&team)
            .and_then(|board| board.remove(&candidate))
            .is_some();
        let marked = ledger.remove_profile(candidate, team, now);
        Ok(dropped || marked)
    }

    /// Sum of this cycle's allocations across the team's board.
    pub fn budget_status(&self, ledger: &PointsLedger, settings: &RecruitingSettings) -> BudgetStatus {
        let team = settings.team.id;
        let spent = self
            .entries(team)
            .filter_map(|entry| ledger.profile_for(entry.candidate_id, team))
            .map(|profile| profile.current_cycle_points)
            .fold(0.0, |spent, points| spent + points);

        BudgetStatus {
            team_id: team,
            spent,
            weekly_points: settings.weekly_points,
        }
    }

    /// Drop a candidate from every board, returning the teams that tracked it.
    pub(crate) fn drop_candidate(&mut self, candidate: CandidateId) -> Vec<TeamId> {
        let mut teams = Vec::new();
        for (team, board) in self.boards.iter_mut() {
            if board.remove(&candidate).is_some() {
                teams.push(*team);
            }
        }
        teams
    }

    pub(crate) fn restore(&mut self, entry: BoardEntry) {
        self.boards
            .entry(entry.team_id)
            .or_default()
            .insert(entry.candidate_id, entry);
    }
}
