use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::EngineConfig;

use super::board::{BoardManager, BudgetStatus};
use super::domain::{
    BoardEntry, Candidate, CandidateId, CandidateStatus, League, Promise, RecruitingSettings,
    TeamId, TeamIdentity, TeamProfile,
};
use super::error::{CompetitionError, ValidationWarning};
use super::gate::{CycleGate, CycleState};
use super::guard::SubmissionGuard;
use super::ledger::{ensure_owner, PointsLedger};
use super::modifiers::{ModifierCalculator, ModifierComponent, ModifierTable, SeasonOutlook};
use super::requests::{
    AddToBoardRequest, AiSettingsRequest, CancelPromiseRequest, PromiseRequest,
    RemoveFromBoardRequest, ScholarshipRequest, ScoutRequest, UpdatePointsRequest,
    CURRENT_WEEKS_POINTS_FIELD,
};
use super::scholarship;
use super::scouting::{self, ScoutReport};
use super::standings::{ScoredProfile, Standings, StandingsProjector};

/// Result of a board add: the entry, its ledger row, and the team's spend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardReceipt {
    pub entry: BoardEntry,
    pub profile: TeamProfile,
    pub budget: BudgetStatus,
}

impl BoardReceipt {
    pub fn warning(&self) -> Option<ValidationWarning> {
        self.budget.warning()
    }
}

/// Result of a point update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointsReceipt {
    pub profile: TeamProfile,
    pub budget: BudgetStatus,
}

impl PointsReceipt {
    pub fn warning(&self) -> Option<ValidationWarning> {
        self.budget.warning()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardEntryView {
    pub candidate_id: CandidateId,
    pub name: String,
    pub league: League,
    pub position: String,
    pub stars: u8,
    pub current_cycle_points: f64,
    pub total_points: f64,
    pub modifier: f64,
    pub scholarship_offered: bool,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub team: TeamIdentity,
    pub capacity: usize,
    pub entries: Vec<BoardEntryView>,
    pub budget: BudgetStatus,
}

/// In-memory projection of the authoritative competition state.
///
/// Cloning the engine captures a complete snapshot, so a rejected remote write is
/// rolled back by restoring the clone taken before the mutation.
#[derive(Debug, Clone)]
pub struct CompetitionEngine {
    config: EngineConfig,
    gate: CycleGate,
    candidates: BTreeMap<CandidateId, Candidate>,
    teams: BTreeMap<TeamId, RecruitingSettings>,
    ledger: PointsLedger,
    board: BoardManager,
    promises: BTreeMap<(CandidateId, TeamId), Promise>,
    calculator: ModifierCalculator,
    guard: SubmissionGuard,
    version: u64,
}

impl CompetitionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_modifiers(config, ModifierTable::default(), SeasonOutlook::default())
    }

    pub fn with_modifiers(config: EngineConfig, table: ModifierTable, outlook: SeasonOutlook) -> Self {
        let guard = SubmissionGuard::new(outlook.games_per_season, config.ai_min_spread);
        Self {
            gate: CycleGate::default(),
            candidates: BTreeMap::new(),
            teams: BTreeMap::new(),
            ledger: PointsLedger::new(config.cycle_point_cap),
            board: BoardManager::default(),
            promises: BTreeMap::new(),
            calculator: ModifierCalculator::new(table, outlook),
            guard,
            version: 0,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn gate(&self) -> &CycleGate {
        &self.gate
    }

    pub fn ledger(&self) -> &PointsLedger {
        &self.ledger
    }

    pub fn board(&self) -> &BoardManager {
        &self.board
    }

    /// Bumped on every accepted mutation; keys the standings cache.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn candidate(&self, id: CandidateId) -> Result<&Candidate, CompetitionError> {
        self.candidates
            .get(&id)
            .ok_or(CompetitionError::UnknownCandidate(id))
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> + '_ {
        self.candidates.values()
    }

    pub fn team_settings(&self, team: TeamId) -> Result<&RecruitingSettings, CompetitionError> {
        self.teams.get(&team).ok_or(CompetitionError::UnknownTeam(team))
    }

    pub fn promise(&self, candidate: CandidateId, team: TeamId) -> Option<&Promise> {
        self.promises.get(&(candidate, team))
    }

    /// Register a team with the configured default limits.
    pub fn register_team(&mut self, team: TeamIdentity) -> &RecruitingSettings {
        let settings = RecruitingSettings {
            weekly_points: self.config.weekly_points,
            board_capacity: self.config.board_capacity,
            scholarships_available: self.config.scholarships,
            ai: Default::default(),
            team,
        };
        self.register_team_settings(settings)
    }

    pub fn register_team_settings(&mut self, settings: RecruitingSettings) -> &RecruitingSettings {
        self.version += 1;
        let team = settings.team.id;
        self.teams.insert(team, settings);
        &self.teams[&team]
    }

    /// Intake from the external process. Non-uncommitted candidates leave every board.
    pub fn register_candidate(&mut self, candidate: Candidate) {
        let id = candidate.id;
        let available = candidate.is_available();
        self.candidates.insert(id, candidate);
        if !available {
            self.board.drop_candidate(id);
        }
        self.version += 1;
    }

    /// Record a signing or withdrawal. Returns the teams whose boards lost the candidate.
    pub fn update_candidate_status(
        &mut self,
        id: CandidateId,
        status: CandidateStatus,
    ) -> Result<Vec<TeamId>, CompetitionError> {
        let candidate = self
            .candidates
            .get_mut(&id)
            .ok_or(CompetitionError::UnknownCandidate(id))?;
        candidate.status = status;
        let dropped = if status == CandidateStatus::Uncommitted {
            Vec::new()
        } else {
            self.board.drop_candidate(id)
        };
        self.version += 1;
        Ok(dropped)
    }

    /// Forget a candidate entirely, e.g. at season rollover.
    pub fn retire_candidate(&mut self, id: CandidateId) -> Option<Candidate> {
        let candidate = self.candidates.remove(&id)?;
        self.board.drop_candidate(id);
        self.ledger.purge_candidate(id);
        self.promises.retain(|(candidate_id, _), _| *candidate_id != id);
        self.version += 1;
        Some(candidate)
    }

    /// Applied only by the weekly resolution job.
    pub fn apply_cycle_state(&mut self, state: CycleState, week: u32, now: DateTime<Utc>) -> bool {
        let flipped = self.gate.apply(state, week, now);
        if flipped {
            self.version += 1;
        }
        flipped
    }

    pub fn add_to_board(
        &mut self,
        session: TeamId,
        request: &AddToBoardRequest,
        now: DateTime<Utc>,
    ) -> Result<BoardReceipt, CompetitionError> {
        self.gate.ensure_open()?;
        let team = request.profile_id;
        ensure_owner(session, team)?;
        let settings = self
            .teams
            .get(&team)
            .ok_or(CompetitionError::UnknownTeam(team))?;

        let snapshot = match self.candidates.get(&request.candidate_id) {
            Some(_) => None,
            None => match &request.candidate_snapshot {
                Some(snapshot) if snapshot.id == request.candidate_id => Some(snapshot.clone()),
                _ => return Err(CompetitionError::UnknownCandidate(request.candidate_id)),
            },
        };
        let candidate = match &snapshot {
            Some(snapshot) => snapshot,
            None => &self.candidates[&request.candidate_id],
        };

        let (entry, profile) = self.board.add_to_board(
            &self.gate,
            &mut self.ledger,
            session,
            settings,
            candidate,
            now,
        )?;
        let budget = self.board.budget_status(&self.ledger, settings);

        if let Some(snapshot) = snapshot {
            self.candidates.insert(snapshot.id, snapshot);
        }
        self.version += 1;

        Ok(BoardReceipt {
            entry,
            profile,
            budget,
        })
    }

    /// Idempotent: removing a candidate that is not on the board returns `Ok(false)`.
    pub fn remove_from_board(
        &mut self,
        session: TeamId,
        request: &RemoveFromBoardRequest,
        now: DateTime<Utc>,
    ) -> Result<bool, CompetitionError> {
        let removed = self.board.remove_from_board(
            &self.gate,
            &mut self.ledger,
            session,
            request.profile_id,
            request.candidate_id,
            now,
        )?;
        if removed {
            if let Some(promise) = self
                .promises
                .get_mut(&(request.candidate_id, request.profile_id))
            {
                promise.is_active = false;
            }
            self.version += 1;
        }
        Ok(removed)
    }

    /// Add `delta` points for `team` on `candidate`, clamped to the cycle cap.
    /// The candidate must be on the team's board.
    pub fn add_points(
        &mut self,
        session: TeamId,
        candidate: CandidateId,
        team: TeamId,
        delta: f64,
        now: DateTime<Utc>,
    ) -> Result<PointsReceipt, CompetitionError> {
        self.gate.ensure_open()?;
        ensure_owner(session, team)?;
        self.ensure_point_eligibility(candidate, team)?;
        let settings = self
            .teams
            .get(&team)
            .ok_or(CompetitionError::UnknownTeam(team))?;
        if !self.board.contains(team, candidate) {
            return Err(CompetitionError::NotOnBoard { team, candidate });
        }

        let profile = self
            .ledger
            .add_points(&self.gate, session, candidate, &settings.team, delta, now)?;
        let budget = self.board.budget_status(&self.ledger, settings);
        self.version += 1;

        Ok(PointsReceipt { profile, budget })
    }

    /// Apply an "update points" payload: set the row's cycle allocation to `Value`.
    pub fn update_points(
        &mut self,
        session: TeamId,
        request: &UpdatePointsRequest,
        now: DateTime<Utc>,
    ) -> Result<PointsReceipt, CompetitionError> {
        self.gate.ensure_open()?;
        if request.field_name != CURRENT_WEEKS_POINTS_FIELD {
            return Err(CompetitionError::UnsupportedField(request.field_name.clone()));
        }
        let profile = self
            .ledger
            .profile(request.profile_id)
            .ok_or(CompetitionError::UnknownProfile(request.profile_id))?;
        let (candidate, team) = (profile.candidate_id, profile.team.id);
        let delta = request.value - profile.current_cycle_points;

        self.add_points(session, candidate, team, delta, now)
    }

    pub fn toggle_scholarship(
        &mut self,
        session: TeamId,
        request: &ScholarshipRequest,
        now: DateTime<Utc>,
    ) -> Result<TeamProfile, CompetitionError> {
        self.gate.ensure_open()?;
        let team = request.profile_id;
        ensure_owner(session, team)?;
        let league = self.candidate(request.candidate_id)?.league;
        if !league.uses_scholarships() {
            return Err(CompetitionError::ScholarshipsNotOffered(league));
        }

        let settings = self
            .teams
            .get_mut(&team)
            .ok_or(CompetitionError::UnknownTeam(team))?;
        let profile = self.ledger.active_profile_mut(request.candidate_id, team)?;
        scholarship::toggle(settings, profile, request.attribute, now)?;
        let profile = profile.clone();
        self.version += 1;

        Ok(profile)
    }

    /// Reveal a hidden attribute to the scouting team. Standings are unaffected.
    pub fn scout_attribute(
        &mut self,
        session: TeamId,
        request: &ScoutRequest,
        now: DateTime<Utc>,
    ) -> Result<ScoutReport, CompetitionError> {
        self.gate.ensure_open()?;
        let team = request.profile_id;
        ensure_owner(session, team)?;
        let candidate = self
            .candidates
            .get(&request.candidate_id)
            .ok_or(CompetitionError::UnknownCandidate(request.candidate_id))?;
        let profile = self.ledger.active_profile_mut(request.candidate_id, team)?;

        Ok(scouting::scout(candidate, profile, request.attribute, now))
    }

    /// Create or replace the team's promise to a candidate on its board.
    pub fn save_promise(
        &mut self,
        session: TeamId,
        request: &PromiseRequest,
    ) -> Result<Promise, CompetitionError> {
        self.gate.ensure_open()?;
        ensure_owner(session, request.team_id)?;
        let candidate = self.candidate(request.candidate_id)?;
        if !candidate.is_available() {
            return Err(CompetitionError::CandidateUnavailable {
                candidate: candidate.id,
                status: candidate.status,
            });
        }
        self.ensure_on_board(request.candidate_id, request.team_id)?;

        let promise = self.guard.promise_from_request(candidate, request)?;
        self.promises
            .insert((promise.candidate_id, promise.team_id), promise.clone());
        self.version += 1;
        Ok(promise)
    }

    /// Deactivate the team's promise; returns the deactivated promise if one was active.
    pub fn cancel_promise(
        &mut self,
        session: TeamId,
        request: &CancelPromiseRequest,
    ) -> Result<Option<Promise>, CompetitionError> {
        self.gate.ensure_open()?;
        ensure_owner(session, request.team_id)?;

        let Some(promise) = self
            .promises
            .get_mut(&(request.candidate_id, request.team_id))
            .filter(|promise| promise.is_active)
        else {
            return Ok(None);
        };
        promise.is_active = false;
        let promise = promise.clone();
        self.version += 1;
        Ok(Some(promise))
    }

    pub fn save_ai_settings(
        &mut self,
        session: TeamId,
        team: TeamId,
        request: &AiSettingsRequest,
    ) -> Result<RecruitingSettings, CompetitionError> {
        ensure_owner(session, team)?;
        let ai = self.guard.ai_settings_from_request(team, request)?;
        let settings = self
            .teams
            .get_mut(&team)
            .ok_or(CompetitionError::UnknownTeam(team))?;
        settings.ai = ai;
        let settings = settings.clone();
        self.version += 1;
        Ok(settings)
    }

    pub fn explain_modifier(&self, candidate: CandidateId, team: TeamId) -> Option<ModifierComponent> {
        let candidate = self.candidates.get(&candidate)?;
        let profile = self.ledger.profile_for(candidate.id, team)?;
        self.calculator.explain(
            candidate,
            profile,
            self.promises.get(&(candidate.id, team)),
            self.teams.get(&team),
        )
    }

    /// The "Mod." value shown to a team.
    pub fn modifier_for(&self, candidate: CandidateId, team: TeamId) -> f64 {
        self.explain_modifier(candidate, team)
            .map(|component| component.value)
            .unwrap_or(0.0)
    }

    /// Derive standings from the current ledger rows and promises.
    pub fn project(&self, candidate_id: CandidateId) -> Result<Standings, CompetitionError> {
        let candidate = self.candidate(candidate_id)?;
        let scored = self
            .ledger
            .profiles_for_candidate(candidate_id)
            .filter(|profile| !profile.removed_from_board)
            .map(|profile| ScoredProfile {
                team_id: profile.team.id,
                team_abbreviation: profile.team.abbreviation.clone(),
                total_points: profile.total_points,
                modifier: self.calculator.compute(
                    candidate,
                    profile,
                    self.promises.get(&(candidate_id, profile.team.id)),
                    self.teams.get(&profile.team.id),
                ),
            });

        Ok(StandingsProjector::project(candidate_id, scored))
    }

    pub fn budget_status(&self, team: TeamId) -> Result<BudgetStatus, CompetitionError> {
        let settings = self.team_settings(team)?;
        Ok(self.board.budget_status(&self.ledger, settings))
    }

    pub fn board_view(&self, team: TeamId) -> Result<BoardView, CompetitionError> {
        let settings = self.team_settings(team)?;
        let entries = self
            .board
            .entries(team)
            .filter_map(|entry| {
                let candidate = self.candidates.get(&entry.candidate_id)?;
                let profile = self.ledger.profile_for(entry.candidate_id, team)?;
                Some(BoardEntryView {
                    candidate_id: candidate.id,
                    name: candidate.name.clone(),
                    league: candidate.league,
                    position: candidate.position.clone(),
                    stars: candidate.stars,
                    current_cycle_points: profile.current_cycle_points,
                    total_points: profile.total_points,
                    modifier: self.modifier_for(candidate.id, team),
                    scholarship_offered: profile.scholarship_offered,
                    added_at: entry.added_at,
                })
            })
            .collect();

        Ok(BoardView {
            team: settings.team.clone(),
            capacity: settings.board_capacity,
            entries,
            budget: self.board.budget_status(&self.ledger, settings),
        })
    }

    /// Load authoritative rows without gate or ownership checks.
    pub(crate) fn restore_profile(&mut self, profile: TeamProfile, added_at: DateTime<Utc>) {
        let available = self
            .candidates
            .get(&profile.candidate_id)
            .map(Candidate::is_available)
            .unwrap_or(false);
        if available && !profile.removed_from_board {
            self.board.restore(BoardEntry {
                team_id: profile.team.id,
                candidate_id: profile.candidate_id,
                added_at,
            });
        }
        self.ledger.restore(profile);
        self.version += 1;
    }

    fn ensure_on_board(&self, candidate: CandidateId, team: TeamId) -> Result<(), CompetitionError> {
        self.ledger.active_profile(candidate, team).map(|_| ())
    }

    fn ensure_point_eligibility(
        &self,
        candidate_id: CandidateId,
        team: TeamId,
    ) -> Result<(), CompetitionError> {
        let candidate = self.candidate(candidate_id)?;
        if !candidate.is_available() {
            return Err(CompetitionError::CandidateUnavailable {
                candidate: candidate_id,
                status: candidate.status,
            });
        }
        let revoked = self
            .ledger
            .profile_for(candidate_id, team)
            .map(|profile| profile.scholarship_revoked)
            .unwrap_or(false);
        if candidate.league.uses_scholarships() && revoked {
            return Err(CompetitionError::OfferRevoked {
                team,
                candidate: candidate_id,
            });
        }
        Ok(())
    }
}
