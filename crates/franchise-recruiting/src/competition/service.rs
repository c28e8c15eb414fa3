use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::board::BudgetStatus;
use super::domain::{
    Candidate, CandidateId, CandidateStatus, Promise, RecruitingSettings, TeamId, TeamIdentity,
    TeamProfile,
};
use super::engine::{BoardReceipt, BoardView, CompetitionEngine, PointsReceipt};
use super::error::CompetitionError;
use super::gate::CycleGate;
use super::gateway::{GatewayError, MutationGateway};
use super::modifiers::ModifierComponent;
use super::requests::{
    AddToBoardRequest, AiSettingsRequest, CancelPromiseRequest, CycleStateRequest, Mutation,
    PromiseRequest, RemoveFromBoardRequest, ScholarshipRequest, ScoutRequest,
    UpdatePointsRequest, CURRENT_WEEKS_POINTS_FIELD,
};
use super::scouting::ScoutReport;
use super::standings::{Standings, StandingsCache};

/// Service composing the competition engine, the standings cache, and the remote gateway.
///
/// Every write is applied locally first and then forwarded; when the gateway refuses
/// it, the engine is restored to the snapshot taken before the write.
pub struct RecruitingService<G> {
    engine: Mutex<CompetitionEngine>,
    cache: Mutex<StandingsCache>,
    gateway: Arc<G>,
}

impl<G> RecruitingService<G>
where
    G: MutationGateway + 'static,
{
    pub fn new(engine: CompetitionEngine, gateway: Arc<G>) -> Self {
        Self {
            engine: Mutex::new(engine),
            cache: Mutex::new(StandingsCache::default()),
            gateway,
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Clone of the current engine state.
    pub fn snapshot(&self) -> CompetitionEngine {
        self.engine().clone()
    }

    pub fn cycle(&self) -> CycleGate {
        self.engine().gate().clone()
    }

    pub fn register_team(&self, team: TeamIdentity) -> RecruitingSettings {
        self.engine().register_team(team).clone()
    }

    pub fn register_team_settings(&self, settings: RecruitingSettings) -> RecruitingSettings {
        self.engine().register_team_settings(settings).clone()
    }

    /// Intake from the authoritative store; not forwarded back through the gateway.
    pub fn register_candidate(&self, candidate: Candidate) {
        debug!(candidate = %candidate.id, "candidate registered");
        self.engine().register_candidate(candidate);
    }

    pub fn update_candidate_status(
        &self,
        candidate: CandidateId,
        status: CandidateStatus,
    ) -> Result<Vec<TeamId>, RecruitingServiceError> {
        let dropped = self.engine().update_candidate_status(candidate, status)?;
        info!(
            candidate = %candidate,
            status = status.label(),
            boards = dropped.len(),
            "candidate status changed"
        );
        Ok(dropped)
    }

    /// Lock or unlock the cycle as published by the weekly resolution job.
    pub fn apply_cycle_state(&self, request: CycleStateRequest) -> CycleGate {
        self.apply_cycle_state_at(request, Utc::now())
    }

    pub fn apply_cycle_state_at(&self, request: CycleStateRequest, now: DateTime<Utc>) -> CycleGate {
        let mut engine = self.engine();
        if engine.apply_cycle_state(request.state, request.week, now) {
            info!(state = ?request.state, week = request.week, "cycle state changed");
        }
        engine.gate().clone()
    }

    pub fn add_to_board(
        &self,
        session: TeamId,
        request: AddToBoardRequest,
    ) -> Result<BoardReceipt, RecruitingServiceError> {
        self.commit(
            |engine| engine.add_to_board(session, &request, Utc::now()),
            |_| Some(Mutation::AddToBoard(request.clone())),
        )
    }

    pub fn remove_from_board(
        &self,
        session: TeamId,
        request: RemoveFromBoardRequest,
    ) -> Result<bool, RecruitingServiceError> {
        self.commit(
            |engine| engine.remove_from_board(session, &request, Utc::now()),
            |removed| removed.then(|| Mutation::RemoveFromBoard(request.clone())),
        )
    }

    /// Add a delta for `team` on `candidate`; forwarded as a cycle-points update.
    pub fn add_points(
        &self,
        session: TeamId,
        candidate: CandidateId,
        team: TeamId,
        delta: f64,
    ) -> Result<PointsReceipt, RecruitingServiceError> {
        self.commit(
            |engine| engine.add_points(session, candidate, team, delta, Utc::now()),
            |receipt| {
                Some(Mutation::UpdatePoints(UpdatePointsRequest {
                    profile_id: receipt.profile.id,
                    field_name: CURRENT_WEEKS_POINTS_FIELD.to_string(),
                    value: receipt.profile.current_cycle_points,
                }))
            },
        )
    }

    pub fn update_points(
        &self,
        session: TeamId,
        request: UpdatePointsRequest,
    ) -> Result<PointsReceipt, RecruitingServiceError> {
        self.commit(
            |engine| engine.update_points(session, &request, Utc::now()),
            |receipt| {
                Some(Mutation::UpdatePoints(UpdatePointsRequest {
                    value: receipt.profile.current_cycle_points,
                    ..request.clone()
                }))
            },
        )
    }

    pub fn toggle_scholarship(
        &self,
        session: TeamId,
        request: ScholarshipRequest,
    ) -> Result<TeamProfile, RecruitingServiceError> {
        self.commit(
            |engine| engine.toggle_scholarship(session, &request, Utc::now()),
            |_| Some(Mutation::ToggleScholarship(request.clone())),
        )
    }

    pub fn scout_attribute(
        &self,
        session: TeamId,
        request: ScoutRequest,
    ) -> Result<ScoutReport, RecruitingServiceError> {
        self.commit(
            |engine| engine.scout_attribute(session, &request, Utc::now()),
            |_| Some(Mutation::ScoutAttribute(request.clone())),
        )
    }

    pub fn save_promise(
        &self,
        session: TeamId,
        request: PromiseRequest,
    ) -> Result<Promise, RecruitingServiceError> {
        self.commit(
            |engine| engine.save_promise(session, &request),
            |_| Some(Mutation::SavePromise(request.clone())),
        )
    }

    pub fn cancel_promise(
        &self,
        session: TeamId,
        request: CancelPromiseRequest,
    ) -> Result<Option<Promise>, RecruitingServiceError> {
        self.commit(
            |engine| engine.cancel_promise(session, &request),
            |cancelled| {
                cancelled
                    .as_ref()
                    .map(|_| Mutation::CancelPromise(request.clone()))
            },
        )
    }

    pub fn save_ai_settings(
        &self,
        session: TeamId,
        team: TeamId,
        request: AiSettingsRequest,
    ) -> Result<RecruitingSettings, RecruitingServiceError> {
        self.commit(
            |engine| engine.save_ai_settings(session, team, &request),
            |_| {
                Some(Mutation::SaveAiSettings {
                    team_id: team,
                    settings: request.clone(),
                })
            },
        )
    }

    /// Current standings, memoised per ledger version.
    pub fn standings(&self, candidate: CandidateId) -> Result<Standings, RecruitingServiceError> {
        let engine = self.engine();
        let version = engine.version();
        let mut cache = self.cache();
        if let Some(standings) = cache.get(candidate, version) {
            return Ok(standings.clone());
        }

        let standings = engine.project(candidate)?;
        cache.insert(candidate, version, standings.clone());
        Ok(standings)
    }

    pub fn modifier(&self, candidate: CandidateId, team: TeamId) -> Option<ModifierComponent> {
        self.engine().explain_modifier(candidate, team)
    }

    pub fn board_view(&self, team: TeamId) -> Result<BoardView, RecruitingServiceError> {
        Ok(self.engine().board_view(team)?)
    }

    pub fn budget_status(&self, team: TeamId) -> Result<BudgetStatus, RecruitingServiceError> {
        Ok(self.engine().budget_status(team)?)
    }

    /// Profiles touched after `since`, for the weekly sync job.
    pub fn changes_since(&self, since: DateTime<Utc>) -> Vec<TeamProfile> {
        self.engine()
            .ledger()
            .changes_since(since)
            .into_iter()
            .cloned()
            .collect()
    }

    fn commit<T, A, M>(&self, apply: A, mutation: M) -> Result<T, RecruitingServiceError>
    where
        A: FnOnce(&mut CompetitionEngine) -> Result<T, CompetitionError>,
        M: FnOnce(&T) -> Option<Mutation>,
    {
        let mut engine = self.engine();
        let snapshot = engine.clone();

        let value = match apply(&mut *engine) {
            Ok(value) => value,
            Err(error) => {
                *engine = snapshot;
                debug!(%error, "mutation refused locally");
                return Err(error.into());
            }
        };

        let Some(mutation) = mutation(&value) else {
            return Ok(value);
        };

        if let Err(error) = self.gateway.send(&mutation) {
            *engine = snapshot;
            self.cache().clear();
            warn!(mutation = mutation.label(), %error, "remote store refused mutation; rolled back");
            return Err(error.into());
        }

        info!(
            mutation = mutation.label(),
            version = engine.version(),
            "mutation accepted"
        );
        Ok(value)
    }

    fn engine(&self) -> MutexGuard<'_, CompetitionEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache(&self) -> MutexGuard<'_, StandingsCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Error raised by the recruiting service.
#[derive(Debug, thiserror::Error)]
pub enum RecruitingServiceError {
    #[error(transparent)]
    Competition(#[from] CompetitionError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
