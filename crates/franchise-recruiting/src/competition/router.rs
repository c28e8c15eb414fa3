use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{CandidateId, TeamId};
use super::error::{CompetitionError, ValidationWarning};
use super::gateway::MutationGateway;
use super::requests::{
    AddToBoardRequest, AiSettingsRequest, CancelPromiseRequest, CycleStateRequest, PromiseRequest,
    RemoveFromBoardRequest, ScholarshipRequest, ScoutRequest, UpdatePointsRequest,
};
use super::service::{RecruitingService, RecruitingServiceError};

/// Header carrying the acting team for every mutation.
pub const TEAM_HEADER: &str = "x-team-id";

/// Router builder exposing the recruiting board, ledger, and standings endpoints.
pub fn recruiting_router<G>(service: Arc<RecruitingService<G>>) -> Router
where
    G: MutationGateway + 'static,
{
    Router::new()
        .route("/api/v1/recruiting/board", post(add_to_board_handler::<G>))
        .route(
            "/api/v1/recruiting/board/remove",
            post(remove_from_board_handler::<G>),
        )
        .route("/api/v1/recruiting/points", post(update_points_handler::<G>))
        .route(
            "/api/v1/recruiting/scholarship",
            post(scholarship_handler::<G>),
        )
        .route("/api/v1/recruiting/scout", post(scout_handler::<G>))
        .route("/api/v1/recruiting/promises", post(save_promise_handler::<G>))
        .route(
            "/api/v1/recruiting/promises/cancel",
            post(cancel_promise_handler::<G>),
        )
        .route(
            "/api/v1/recruiting/ai-settings",
            post(ai_settings_handler::<G>),
        )
        .route(
            "/api/v1/recruiting/candidates/:candidate_id/standings",
            get(standings_handler::<G>),
        )
        .route(
            "/api/v1/recruiting/teams/:team_id/board",
            get(board_view_handler::<G>),
        )
        .with_state(service)
}

/// Header carrying the shared credential of the weekly resolution job.
pub const SYNC_KEY_HEADER: &str = "x-sync-key";

/// Internal routes driven by the weekly resolution job, never by a team session.
pub fn cycle_sync_router<G>(service: Arc<RecruitingService<G>>, sync_key: impl Into<String>) -> Router
where
    G: MutationGateway + 'static,
{
    let state = SyncState {
        service,
        sync_key: Arc::from(sync_key.into()),
    };
    Router::new()
        .route("/api/v1/recruiting/cycle", put(cycle_handler::<G>))
        .with_state(state)
}

pub(crate) struct SyncState<G> {
    service: Arc<RecruitingService<G>>,
    sync_key: Arc<str>,
}

impl<G> Clone for SyncState<G> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            sync_key: self.sync_key.clone(),
        }
    }
}

pub(crate) async fn add_to_board_handler<G>(
    State(service): State<Arc<RecruitingService<G>>>,
    headers: HeaderMap,
    Json(request): Json<AddToBoardRequest>,
) -> Response
where
    G: MutationGateway + 'static,
{
    let session = match session_team(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };
    match service.add_to_board(session, request) {
        Ok(receipt) => {
            let warning = receipt.warning();
            accepted(StatusCode::CREATED, &receipt, warning)
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_from_board_handler<G>(
    State(service): State<Arc<RecruitingService<G>>>,
    headers: HeaderMap,
    Json(request): Json<RemoveFromBoardRequest>,
) -> Response
where
    G: MutationGateway + 'static,
{
    let session = match session_team(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let candidate = request.candidate_id;
    match service.remove_from_board(session, request) {
        Ok(removed) => (
            StatusCode::OK,
            Json(json!({ "candidate_id": candidate, "removed": removed })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_points_handler<G>(
    State(service): State<Arc<RecruitingService<G>>>,
    headers: HeaderMap,
    Json(request): Json<UpdatePointsRequest>,
) -> Response
where
    G: MutationGateway + 'static,
{
    let session = match session_team(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };
    match service.update_points(session, request) {
        Ok(receipt) => {
            let warning = receipt.warning();
            accepted(StatusCode::OK, &receipt, warning)
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn scholarship_handler<G>(
    State(service): State<Arc<RecruitingService<G>>>,
    headers: HeaderMap,
    Json(request): Json<ScholarshipRequest>,
) -> Response
where
    G: MutationGateway + 'static,
{
    let session = match session_team(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };
    match service.toggle_scholarship(session, request) {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn scout_handler<G>(
    State(service): State<Arc<RecruitingService<G>>>,
    headers: HeaderMap,
    Json(request): Json<ScoutRequest>,
) -> Response
where
    G: MutationGateway + 'static,
{
    let session = match session_team(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };
    match service.scout_attribute(session, request) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_promise_handler<G>(
    State(service): State<Arc<RecruitingService<G>>>,
    headers: HeaderMap,
    Json(request): Json<PromiseRequest>,
) -> Response
where
    G: MutationGateway + 'static,
{
    let session = match session_team(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };
    match service.save_promise(session, request) {
        Ok(promise) => (StatusCode::OK, Json(promise)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_promise_handler<G>(
    State(service): State<Arc<RecruitingService<G>>>,
    headers: HeaderMap,
    Json(request): Json<CancelPromiseRequest>,
) -> Response
where
    G: MutationGateway + 'static,
{
    let session = match session_team(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };
    match service.cancel_promise(session, request) {
        Ok(cancelled) => (
            StatusCode::OK,
            Json(json!({ "cancelled": cancelled.is_some(), "promise": cancelled })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn ai_settings_handler<G>(
    State(service): State<Arc<RecruitingService<G>>>,
    headers: HeaderMap,
    Json(request): Json<AiSettingsRequest>,
) -> Response
where
    G: MutationGateway + 'static,
{
    let session = match session_team(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };
    match service.save_ai_settings(session, session, request) {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn standings_handler<G>(
    State(service): State<Arc<RecruitingService<G>>>,
    Path(candidate_id): Path<u32>,
) -> Response
where
    G: MutationGateway + 'static,
{
    match service.standings(CandidateId(candidate_id)) {
        Ok(standings) => (StatusCode::OK, Json(standings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn board_view_handler<G>(
    State(service): State<Arc<RecruitingService<G>>>,
    headers: HeaderMap,
    Path(team_id): Path<u32>,
) -> Response
where
    G: MutationGateway + 'static,
{
    let session = match session_team(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let team = TeamId(team_id);
    if session != team {
        return error_response(
            CompetitionError::PermissionDenied {
                session,
                owner: team,
            }
            .into(),
        );
    }
    match service.board_view(team) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cycle_handler<G>(
    State(state): State<SyncState<G>>,
    headers: HeaderMap,
    Json(request): Json<CycleStateRequest>,
) -> Response
where
    G: MutationGateway + 'static,
{
    let presented = headers
        .get(SYNC_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if state.sync_key.is_empty() || presented != Some(&*state.sync_key) {
        let payload = json!({
            "error": format!("cycle state is only accepted with a valid {SYNC_KEY_HEADER} header"),
        });
        return (StatusCode::FORBIDDEN, Json(payload)).into_response();
    }
    let gate = state.service.apply_cycle_state(request);
    (StatusCode::OK, Json(gate)).into_response()
}

fn session_team(headers: &HeaderMap) -> Result<TeamId, Response> {
    headers
        .get(TEAM_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u32>().ok())
        .map(TeamId)
        .ok_or_else(|| {
            let payload = json!({
                "error": format!("missing or invalid {TEAM_HEADER} header"),
            });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })
}

fn accepted<T: Serialize>(status: StatusCode, body: &T, warning: Option<ValidationWarning>) -> Response {
    let warnings: Vec<String> = warning.iter().map(ValidationWarning::message).collect();
    let payload = json!({
        "result": body,
        "warnings": warnings,
    });
    (status, Json(payload)).into_response()
}

pub(crate) fn error_status(error: &RecruitingServiceError) -> StatusCode {
    let error = match error {
        RecruitingServiceError::Gateway(_) => return StatusCode::BAD_GATEWAY,
        RecruitingServiceError::Competition(error) => error,
    };
    match error {
        CompetitionError::CycleLocked => StatusCode::LOCKED,
        CompetitionError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        CompetitionError::CapacityExceeded { .. }
        | CompetitionError::AlreadyOnBoard { .. }
        | CompetitionError::CandidateUnavailable { .. }
        | CompetitionError::NotOnBoard { .. }
        | CompetitionError::OfferRevoked { .. }
        | CompetitionError::NoScholarshipsAvailable(_) => StatusCode::CONFLICT,
        CompetitionError::InvalidPromiseConfiguration(_)
        | CompetitionError::InvalidAiSettings(_)
        | CompetitionError::ScholarshipsNotOffered(_)
        | CompetitionError::UnsupportedField(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CompetitionError::UnknownCandidate(_)
        | CompetitionError::UnknownTeam(_)
        | CompetitionError::UnknownProfile(_) => StatusCode::NOT_FOUND,
    }
}

fn error_response(error: RecruitingServiceError) -> Response {
    let status = error_status(&error);
    let payload = match &error {
        RecruitingServiceError::Competition(inner) if status == StatusCode::UNPROCESSABLE_ENTITY => {
            json!({
                "error": error.to_string(),
                "messages": inner.messages(),
            })
        }
        _ => json!({ "error": error.to_string() }),
    };
    (status, Json(payload)).into_response()
}
