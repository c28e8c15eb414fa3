use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use franchise_recruiting::competition::{
    cycle_sync_router, recruiting_router, CandidateId, LedgerSnapshotImporter, MutationGateway, RecruitingService,
    Standings, DISPLAY_LEADER_LIMIT,
};
use franchise_recruiting::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// Offline projection over a ledger export; the live engine is not touched.
#[derive(Debug, Deserialize)]
pub(crate) struct StandingsReportRequest {
    pub(crate) ledger_csv: String,
    #[serde(default)]
    pub(crate) candidate_id: Option<u32>,
    #[serde(default)]
    pub(crate) include_all: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct StandingsReportResponse {
    pub(crate) generated_at: chrono::DateTime<Utc>,
    pub(crate) candidates: usize,
    pub(crate) standings: Vec<Standings>,
}

/// Team routes plus service endpoints. The cycle route is mounted only with a sync key.
pub(crate) fn with_recruiting_routes<G>(
    service: Arc<RecruitingService<G>>,
    sync_key: Option<&str>,
) -> axum::Router
where
    G: MutationGateway + 'static,
{
    let mut router = recruiting_router(service.clone());
    if let Some(key) = sync_key {
        router = router.merge(cycle_sync_router(service, key));
    }
    router
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/recruiting/reports/standings",
            axum::routing::post(standings_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn standings_report_endpoint(
    Json(payload): Json<StandingsReportRequest>,
) -> Result<Json<StandingsReportResponse>, AppError> {
    let StandingsReportRequest {
        ledger_csv,
        candidate_id,
        include_all,
    } = payload;

    let generated_at = Utc::now();
    let engine = LedgerSnapshotImporter::from_reader(
        Cursor::new(ledger_csv.into_bytes()),
        Default::default(),
        generated_at,
    )?;

    let ids: Vec<CandidateId> = match candidate_id {
        Some(id) => vec![CandidateId(id)],
        None => engine.candidates().map(|candidate| candidate.id).collect(),
    };
    let mut standings = Vec::with_capacity(ids.len());
    for id in ids {
        // unknown ids simply produce no entry
        let Ok(mut projected) = engine.project(id) else {
            continue;
        };
        if !include_all {
            projected.entries.truncate(DISPLAY_LEADER_LIMIT);
        }
        standings.push(projected);
    }

    Ok(Json(StandingsReportResponse {
        generated_at,
        candidates: standings.len(),
        standings,
    }))
}
