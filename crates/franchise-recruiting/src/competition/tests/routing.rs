use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::competition::domain::PromiseType;
use crate::competition::service::RecruitingService;
use crate::competition::{cycle_sync_router, SYNC_KEY_HEADER, TEAM_HEADER};

fn session(team: u32) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TEAM_HEADER, HeaderValue::from(team));
    headers
}

fn post_json(uri: &str, team: Option<u32>, body: &impl serde::Serialize) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(team) = team {
        builder = builder.header(TEAM_HEADER, team.to_string());
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn add_to_board_handler_returns_created_receipt() {
    let (service, gateway) = build_service();

    let response = crate::competition::router::add_to_board_handler::<MemoryGateway>(
        State(Arc::new(service)),
        session(1),
        axum::Json(board_request(QUARTERBACK, ALABAMA)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["result"]["entry"]["candidate_id"], json!(7));
    assert_eq!(payload["warnings"], json!([]));
    assert_eq!(gateway.sent().len(), 1);
}

#[tokio::test]
async fn add_to_board_handler_returns_bad_gateway_when_store_is_down() {
    let service = Arc::new(RecruitingService::new(engine(), Arc::new(UnavailableGateway)));

    let response = crate::competition::router::add_to_board_handler::<UnavailableGateway>(
        State(service),
        session(1),
        axum::Json(board_request(QUARTERBACK, ALABAMA)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn board_route_requires_team_header() {
    let (service, gateway) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/recruiting/board",
            None,
            &board_request(QUARTERBACK, ALABAMA),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert!(payload["error"].as_str().unwrap().contains(TEAM_HEADER));
    assert!(gateway.sent().is_empty());
}

#[tokio::test]
async fn board_route_rejects_foreign_team() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/recruiting/board",
            Some(2),
            &board_request(QUARTERBACK, ALABAMA),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn board_route_reports_locked_cycle() {
    let (service, _) = locked_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/recruiting/board",
            Some(1),
            &board_request(QUARTERBACK, ALABAMA),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::LOCKED);
}

#[tokio::test]
async fn duplicate_board_add_is_a_conflict() {
    let (service, _) = build_service();
    service
        .add_to_board(ALABAMA, board_request(QUARTERBACK, ALABAMA))
        .expect("first add");
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/recruiting/board",
            Some(1),
            &board_request(QUARTERBACK, ALABAMA),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_promise_lists_every_message() {
    let (service, _) = build_service();
    service
        .add_to_board(ALABAMA, board_request(QUARTERBACK, ALABAMA))
        .expect("added");
    let router = router_with_service(service);
    let mut promise = promise_request(QUARTERBACK, ALABAMA, PromiseType::Wins, 150);
    promise.benchmark = Some(40.0);

    let response = router
        .oneshot(post_json("/api/v1/recruiting/promises", Some(1), &promise))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["messages"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn points_route_sets_allocation_and_warns_over_budget() {
    let (service, gateway) = build_service();
    let mut settings = service.snapshot().team_settings(LSU).unwrap().clone();
    settings.weekly_points = 10.0;
    service.register_team_settings(settings);
    let receipt = service
        .add_to_board(LSU, board_request(QUARTERBACK, LSU))
        .expect("added");
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/recruiting/points",
            Some(3),
            &json!({
                "ProfileID": receipt.profile.id,
                "FieldName": "CurrentWeeksPoints",
                "Value": 15.0,
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["result"]["profile"]["current_cycle_points"],
        json!(15.0)
    );
    assert_eq!(payload["warnings"].as_array().map(Vec::len), Some(1));
    assert_eq!(gateway.sent().len(), 2);
}

#[tokio::test]
async fn standings_route_serves_projection() {
    let (service, _) = build_service();
    for team in [ALABAMA, GEORGIA] {
        service
            .add_to_board(team, board_request(POINT_GUARD, team))
            .expect("added");
    }
    service
        .add_points(ALABAMA, POINT_GUARD, ALABAMA, 15.0)
        .expect("points");
    service
        .add_points(GEORGIA, POINT_GUARD, GEORGIA, 5.0)
        .expect("points");
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/recruiting/candidates/8/standings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let entries = payload["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["team_abbreviation"], json!("ALA"));
    assert_eq!(entries[0]["odds"], json!(1.0));
}

#[tokio::test]
async fn standings_handler_returns_not_found_for_unknown_candidate() {
    let (service, _) = build_service();

    let response = crate::competition::router::standings_handler::<MemoryGateway>(
        State(Arc::new(service)),
        Path(404),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn board_view_is_private_to_its_team() {
    let (service, _) = build_service();
    service
        .add_to_board(GEORGIA, board_request(CENTER, GEORGIA))
        .expect("added");
    let service = Arc::new(service);

    let foreign = crate::competition::router::board_view_handler::<MemoryGateway>(
        State(service.clone()),
        session(1),
        Path(2),
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);

    let own = crate::competition::router::board_view_handler::<MemoryGateway>(
        State(service),
        session(2),
        Path(2),
    )
    .await;
    assert_eq!(own.status(), StatusCode::OK);
    let payload: Value = read_json_body(own).await;
    assert_eq!(payload["entries"][0]["candidate_id"], json!(9));
    assert_eq!(payload["capacity"], json!(25));
}

fn cycle_request(headers: &[(&str, &str)], week: u32) -> Request<Body> {
    let mut builder =
        Request::put("/api/v1/recruiting/cycle").header(header::CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder
        .body(Body::from(
            serde_json::to_vec(&json!({ "State": "Locked", "Week": week })).unwrap(),
        ))
        .unwrap()
}

#[tokio::test]
async fn team_session_cannot_toggle_the_cycle() {
    let (service, _) = build_service();
    let service = Arc::new(service);

    let response = crate::competition::recruiting_router(service.clone())
        .oneshot(cycle_request(&[(TEAM_HEADER, "1")], 3))
        .await
        .expect("route executes");
    assert!(!response.status().is_success());

    let response = cycle_sync_router(service.clone(), "weekly-job-secret")
        .oneshot(cycle_request(&[(TEAM_HEADER, "1")], 3))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = cycle_sync_router(service.clone(), "weekly-job-secret")
        .oneshot(cycle_request(&[(SYNC_KEY_HEADER, "guessed")], 3))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert!(!service.cycle().is_locked());
}

#[tokio::test]
async fn sync_key_locks_the_cycle() {
    let (service, _) = build_service();
    let service = Arc::new(service);

    let response = cycle_sync_router(service.clone(), "weekly-job-secret")
        .oneshot(cycle_request(&[(SYNC_KEY_HEADER, "weekly-job-secret")], 3))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["state"], json!("Locked"));
    assert_eq!(payload["week"], json!(3));
    assert!(service.cycle().is_locked());
}

#[tokio::test]
async fn remove_route_is_idempotent() {
    let (service, gateway) = build_service();
    service
        .add_to_board(ALABAMA, board_request(QUARTERBACK, ALABAMA))
        .expect("added");
    let service = Arc::new(service);
    let body = json!({ "CandidateID": 7, "ProfileID": 1 });

    for expected in [true, false] {
        let response = crate::competition::recruiting_router(service.clone())
            .oneshot(post_json("/api/v1/recruiting/board/remove", Some(1), &body))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["removed"], json!(expected));
    }
    assert_eq!(gateway.sent().len(), 2);
}
