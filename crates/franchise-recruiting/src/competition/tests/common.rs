use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::competition::domain::{
    Candidate, CandidateId, CandidateStatus, League, Market, ProfileId, PromiseType, TeamId,
    TeamIdentity, TeamProfile,
};
use crate::competition::engine::CompetitionEngine;
use crate::competition::gateway::{GatewayError, MutationGateway};
use crate::competition::modifiers::{ModifierTable, SeasonOutlook};
use crate::competition::requests::{AddToBoardRequest, Mutation, PromiseRequest};
use crate::competition::service::RecruitingService;
use crate::competition::{recruiting_router, CycleState};
use crate::config::EngineConfig;

pub(super) const ALABAMA: TeamId = TeamId(1);
pub(super) const GEORGIA: TeamId = TeamId(2);
pub(super) const LSU: TeamId = TeamId(3);

pub(super) const QUARTERBACK: CandidateId = CandidateId(7);
pub(super) const POINT_GUARD: CandidateId = CandidateId(8);
pub(super) const CENTER: CandidateId = CandidateId(9);

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 6, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn team(id: TeamId) -> TeamIdentity {
    let abbreviation = match id.0 {
        1 => "ALA",
        2 => "UGA",
        3 => "LSU",
        _ => "IND",
    };
    TeamIdentity {
        id,
        abbreviation: abbreviation.to_string(),
    }
}

pub(super) fn candidate(id: CandidateId, league: League) -> Candidate {
    Candidate {
        id,
        name: format!("Prospect {}", id.0),
        league,
        market: Market::Recruiting,
        position: "QB".to_string(),
        archetype: "Field General".to_string(),
        stars: 4,
        origin_team: None,
        status: CandidateStatus::Uncommitted,
        home_state: Some("TX".to_string()),
        country: "USA".to_string(),
        is_redshirting: false,
        potential_grade: Some("A-".to_string()),
    }
}

/// Three teams plus a football, a basketball, and a hockey candidate.
pub(super) fn engine() -> CompetitionEngine {
    engine_with_modifiers(ModifierTable::default())
}

pub(super) fn engine_with_modifiers(table: ModifierTable) -> CompetitionEngine {
    let mut engine =
        CompetitionEngine::with_modifiers(EngineConfig::default(), table, SeasonOutlook::default());
    for id in [ALABAMA, GEORGIA, LSU] {
        engine.register_team(team(id));
    }
    engine.register_candidate(candidate(QUARTERBACK, League::CollegeFootball));
    engine.register_candidate(candidate(POINT_GUARD, League::CollegeBasketball));
    engine.register_candidate(candidate(CENTER, League::CollegeHockey));
    engine
}

pub(super) fn board_request(candidate: CandidateId, team: TeamId) -> AddToBoardRequest {
    AddToBoardRequest {
        candidate_id: candidate,
        profile_id: team,
        candidate_snapshot: None,
    }
}

pub(super) fn promise_request(
    candidate: CandidateId,
    team: TeamId,
    promise_type: PromiseType,
    weight: u32,
) -> PromiseRequest {
    PromiseRequest {
        candidate_id: candidate,
        promise_type,
        promise_weight: weight,
        benchmark: None,
        benchmark_str: None,
        is_active: true,
        team_id: team,
    }
}

/// Load an authoritative row with the given running total.
pub(super) fn seed_total(
    engine: &mut CompetitionEngine,
    id: u64,
    candidate: CandidateId,
    team_id: TeamId,
    total: f64,
) {
    engine.restore_profile(
        TeamProfile {
            id: ProfileId(id),
            candidate_id: candidate,
            team: team(team_id),
            total_points: total,
            current_cycle_points: 0.0,
            removed_from_board: false,
            scholarship_offered: false,
            scholarship_revoked: false,
            scouted: BTreeSet::new(),
            updated_at: now(),
        },
        now(),
    );
}

/// Gateway recording forwarded mutations; can be switched to refuse them.
#[derive(Default, Clone)]
pub(super) struct MemoryGateway {
    sent: Arc<Mutex<Vec<Mutation>>>,
    rejecting: Arc<AtomicBool>,
}

impl MemoryGateway {
    pub(super) fn sent(&self) -> Vec<Mutation> {
        self.sent.lock().expect("gateway mutex poisoned").clone()
    }

    pub(super) fn reject_writes(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }
}

impl MutationGateway for MemoryGateway {
    fn send(&self, mutation: &Mutation) -> Result<(), GatewayError> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected(mutation.label().to_string()));
        }
        self.sent
            .lock()
            .expect("gateway mutex poisoned")
            .push(mutation.clone());
        Ok(())
    }
}

pub(super) struct UnavailableGateway;

impl MutationGateway for UnavailableGateway {
    fn send(&self, _mutation: &Mutation) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("store offline".to_string()))
    }
}

pub(super) fn build_service() -> (RecruitingService<MemoryGateway>, Arc<MemoryGateway>) {
    let gateway = Arc::new(MemoryGateway::default());
    let service = RecruitingService::new(engine(), gateway.clone());
    (service, gateway)
}

pub(super) fn locked_service() -> (RecruitingService<MemoryGateway>, Arc<MemoryGateway>) {
    let mut engine = engine();
    engine.apply_cycle_state(CycleState::Locked, 4, now());
    let gateway = Arc::new(MemoryGateway::default());
    (RecruitingService::new(engine, gateway.clone()), gateway)
}

pub(super) fn router_with_service(service: RecruitingService<MemoryGateway>) -> axum::Router {
    recruiting_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
