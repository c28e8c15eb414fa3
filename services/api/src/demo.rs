use crate::infra::{load_engine, InMemoryMutationGateway};
use clap::Args;
use franchise_recruiting::competition::{
    AddToBoardRequest, Candidate, CandidateId, CandidateStatus, CompetitionEngine, CycleState,
    CycleStateRequest, League, Market, PromiseRequest, PromiseType, RecruitingService,
    RecruitingServiceError, Standings, TeamId, TeamIdentity, DISPLAY_LEADER_LIMIT,
};
use franchise_recruiting::config::EngineConfig;
use franchise_recruiting::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct StandingsArgs {
    /// Ledger snapshot CSV exported from the remote store
    #[arg(long)]
    pub(crate) ledger: PathBuf,
    /// Only report this candidate
    #[arg(long)]
    pub(crate) candidate: Option<u32>,
    /// List every qualifying team instead of the leaders
    #[arg(long)]
    pub(crate) all: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Week number published when the demo locks the cycle
    #[arg(long, default_value_t = 1)]
    pub(crate) week: u32,
    /// Skip the locked-cycle portion of the demo
    #[arg(long)]
    pub(crate) skip_lock: bool,
}

pub(crate) fn run_standings_report(args: StandingsArgs) -> Result<(), AppError> {
    let StandingsArgs {
        ledger,
        candidate,
        all,
    } = args;

    let config = EngineConfig::from_env()?;
    let engine = load_engine(&config, Some(ledger.as_path()))?;
    println!(
        "Ledger snapshot {}: {} candidates, {} ledger rows",
        ledger.display(),
        engine.candidates().count(),
        engine.ledger().len()
    );

    let ids: Vec<CandidateId> = match candidate {
        Some(id) => vec![CandidateId(id)],
        None => engine.candidates().map(|candidate| candidate.id).collect(),
    };
    for id in ids {
        match engine.project(id) {
            Ok(standings) => render_standings(&engine, &standings, all),
            Err(err) => println!("\nCandidate {id}: {err}"),
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { week, skip_lock } = args;

    println!("Candidate competition demo");
    let gateway = Arc::new(InMemoryMutationGateway::default());
    let service = RecruitingService::new(demo_engine(), gateway.clone());
    let prospect = CandidateId(7);

    println!("\nWeek {week} allocations");
    for (team, points) in [(1, 20.0), (2, 14.0), (3, 9.0)] {
        let team = TeamId(team);
        report(
            "board add",
            service.add_to_board(
                team,
                AddToBoardRequest {
                    candidate_id: prospect,
                    profile_id: team,
                    candidate_snapshot: None,
                },
            ),
        );
        match service.add_points(team, prospect, team, points) {
            Ok(receipt) => {
                println!(
                    "- {} invests {:.1} (total {:.1})",
                    receipt.profile.team.abbreviation,
                    receipt.profile.current_cycle_points,
                    receipt.profile.total_points
                );
                if let Some(warning) = receipt.warning() {
                    println!("  warning: {}", warning.message());
                }
            }
            Err(err) => println!("- points refused: {err}"),
        }
    }

    report(
        "promise",
        service.save_promise(
            TeamId(3),
            PromiseRequest {
                candidate_id: prospect,
                promise_type: PromiseType::NoRedshirt,
                promise_weight: 100,
                benchmark: None,
                benchmark_str: None,
                is_active: true,
                team_id: TeamId(3),
            },
        ),
    );
    if let Some(component) = service.modifier(prospect, TeamId(3)) {
        println!(
            "- LSU modifier {:+.1} ({})",
            component.value, component.notes
        );
    }

    let engine = service.snapshot();
    match service.standings(prospect) {
        Ok(standings) => render_standings(&engine, &standings, true),
        Err(err) => println!("\nStandings unavailable: {err}"),
    }

    if !skip_lock {
        let gate = service.apply_cycle_state(CycleStateRequest {
            state: CycleState::Locked,
            week,
        });
        println!("\nCycle locked for week {} resolution", gate.week());
        if let Err(err) = service.add_points(TeamId(2), prospect, TeamId(2), 5.0) {
            println!("- late allocation refused: {err}");
        }
    }

    println!(
        "\n{} mutations forwarded to the remote store",
        gateway.mutations().len()
    );
    Ok(())
}

fn report<T>(action: &str, result: Result<T, RecruitingServiceError>) {
    if let Err(err) = result {
        println!("- {action} refused: {err}");
    }
}

pub(crate) fn render_standings(engine: &CompetitionEngine, standings: &Standings, all: bool) {
    let name = engine
        .candidate(standings.candidate_id)
        .map(|candidate| format!("{} ({})", candidate.name, candidate.league.label()))
        .unwrap_or_else(|_| standings.candidate_id.to_string());
    println!("\nStandings for {name}");

    if standings.is_empty() {
        println!("- no team has invested yet");
        return;
    }
    println!(
        "Leader {:.1} | threshold {:.1} | pool {:.1}",
        standings.top_score, standings.threshold, standings.pool_total
    );

    let limit = if all {
        standings.entries.len()
    } else {
        DISPLAY_LEADER_LIMIT
    };
    for standing in standings.leaders(limit) {
        println!(
            "- {}: {:.1} points, {:.1}% odds",
            standing.team_abbreviation,
            standing.effective_score,
            standing.odds * 100.0
        );
    }
}

fn demo_engine() -> CompetitionEngine {
    let mut engine = CompetitionEngine::new(EngineConfig::default());
    for (id, abbreviation) in [(1, "ALA"), (2, "UGA"), (3, "LSU")] {
        engine.register_team(TeamIdentity {
            id: TeamId(id),
            abbreviation: abbreviation.to_string(),
        });
    }
    engine.register_candidate(Candidate {
        id: CandidateId(7),
        name: "Marcus Hill".to_string(),
        league: League::CollegeFootball,
        market: Market::Recruiting,
        position: "QB".to_string(),
        archetype: "Scrambler".to_string(),
        stars: 5,
        origin_team: None,
        status: CandidateStatus::Uncommitted,
        home_state: Some("LA".to_string()),
        country: "USA".to_string(),
        is_redshirting: false,
        potential_grade: Some("A".to_string()),
    });
    engine
}
