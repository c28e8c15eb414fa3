use crate::cli::ServeArgs;
use crate::infra::{load_engine, AppState, InMemoryMutationGateway};
use crate::routes::with_recruiting_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use franchise_recruiting::competition::RecruitingService;
use franchise_recruiting::config::AppConfig;
use franchise_recruiting::error::AppError;
use franchise_recruiting::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = load_engine(&config.engine, args.ledger.as_deref())?;
    info!(
        candidates = engine.candidates().count(),
        profiles = engine.ledger().len(),
        "competition engine hydrated"
    );
    let gateway = Arc::new(InMemoryMutationGateway::default());
    let recruiting_service = Arc::new(RecruitingService::new(engine, gateway));

    if config.sync.key.is_none() {
        warn!("RECRUIT_SYNC_KEY is not set; cycle state route is disabled");
    }
    let app = with_recruiting_routes(recruiting_service, config.sync.key.as_deref())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "recruiting service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
