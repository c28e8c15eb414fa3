use franchise_recruiting::competition::{
    CompetitionEngine, GatewayError, LedgerSnapshotImporter, Mutation, MutationGateway,
};
use franchise_recruiting::config::EngineConfig;
use franchise_recruiting::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in for the remote store: accepts every mutation and keeps it for inspection.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMutationGateway {
    mutations: Arc<Mutex<Vec<Mutation>>>,
}

impl MutationGateway for InMemoryMutationGateway {
    fn send(&self, mutation: &Mutation) -> Result<(), GatewayError> {
        let mut guard = self.mutations.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(mutation = mutation.label(), "mutation stored in memory");
        guard.push(mutation.clone());
        Ok(())
    }
}

impl InMemoryMutationGateway {
    pub(crate) fn mutations(&self) -> Vec<Mutation> {
        self.mutations.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Hydrate the engine from a ledger snapshot when one is given, otherwise start empty.
pub(crate) fn load_engine(
    config: &EngineConfig,
    ledger: Option<&Path>,
) -> Result<CompetitionEngine, AppError> {
    match ledger {
        Some(path) => {
            LedgerSnapshotImporter::from_path(path, config.clone(), chrono::Utc::now())
                .map_err(AppError::from)
        }
        None => Ok(CompetitionEngine::new(config.clone())),
    }
}
