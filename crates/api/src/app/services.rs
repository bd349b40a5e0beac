//! Service wiring: store selection, metrics, orchestrator.

use std::sync::Arc;

use tracing::info;

use batchline_infra::PostgresProductStore;
use batchline_pipeline::{
    InMemoryProductStore, JobCompletionListener, JobOrchestrator, ProductStore, RunMetrics,
};

/// Process-wide collaborators shared by all requests.
pub struct AppServices {
    pub orchestrator: JobOrchestrator,
    pub metrics: Arc<RunMetrics>,
}

/// Wire services from the environment.
///
/// `USE_PERSISTENT_STORES=true` selects the Postgres store (requires
/// `DATABASE_URL`); anything else gets the seeded in-memory store for
/// dev/test runs.
pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    let store: Arc<dyn ProductStore> = if use_persistent {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        let store = PostgresProductStore::connect(&database_url)
            .await
            .expect("failed to connect to Postgres");
        info!("using Postgres product store");
        Arc::new(store)
    } else {
        info!("using seeded in-memory product store");
        Arc::new(InMemoryProductStore::seeded())
    };

    build_with_store(store)
}

/// Wire services over an explicit store.
pub fn build_with_store(store: Arc<dyn ProductStore>) -> AppServices {
    let metrics = Arc::new(RunMetrics::new());
    let listener = Arc::new(JobCompletionListener::new(store.clone(), metrics.clone()));
    let orchestrator = JobOrchestrator::new(store, metrics.clone(), listener);

    AppServices {
        orchestrator,
        metrics,
    }
}
