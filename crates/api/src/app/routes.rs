//! HTTP routes and handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
};
use tracing::{error, info};

use batchline_core::TraceContext;
use batchline_pipeline::MetricsSnapshot;

use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/run-batch", post(run_batch))
        .route("/api/status", get(status))
        .route("/api/metrics", get(metrics))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// POST /api/run-batch — trigger one run and block until it finishes.
///
/// Always answers plain text: failures are rendered as an `Error: ...`
/// message rather than a structured status, so nothing propagates past this
/// boundary.
pub async fn run_batch(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(trace): Extension<TraceContext>,
) -> String {
    info!("starting batch run via REST API");

    match services.orchestrator.start_run(&trace).await {
        Ok(summary) => {
            info!(run_id = %summary.run_id, "batch run completed via REST API");
            "Batch job completed successfully".to_string()
        }
        Err(err) => {
            error!(error = %err, "batch run failed via REST API");
            format!("Error: {err}")
        }
    }
}

/// GET /api/status — fixed liveness message.
pub async fn status() -> &'static str {
    info!("status check requested");
    "Batch processing service is running"
}

/// GET /api/metrics — cumulative pipeline metrics.
pub async fn metrics(Extension(services): Extension<Arc<AppServices>>) -> Json<MetricsSnapshot> {
    Json(services.metrics.snapshot())
}
