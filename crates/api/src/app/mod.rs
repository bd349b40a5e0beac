//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection (env-driven) and pipeline wiring
//! - `routes.rs`: HTTP routes + handlers

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app() -> Router {
    let services = Arc::new(services::build_services().await);
    build_router(services)
}

/// Router over explicit services; tests inject their own store through this.
pub fn build_router(services: Arc<services::AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_middleware))
                .layer(Extension(services)),
        )
}
