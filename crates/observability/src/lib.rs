//! `batchline-observability` — process-wide tracing/logging setup.

use tracing_subscriber::EnvFilter;

/// Initialize structured logging for the process.
///
/// JSON lines with span fields, filterable via `RUST_LOG`. Safe to call
/// multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_current_span(true)
        .try_init();
}
