//! `batchline-pipeline` — batch run execution.
//!
//! The run path: an orchestrator builds run parameters, reads an input batch,
//! enriches each record against a per-run cache with a fixed fallback, writes
//! the enriched batch back, and reports lifecycle + metrics through a
//! completion listener.

pub mod cache;
pub mod enricher;
pub mod listener;
pub mod metrics;
pub mod orchestrator;
pub mod run;
pub mod store;

pub use cache::EnrichmentCache;
pub use enricher::{EnrichError, ItemEnricher};
pub use listener::{JobCompletionListener, RunListener};
pub use metrics::{MetricsSnapshot, RunMetrics};
pub use orchestrator::{JobOrchestrator, RunConfig, RunError};
pub use run::{RunContext, RunParameters, RunStatus, RunSummary};
pub use store::{InMemoryProductStore, ProductStore, StoreError};
