//! Run orchestration: parameters, pipeline execution, completion reporting.

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, error, info};

use batchline_core::TraceContext;

use crate::enricher::{EnrichError, ItemEnricher};
use crate::listener::RunListener;
use crate::metrics::RunMetrics;
use crate::run::{RunContext, RunParameters, RunStatus, RunSummary};
use crate::store::{ProductStore, StoreError};

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of input records read per run.
    pub read_limit: u32,
    /// Bounded timeout applied to each loyalty lookup.
    pub lookup_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            read_limit: 100,
            lookup_timeout: Duration::from_secs(5),
        }
    }
}

/// Why a run failed to complete.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("batch read failed: {0}")]
    Read(#[source] StoreError),

    #[error("enrichment failed: {0}")]
    Enrich(#[from] EnrichError),

    #[error("batch write failed: {0}")]
    Write(#[source] StoreError),
}

/// Launches tracked batch runs.
///
/// Holds only process-wide collaborators; every run gets its own cache and
/// context, so concurrent triggers are fully isolated from each other.
pub struct JobOrchestrator {
    store: Arc<dyn ProductStore>,
    metrics: Arc<RunMetrics>,
    listener: Arc<dyn RunListener>,
    config: RunConfig,
}

impl JobOrchestrator {
    pub fn new(
        store: Arc<dyn ProductStore>,
        metrics: Arc<RunMetrics>,
        listener: Arc<dyn RunListener>,
    ) -> Self {
        Self {
            store,
            metrics,
            listener,
            config: RunConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Execute one run to completion and report the outcome.
    ///
    /// The run executes under a tracing span carrying the run id and the
    /// caller's trace ids, so every log line of the run is correlated.
    pub async fn start_run(&self, trace: &TraceContext) -> Result<RunSummary, RunError> {
        let params = RunParameters::new(trace);
        let span = tracing::info_span!(
            "batch_run",
            run_id = %params.run_id,
            trace_id = params.trace_id.as_deref().unwrap_or(""),
            span_id = params.span_id.as_deref().unwrap_or(""),
        );

        self.run_tracked(params).instrument(span).await
    }

    async fn run_tracked(&self, params: RunParameters) -> Result<RunSummary, RunError> {
        let mut ctx = RunContext::start(params);
        self.listener.before_run(&ctx).await;

        match self.execute_pipeline(&ctx).await {
            Ok(summary) => {
                ctx.finish(RunStatus::Completed);
                self.listener.after_run(&ctx).await;
                info!(run_id = %ctx.params.run_id, "{summary}");
                Ok(summary)
            }
            Err(err) => {
                ctx.finish(RunStatus::Failed);
                self.listener.after_run(&ctx).await;
                error!(run_id = %ctx.params.run_id, error = %err, "batch run failed");
                Err(err)
            }
        }
    }

    async fn execute_pipeline(&self, ctx: &RunContext) -> Result<RunSummary, RunError> {
        let enricher = ItemEnricher::new(
            self.store.clone(),
            self.metrics.clone(),
            self.config.lookup_timeout,
        );

        let input = self
            .store
            .read_batch(self.config.read_limit)
            .await
            .map_err(RunError::Read)?;
        info!(count = input.len(), "read input batch");

        let mut enriched = Vec::with_capacity(input.len());
        for record in &input {
            enriched.push(enricher.process(record).await?);
        }

        self.store
            .write_enriched(&enriched)
            .await
            .map_err(RunError::Write)?;
        info!(
            written = enriched.len(),
            cached_skus = enricher.cached_skus(),
            "wrote enriched batch"
        );

        Ok(RunSummary {
            run_id: ctx.params.run_id,
            items_processed: enricher.items_processed() as usize,
            items_updated: enricher.items_updated() as usize,
        })
    }
}
