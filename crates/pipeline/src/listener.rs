//! Run lifecycle listener.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::metrics::RunMetrics;
use crate::run::{RunContext, RunStatus};
use crate::store::ProductStore;

/// Hook invoked by the orchestrator around every run.
#[async_trait]
pub trait RunListener: Send + Sync {
    async fn before_run(&self, ctx: &RunContext);
    async fn after_run(&self, ctx: &RunContext);
}

/// Production listener: records run duration and, after a successful run,
/// reads back the most recently written records for verification.
pub struct JobCompletionListener {
    store: Arc<dyn ProductStore>,
    metrics: Arc<RunMetrics>,
    verify_limit: u32,
}

impl JobCompletionListener {
    pub const DEFAULT_VERIFY_LIMIT: u32 = 5;

    pub fn new(store: Arc<dyn ProductStore>, metrics: Arc<RunMetrics>) -> Self {
        Self {
            store,
            metrics,
            verify_limit: Self::DEFAULT_VERIFY_LIMIT,
        }
    }

    pub fn with_verify_limit(mut self, limit: u32) -> Self {
        self.verify_limit = limit;
        self
    }
}

#[async_trait]
impl RunListener for JobCompletionListener {
    async fn before_run(&self, ctx: &RunContext) {
        info!(run_id = %ctx.params.run_id, "starting batch run");
    }

    async fn after_run(&self, ctx: &RunContext) {
        let duration = ctx.duration().to_std().unwrap_or_default();
        self.metrics.record_duration(duration);

        if ctx.status == RunStatus::Completed {
            info!(
                run_id = %ctx.params.run_id,
                duration_ms = duration.as_millis() as u64,
                "run completed, verifying results"
            );

            // The read-back is observability only; it never changes the
            // run's reported status.
            match self.store.recent(self.verify_limit).await {
                Ok(records) => {
                    for record in &records {
                        info!(run_id = %ctx.params.run_id, record = ?record, "found record in store");
                    }
                }
                Err(err) => {
                    warn!(run_id = %ctx.params.run_id, error = %err, "verification read failed");
                }
            }
        } else {
            warn!(
                run_id = %ctx.params.run_id,
                status = ?ctx.status,
                duration_ms = duration.as_millis() as u64,
                "run finished with non-completed status"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use batchline_core::{LoyaltyRecord, ProductRecord, TraceContext};

    use super::*;
    use crate::run::RunParameters;
    use crate::store::{InMemoryProductStore, StoreError};

    fn finished_context(status: RunStatus) -> RunContext {
        let mut ctx = RunContext::start(RunParameters::new(&TraceContext::empty()));
        ctx.finish(status);
        ctx
    }

    #[tokio::test]
    async fn completed_run_records_duration_and_reads_back() {
        let store = Arc::new(InMemoryProductStore::new());
        let metrics = Arc::new(RunMetrics::new());
        let listener = JobCompletionListener::new(store.clone(), metrics.clone());

        listener.after_run(&finished_context(RunStatus::Completed)).await;

        assert_eq!(store.recent_calls(), 1);
        assert_eq!(metrics.snapshot().job_execution_duration_count, 1);
    }

    #[tokio::test]
    async fn failed_run_records_duration_but_skips_read_back() {
        let store = Arc::new(InMemoryProductStore::new());
        let metrics = Arc::new(RunMetrics::new());
        let listener = JobCompletionListener::new(store.clone(), metrics.clone());

        listener.after_run(&finished_context(RunStatus::Failed)).await;

        assert_eq!(store.recent_calls(), 0);
        assert_eq!(metrics.snapshot().job_execution_duration_count, 1);
    }

    struct BrokenRecent;

    #[async_trait]
    impl ProductStore for BrokenRecent {
        async fn read_batch(&self, _limit: u32) -> Result<Vec<ProductRecord>, StoreError> {
            Ok(Vec::new())
        }

        async fn fetch_loyalty(&self, _sku: i64) -> Result<Option<LoyaltyRecord>, StoreError> {
            Ok(None)
        }

        async fn write_enriched(&self, _records: &[ProductRecord]) -> Result<(), StoreError> {
            Ok(())
        }

        async fn recent(&self, _limit: u32) -> Result<Vec<ProductRecord>, StoreError> {
            Err(StoreError::Unavailable("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn verification_failure_is_swallowed() {
        let metrics = Arc::new(RunMetrics::new());
        let listener = JobCompletionListener::new(Arc::new(BrokenRecent), metrics.clone());

        let ctx = finished_context(RunStatus::Completed);
        listener.after_run(&ctx).await;

        // Still Completed, duration still recorded.
        assert_eq!(ctx.status, RunStatus::Completed);
        assert_eq!(metrics.snapshot().job_execution_duration_count, 1);
    }
}
