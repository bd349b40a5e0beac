//! Per-item enrichment step.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use batchline_core::{LOYALTY_OFF, ProductRecord};

use crate::cache::EnrichmentCache;
use crate::metrics::RunMetrics;
use crate::store::{ProductStore, StoreError};

/// Error that aborts an item, and with it the run.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// Loyalty lookup failed in a way that is neither a missing row nor a
    /// transient store condition.
    #[error("loyalty lookup failed for sku {sku}: {source}")]
    Lookup {
        sku: i64,
        #[source]
        source: StoreError,
    },
}

/// How loyalty data was resolved for one sku.
enum Resolved {
    /// Served from this run's cache.
    Cached(String),
    /// Fetched from the store on a cache miss.
    Fetched(String),
    /// No row, transient failure, or timeout: use the off-marker.
    Fallback,
}

/// Enriches one record at a time against a per-run cache.
///
/// Owns the run's [`EnrichmentCache`] and per-run tallies; cumulative
/// counters go to the shared [`RunMetrics`].
pub struct ItemEnricher {
    cache: EnrichmentCache,
    store: Arc<dyn ProductStore>,
    metrics: Arc<RunMetrics>,
    lookup_timeout: Duration,
    processed: AtomicU64,
    updated: AtomicU64,
}

impl ItemEnricher {
    pub fn new(store: Arc<dyn ProductStore>, metrics: Arc<RunMetrics>, lookup_timeout: Duration) -> Self {
        Self {
            cache: EnrichmentCache::new(),
            store,
            metrics,
            lookup_timeout,
            processed: AtomicU64::new(0),
            updated: AtomicU64::new(0),
        }
    }

    /// Items enriched by this run so far.
    pub fn items_processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Items of this run whose sku had a real loyalty row.
    pub fn items_updated(&self) -> u64 {
        self.updated.load(Ordering::Relaxed)
    }

    /// Distinct skus cached by this run so far.
    pub fn cached_skus(&self) -> usize {
        self.cache.len()
    }

    /// Produce the enriched copy of `record`.
    ///
    /// A missing loyalty row, a transient lookup failure, or a lookup timeout
    /// falls back to [`LOYALTY_OFF`]; only a non-transient store failure
    /// aborts the item.
    pub async fn process(&self, record: &ProductRecord) -> Result<ProductRecord, EnrichError> {
        let resolved = match self.resolve(record.sku).await {
            Ok(resolved) => resolved,
            Err(err) => {
                self.metrics.record_failed();
                return Err(err);
            }
        };

        let updated = !matches!(resolved, Resolved::Fallback);
        let payload = match resolved {
            Resolved::Cached(data) | Resolved::Fetched(data) => data,
            Resolved::Fallback => LOYALTY_OFF.to_string(),
        };

        let enriched = record.with_payload(payload);

        self.processed.fetch_add(1, Ordering::Relaxed);
        self.metrics.record_processed();
        if updated {
            self.updated.fetch_add(1, Ordering::Relaxed);
            self.metrics.record_updated();
        }

        debug!(sku = record.sku, updated, "enriched record");
        Ok(enriched)
    }

    async fn resolve(&self, sku: i64) -> Result<Resolved, EnrichError> {
        if let Some(data) = self.cache.get(sku) {
            return Ok(Resolved::Cached(data));
        }

        match tokio::time::timeout(self.lookup_timeout, self.store.fetch_loyalty(sku)).await {
            Ok(Ok(Some(row))) => {
                self.cache.put(sku, row.data.clone());
                Ok(Resolved::Fetched(row.data))
            }
            Ok(Ok(None)) => {
                // The miss is not cached: a row appearing later in the run is
                // still picked up, at the cost of re-querying every time.
                debug!(sku, "no loyalty row");
                Ok(Resolved::Fallback)
            }
            Ok(Err(err)) if err.is_transient() => {
                warn!(sku, error = %err, "transient loyalty lookup failure, using fallback");
                Ok(Resolved::Fallback)
            }
            Ok(Err(source)) => Err(EnrichError::Lookup { sku, source }),
            Err(_) => {
                warn!(sku, timeout_ms = self.lookup_timeout.as_millis() as u64, "loyalty lookup timed out, using fallback");
                Ok(Resolved::Fallback)
            }
        }
    }
}
