//! Store seam: batch read, loyalty lookup, enriched write, verification read.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use batchline_core::{LoyaltyRecord, ProductRecord};

/// Relational-store operations the pipeline depends on.
///
/// Every call is a single best-effort attempt; retry policy is not this
/// seam's concern.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Read the input batch for a run.
    async fn read_batch(&self, limit: u32) -> Result<Vec<ProductRecord>, StoreError>;

    /// Look up the loyalty row for one sku.
    ///
    /// `Ok(None)` means no row exists — an expected outcome, not an error.
    async fn fetch_loyalty(&self, sku: i64) -> Result<Option<LoyaltyRecord>, StoreError>;

    /// Upsert enriched records.
    async fn write_enriched(&self, records: &[ProductRecord]) -> Result<(), StoreError>;

    /// Most recently written records, newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<ProductRecord>, StoreError>;
}

/// Store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Connectivity-class failure: I/O, pool exhaustion, closed pool.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A row came back in a shape that could not be decoded.
    #[error("malformed row: {0}")]
    Malformed(String),

    /// Any other query failure.
    #[error("query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// Transient failures on a single loyalty lookup are absorbed into the
    /// fallback payload; non-transient ones abort the item.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Malformed(_))
    }
}

/// In-memory store for tests and dev runs.
///
/// Counts loyalty lookups per sku and verification reads so tests can assert
/// on cache behavior and read-back ordering.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<Vec<ProductRecord>>,
    loyalty: RwLock<HashMap<i64, String>>,
    written: RwLock<Vec<ProductRecord>>,
    lookup_calls: RwLock<HashMap<i64, u64>>,
    recent_calls: AtomicU64,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<ProductRecord>) -> Self {
        let store = Self::new();
        *store.products.write().unwrap() = products;
        store
    }

    /// Small sample catalog used by the dev wiring.
    pub fn seeded() -> Self {
        let store = Self::with_products(vec![
            product(1, 1001, "espresso beans", 12),
            product(2, 1002, "filter paper", 40),
            product(3, 1001, "espresso beans", 7),
            product(4, 1003, "ceramic mug", 5),
        ]);
        store.insert_loyalty(1001, "Gold");
        store.insert_loyalty(1003, "Silver");
        store
    }

    pub fn insert_loyalty(&self, sku: i64, data: impl Into<String>) {
        self.loyalty.write().unwrap().insert(sku, data.into());
    }

    /// Total loyalty lookups across all skus.
    pub fn lookup_calls(&self) -> u64 {
        self.lookup_calls.read().unwrap().values().sum()
    }

    /// Loyalty lookups for one sku.
    pub fn lookup_calls_for(&self, sku: i64) -> u64 {
        self.lookup_calls
            .read()
            .unwrap()
            .get(&sku)
            .copied()
            .unwrap_or(0)
    }

    /// How many verification reads have been served.
    pub fn recent_calls(&self) -> u64 {
        self.recent_calls.load(Ordering::Relaxed)
    }

    /// Everything written so far, in write order.
    pub fn written(&self) -> Vec<ProductRecord> {
        self.written.read().unwrap().clone()
    }
}

fn product(id: i64, sku: i64, name: &str, amount: i64) -> ProductRecord {
    ProductRecord {
        id,
        sku,
        name: name.to_string(),
        amount,
        payload: String::new(),
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn read_batch(&self, limit: u32) -> Result<Vec<ProductRecord>, StoreError> {
        Ok(self
            .products
            .read()
            .unwrap()
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn fetch_loyalty(&self, sku: i64) -> Result<Option<LoyaltyRecord>, StoreError> {
        *self.lookup_calls.write().unwrap().entry(sku).or_insert(0) += 1;
        Ok(self
            .loyalty
            .read()
            .unwrap()
            .get(&sku)
            .map(|data| LoyaltyRecord {
                sku,
                data: data.clone(),
            }))
    }

    async fn write_enriched(&self, records: &[ProductRecord]) -> Result<(), StoreError> {
        self.written.write().unwrap().extend_from_slice(records);
        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ProductRecord>, StoreError> {
        self.recent_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .written
            .read()
            .unwrap()
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
