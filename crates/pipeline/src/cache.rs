//! Per-run loyalty enrichment cache.

use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory sku → loyalty-string map shared by every item of one run.
///
/// Created when a run starts and dropped with it; never persisted or shared
/// across runs. Entries are never evicted within a run. Two concurrent misses
/// for the same sku may both query the store and both insert; the second
/// insert is an idempotent overwrite of the same value.
#[derive(Debug, Default)]
pub struct EnrichmentCache {
    entries: RwLock<HashMap<i64, String>>,
}

impl EnrichmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, sku: i64) -> Option<String> {
        self.entries.read().unwrap().get(&sku).cloned()
    }

    pub fn put(&self, sku: i64, value: impl Into<String>) {
        self.entries.write().unwrap().insert(sku, value.into());
    }

    /// Number of distinct skus cached so far.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}
