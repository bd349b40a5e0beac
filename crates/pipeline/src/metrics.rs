//! Process-wide run metrics.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Cumulative pipeline metrics, shared by all runs for the life of the
/// process.
///
/// Counters are atomics so enrichment workers and concurrent runs can
/// increment them without coordination; the duration timer is a small
/// lock-protected accumulator.
#[derive(Debug, Default)]
pub struct RunMetrics {
    processed_items: AtomicU64,
    failed_items: AtomicU64,
    enrichment_updated: AtomicU64,
    duration: Mutex<DurationTimer>,
}

#[derive(Debug, Default, Clone)]
struct DurationTimer {
    count: u64,
    total_ms: u64,
    last_ms: u64,
    max_ms: u64,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// One item made it through enrichment.
    pub fn record_processed(&self) {
        self.processed_items.fetch_add(1, Ordering::Relaxed);
    }

    /// One item aborted with a processing error.
    pub fn record_failed(&self) {
        self.failed_items.fetch_add(1, Ordering::Relaxed);
    }

    /// One item received real loyalty data (rather than the fallback).
    pub fn record_updated(&self) {
        self.enrichment_updated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one run's wall-clock duration, whatever its outcome.
    pub fn record_duration(&self, duration: Duration) {
        let ms = duration.as_millis() as u64;
        let mut timer = self.duration.lock().unwrap();
        timer.count += 1;
        timer.total_ms += ms;
        timer.last_ms = ms;
        timer.max_ms = timer.max_ms.max(ms);
    }

    /// Point-in-time view of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let timer = self.duration.lock().unwrap().clone();
        MetricsSnapshot {
            processed_items_total: self.processed_items.load(Ordering::Relaxed),
            failed_items_total: self.failed_items.load(Ordering::Relaxed),
            enrichment_updated_total: self.enrichment_updated.load(Ordering::Relaxed),
            job_execution_duration_count: timer.count,
            job_execution_duration_total_ms: timer.total_ms,
            job_execution_duration_last_ms: timer.last_ms,
            job_execution_duration_max_ms: timer.max_ms,
        }
    }
}

/// Serializable snapshot of [`RunMetrics`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub processed_items_total: u64,
    pub failed_items_total: u64,
    pub enrichment_updated_total: u64,
    pub job_execution_duration_count: u64,
    pub job_execution_duration_total_ms: u64,
    pub job_execution_duration_last_ms: u64,
    pub job_execution_duration_max_ms: u64,
}
