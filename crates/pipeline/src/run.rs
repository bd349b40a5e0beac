//! Run lifecycle types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use batchline_core::{RunId, TraceContext};

/// Parameters of one triggered run.
///
/// `run_id` is UUIDv7 and `requested_at` is stamped at trigger time, so two
/// triggers are never the same run even when fired back to back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParameters {
    pub run_id: RunId,
    pub requested_at: DateTime<Utc>,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
}

impl RunParameters {
    pub fn new(trace: &TraceContext) -> Self {
        Self {
            run_id: RunId::new(),
            requested_at: Utc::now(),
            trace_id: trace.trace_id.clone(),
            span_id: trace.span_id.clone(),
        }
    }
}

/// Run execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

/// Mutable state of a run, from trigger to completion report.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub params: RunParameters,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunContext {
    pub fn start(params: RunParameters) -> Self {
        Self {
            params,
            status: RunStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration; zero while the run is still in flight.
    pub fn duration(&self) -> chrono::Duration {
        match self.finished_at {
            Some(end) => end - self.started_at,
            None => chrono::Duration::zero(),
        }
    }
}

/// Outcome reported back to the trigger endpoint on success.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub items_processed: usize,
    pub items_updated: usize,
}

impl core::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "batch run {} completed: {} items processed, {} updated",
            self.run_id, self.items_processed, self.items_updated
        )
    }
}
