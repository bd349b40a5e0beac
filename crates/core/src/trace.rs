//! Request correlation context.

use serde::{Deserialize, Serialize};

/// Trace identifiers attached to a triggering request.
///
/// Extracted from `X-Trace-Id` / `X-Span-Id` at the HTTP boundary and passed
/// explicitly through the call chain into run parameters. The value is scoped
/// to one request; nothing is kept in process-global state, so an unrelated
/// request never observes another request's identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
}

impl TraceContext {
    pub fn new(trace_id: Option<String>, span_id: Option<String>) -> Self {
        Self { trace_id, span_id }
    }

    /// Context for a request that carried no trace headers.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.trace_id.is_none() && self.span_id.is_none()
    }
}
