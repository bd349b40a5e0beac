//! Trace-propagation middleware.

use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use crate::context;

/// Copy trace headers into a request-scoped [`TraceContext`] extension and a
/// tracing span covering the request.
///
/// Both the extension and the span are dropped with the request, so
/// correlation ids never leak into unrelated requests sharing the worker.
///
/// [`TraceContext`]: batchline_core::TraceContext
pub async fn trace_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let trace = context::trace_context_from_headers(req.headers());

    let span = tracing::info_span!(
        "request",
        uri = %req.uri(),
        trace_id = trace.trace_id.as_deref().unwrap_or(""),
        span_id = trace.span_id.as_deref().unwrap_or(""),
    );

    req.extensions_mut().insert(trace);

    next.run(req).instrument(span).await
}
