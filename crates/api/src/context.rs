//! Request correlation context extraction.

use axum::http::HeaderMap;

use batchline_core::TraceContext;

pub const TRACE_ID_HEADER: &str = "x-trace-id";
pub const SPAN_ID_HEADER: &str = "x-span-id";

/// Build the request's [`TraceContext`] from inbound headers.
///
/// Empty or non-UTF-8 header values are treated as absent.
pub fn trace_context_from_headers(headers: &HeaderMap) -> TraceContext {
    TraceContext::new(
        header_value(headers, TRACE_ID_HEADER),
        header_value(headers, SPAN_ID_HEADER),
    )
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn headers_map_into_the_context() {
        let mut headers = HeaderMap::new();
        headers.insert(TRACE_ID_HEADER, HeaderValue::from_static("abc123"));
        headers.insert(SPAN_ID_HEADER, HeaderValue::from_static("span-9"));

        let ctx = trace_context_from_headers(&headers);
        assert_eq!(ctx.trace_id.as_deref(), Some("abc123"));
        assert_eq!(ctx.span_id.as_deref(), Some("span-9"));
    }

    #[test]
    fn missing_headers_yield_an_empty_context() {
        let ctx = trace_context_from_headers(&HeaderMap::new());
        assert!(ctx.is_empty());
    }

    #[test]
    fn blank_header_values_are_treated_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(TRACE_ID_HEADER, HeaderValue::from_static("   "));

        let ctx = trace_context_from_headers(&headers);
        assert!(ctx.is_empty());
    }
}
