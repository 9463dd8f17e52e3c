//! Request identification.
//!
//! # Responsibilities
//! - Name the request ID header shared with upstreams
//! - Read the ID back for logging
//! - Open the per-request tracing span
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing (outermost layer)
//! - Incoming IDs are kept, so a caller's ID survives the hop

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, Request},
};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The request ID, or "unknown" if the layer has not run.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span wrapping the whole request, tagged with its ID.
pub fn request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request.headers()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_id() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");

        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }
}
