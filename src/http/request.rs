//! Request handling.
//!
//! # Responsibilities
//! - Read the request id set by the request-id layer
//! - Turn request parts into the `Transport` a server Context carries
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing (outermost layer)
//! - The body is never read: page renders only look at the head

use axum::body::Body;
use axum::http::{HeaderMap, Request};

use crate::context::{AbortSignal, Transport};

pub const X_REQUEST_ID: &str = "x-request-id";

/// The request id header value, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Origin-form URL of the request (path and query).
pub fn request_url(request: &Request<Body>) -> String {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

/// Build the transport for a page render.
pub fn transport(request: Request<Body>, abort: AbortSignal) -> Transport {
    let (parts, _body) = request.into_parts();
    Transport::new(request_id(&parts.headers), parts.method, parts.uri, parts.headers, abort)
}
