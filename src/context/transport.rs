//! Server-side transport handles.
//!
//! # Responsibilities
//! - Expose the incoming request to controllers (method, uri, headers)
//! - Let controllers steer the response (status, headers, redirect)
//! - Carry the abort signal of the underlying connection
//!
//! # Design Decisions
//! - Controllers never write the body; they set directives the HTTP layer
//!   applies when it builds the response
//! - Abort is a flag checked between writes, set when the response is
//!   dropped before completion

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};

/// Set once the client connection is gone.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    aborted: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Response adjustments requested by a controller.
#[derive(Debug, Clone, Default)]
pub struct ResponseDirectives {
    pub status: Option<StatusCode>,
    pub headers: HeaderMap,
    pub redirect: Option<(StatusCode, String)>,
}

/// Shared handle through which a controller steers the response.
#[derive(Debug, Clone, Default)]
pub struct ResponseControl {
    inner: Arc<Mutex<ResponseDirectives>>,
}

impl ResponseControl {
    pub fn set_status(&self, status: StatusCode) {
        self.with(|d| d.status = Some(status));
    }

    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.with(|d| {
            d.headers.insert(name, value);
        });
    }

    /// Redirect with `302 Found`.
    pub fn redirect(&self, location: impl Into<String>) {
        self.redirect_with(StatusCode::FOUND, location);
    }

    pub fn redirect_with(&self, status: StatusCode, location: impl Into<String>) {
        let location = location.into();
        self.with(|d| d.redirect = Some((status, location)));
    }

    pub fn directives(&self) -> ResponseDirectives {
        self.with(|d| d.clone())
    }

    fn with<R>(&self, f: impl FnOnce(&mut ResponseDirectives) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

/// The request/response pair a server render runs against.
#[derive(Debug)]
pub struct Transport {
    request_id: String,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    response: ResponseControl,
    abort: AbortSignal,
}

impl Transport {
    pub fn new(
        request_id: impl Into<String>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        abort: AbortSignal,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            method,
            uri,
            headers,
            response: ResponseControl::default(),
            abort,
        }
    }

    /// A GET transport for `uri`, mostly useful in tests.
    pub fn get(request_id: impl Into<String>, uri: &str) -> Self {
        let uri = uri.parse().unwrap_or_else(|_| Uri::from_static("/"));
        Self::new(
            request_id,
            Method::GET,
            uri,
            HeaderMap::new(),
            AbortSignal::new(),
        )
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn response(&self) -> &ResponseControl {
        &self.response
    }

    pub fn abort_signal(&self) -> &AbortSignal {
        &self.abort
    }
}
