//! Response construction.
//!
//! # Responsibilities
//! - Apply controller directives (status, headers, redirect)
//! - Deliver a page as one body or as a chunk stream
//! - Map runtime errors to status codes and a short error page
//!
//! # Design Decisions
//! - A redirect only wins when the controller rendered nothing
//! - Streamed bodies check the abort signal between chunks; dropping the
//!   body marks the render aborted

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::stream;

use crate::app::{PageStream, RenderResult};
use crate::context::ResponseDirectives;
use crate::error::RuntimeError;
use crate::view::RenderMode;

const HTML: &str = "text/html; charset=utf-8";

/// Response for a server-rendered page.
pub fn page_response<T: Send + Sync + 'static>(result: RenderResult<T>, mode: RenderMode) -> Response {
    let directives = result.directives();

    if let Some((status, location)) = directives.redirect.clone() {
        if result.content.is_empty() {
            result.complete();
            return redirect_response(status, &location);
        }
        tracing::warn!(
            controller = result.controller.name(),
            "Redirect ignored: controller rendered content"
        );
    }

    let body = match mode {
        RenderMode::String => Body::from(result.into_html()),
        RenderMode::Stream => stream_body(result.into_stream()),
    };
    with_directives(html_response(StatusCode::OK, body), directives)
}

/// Response for the client-only shell.
pub fn shell_response(html: String) -> Response {
    html_response(StatusCode::OK, Body::from(html))
}

/// Response for a failed render.
pub fn error_response(error: &RuntimeError) -> Response {
    let status = error.status_code();
    if error.is_aborted() {
        return status.into_response();
    }

    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<!DOCTYPE html><html><head><title>{code} {reason}</title></head><body><h1>{code} {reason}</h1></body></html>",
        code = status.as_u16(),
    );
    html_response(status, Body::from(body))
}

pub fn redirect_response(status: StatusCode, location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = status.into_response();
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => {
            tracing::error!(location, "Redirect target is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn stream_body<T: Send + Sync + 'static>(page: PageStream<T>) -> Body {
    let chunks = stream::unfold(page, |mut page| async move {
        page.next_chunk()
            .map(|chunk| (Ok::<_, Infallible>(Bytes::from(chunk)), page))
    });
    Body::from_stream(chunks)
}

fn html_response(status: StatusCode, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(HTML));
    response
}

fn with_directives(mut response: Response, directives: ResponseDirectives) -> Response {
    if let Some(status) = directives.status {
        *response.status_mut() = status;
    }
    for (name, value) in directives.headers.iter() {
        response.headers_mut().insert(name.clone(), value.clone());
    }
    response
}
