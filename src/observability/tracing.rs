//! Render spans.

use tracing::Span;

/// Span covering one server render.
pub fn render_span(request_id: &str, url: &str) -> Span {
    tracing::info_span!("render", request_id = %request_id, url = %url, controller = tracing::field::Empty)
}

/// Record the controller a render resolved to on the current span.
pub fn record_controller(name: &str) {
    Span::current().record("controller", name);
}
