//! View engine bridge.
//!
//! # Data Flow
//! ```text
//! Controller::view()
//!     → View<T> (nothing | pre-serialized html | opaque tree)
//!     → server.rs: ServerRenderer → ChunkSink → text or chunk stream
//!     → client.rs: DomContainer → hydrate (first render over server markup)
//!                               → mount (every later render)
//!
//! On render failure (both strategies):
//!     → Controller error_did_catch(error, View)   (observational)
//!     → Controller get_view_fallback(View)        (substitutes the tree)
//!     → no fallback: error propagates to the host
//! ```
//!
//! # Design Decisions
//! - The bridge never looks inside a tree; renderers are injected
//! - Per-render interception lives in `RenderScope`, passed by reference,
//!   so concurrent renders cannot observe each other
//! - A fallback view gets no fallback of its own

pub mod client;
pub mod scope;
pub mod server;

use std::fmt;

use thiserror::Error;

use crate::controller::Controller;

pub use client::{Attach, ClientViewEngine, DomContainer};
pub use scope::{ChunkSink, RenderScope};
pub use server::{RenderMode, ServerOutput, ServerRenderer, ServerViewEngine};

/// Output of a controller's view producer.
#[derive(Debug, Clone, PartialEq)]
pub enum View<T> {
    /// Nothing to render.
    Empty,
    /// Markup that is already serialized.
    Html(String),
    /// An opaque tree handed to the injected renderer.
    Tree(T),
}

impl<T> View<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, View::Empty)
    }
}

impl<T> From<Option<T>> for View<T> {
    fn from(tree: Option<T>) -> Self {
        tree.map(View::Tree).unwrap_or(View::Empty)
    }
}

/// Where in the render protocol a failure was caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorPhase {
    View,
}

impl ErrorPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPhase::View => "view",
        }
    }
}

impl fmt::Display for ErrorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while turning a view into output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The renderer rejected the tree.
    #[error("view render failed: {0}")]
    View(String),

    /// The DOM target could not be used.
    #[error("render target unavailable: {0}")]
    Target(String),

    /// The transport closed before rendering finished.
    #[error("render aborted: transport closed")]
    Aborted,
}

impl RenderError {
    pub fn view(message: impl Into<String>) -> Self {
        RenderError::View(message.into())
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, RenderError::Aborted)
    }
}

/// Offer a render failure to the controller.
///
/// Capture runs first, then the fallback provider. Returns the fallback view,
/// or the original error when the controller has none.
pub(crate) fn recover<T>(
    controller: &Controller<T>,
    error: RenderError,
    phase: ErrorPhase,
) -> Result<View<T>, RenderError> {
    tracing::warn!(
        controller = controller.name(),
        phase = %phase,
        error = %error,
        "View render failed"
    );

    controller.error_did_catch(&error, phase);

    match controller.view_fallback(phase) {
        Some(fallback) => {
            tracing::debug!(controller = controller.name(), "Rendering fallback view");
            Ok(fallback)
        }
        None => Err(error),
    }
}
