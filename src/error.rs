//! Top-level runtime errors.
//!
//! Every failure a render request can end in, mapped onto an HTTP status
//! for the server host.

use axum::http::StatusCode;
use thiserror::Error;

use crate::controller::{ControllerError, LifecycleError, LoadError};
use crate::hydration::HydrationError;
use crate::view::RenderError;

/// Non-standard status logged for renders whose client went away.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No route accepted the URL.
    #[error("no route matches `{0}`")]
    RouteUnmatched(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    /// The controller's initial state could not be produced.
    #[error("initial state failed: {0}")]
    InitialState(ControllerError),

    #[error(transparent)]
    Lifecycle(LifecycleError),

    /// Rendering failed and the controller had no fallback.
    #[error(transparent)]
    Render(RenderError),

    /// The transport closed before the render finished.
    #[error("render aborted")]
    Aborted,

    #[error("failed to encode hydration payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Hydration(#[from] HydrationError),
}

impl From<LifecycleError> for RuntimeError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::InitialState(cause) => RuntimeError::InitialState(cause),
            other => RuntimeError::Lifecycle(other),
        }
    }
}

impl From<RenderError> for RuntimeError {
    fn from(error: RenderError) -> Self {
        match error {
            RenderError::Aborted => RuntimeError::Aborted,
            other => RuntimeError::Render(other),
        }
    }
}

impl RuntimeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RuntimeError::RouteUnmatched(_) => StatusCode::NOT_FOUND,
            RuntimeError::Load(LoadError::Unavailable(_)) => StatusCode::NOT_FOUND,
            RuntimeError::Aborted => {
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::BAD_REQUEST)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::RouteUnmatched(_) => "route_unmatched",
            RuntimeError::Load(_) => "load_failure",
            RuntimeError::InitialState(_) => "initial_state_failure",
            RuntimeError::Lifecycle(_) => "lifecycle",
            RuntimeError::Render(_) => "render_failure",
            RuntimeError::Aborted => "aborted",
            RuntimeError::Payload(_) | RuntimeError::Hydration(_) => "hydration",
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, RuntimeError::Aborted)
    }
}
