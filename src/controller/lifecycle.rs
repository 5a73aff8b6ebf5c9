//! Controller lifecycle state machine.
//!
//! # States
//! ```text
//! Created → StateSeeded → Rendering → Rendered → Active → Destroyed
//!                                             └──────────→ Destroyed
//! any state ──────────────────────────────────────────────→ Destroyed
//! ```
//!
//! # Design Decisions
//! - Active controllers re-render in place without leaving `Active`
//! - Destroyed is terminal and reachable from every state, so failed or
//!   abandoned renders can always tear down

use std::fmt;

use thiserror::Error;

use crate::controller::ControllerError;
use crate::context::PreloadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Created,
    StateSeeded,
    Rendering,
    Rendered,
    Active,
    Destroyed,
}

impl LifecycleState {
    /// Whether `self → next` is a legal transition.
    pub fn can_transition(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Created, StateSeeded)
                | (StateSeeded, Rendering)
                | (Rendering, Rendered)
                | (Rendered, Active)
                | (Created | StateSeeded | Rendering | Rendered | Active, Destroyed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Created => "created",
            LifecycleState::StateSeeded => "state_seeded",
            LifecycleState::Rendering => "rendering",
            LifecycleState::Rendered => "rendered",
            LifecycleState::Active => "active",
            LifecycleState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while driving a controller through its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("invalid lifecycle transition {from} → {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("initial state resolution failed: {0}")]
    InitialState(ControllerError),

    #[error("preload collection failed: {0}")]
    Preload(ControllerError),

    #[error(transparent)]
    PreloadSealed(#[from] PreloadError),
}
