//! Client render strategy.
//!
//! # Responsibilities
//! - Attach the first view to server markup (hydrate) when there is some
//! - Mount every later view fresh
//! - Apply the capture → fallback → propagate contract on failure
//!
//! # Design Decisions
//! - Hydration is consumed by the first non-empty render, whether or not
//!   the container actually held markup
//! - Fallback views are always mounted, never hydrated

use crate::controller::Controller;
use crate::view::{recover, ErrorPhase, RenderError, RenderScope, View};

/// A DOM node the client runtime renders into.
pub trait DomContainer<T> {
    /// Whether the node still holds markup produced by the server.
    fn has_server_markup(&self) -> bool;

    /// Bind to the existing markup without recreating nodes.
    fn hydrate(&mut self, view: &View<T>, scope: &RenderScope<'_>) -> Result<(), RenderError>;

    /// Replace the node's content.
    fn mount(&mut self, view: &View<T>, scope: &RenderScope<'_>) -> Result<(), RenderError>;
}

/// How a view reached the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    Hydrated,
    Mounted,
    /// The view was empty; the container was left alone.
    Skipped,
}

/// Client side of the view engine bridge.
#[derive(Debug)]
pub struct ClientViewEngine {
    hydrate_pending: bool,
}

impl ClientViewEngine {
    /// `server_rendered` is whether the document carried a state snapshot.
    pub fn new(server_rendered: bool) -> Self {
        Self {
            hydrate_pending: server_rendered,
        }
    }

    pub fn hydration_pending(&self) -> bool {
        self.hydrate_pending
    }

    /// Render `view` on behalf of `controller` into `container`.
    pub fn render<T: 'static, C: DomContainer<T>>(
        &mut self,
        view: View<T>,
        controller: &Controller<T>,
        container: &mut C,
    ) -> Result<Attach, RenderError> {
        if view.is_empty() {
            return Ok(Attach::Skipped);
        }

        let state = controller.store().get_state();
        let scope = controller.scope(&state);
        let hydrate = std::mem::take(&mut self.hydrate_pending) && container.has_server_markup();

        let attempt = if hydrate {
            container.hydrate(&view, &scope).map(|_| Attach::Hydrated)
        } else {
            container.mount(&view, &scope).map(|_| Attach::Mounted)
        };

        match attempt {
            Ok(attach) => Ok(attach),
            Err(error) => {
                let fallback = recover(controller, error, ErrorPhase::View)?;
                if fallback.is_empty() {
                    return Ok(Attach::Skipped);
                }
                container.mount(&fallback, &scope)?;
                Ok(Attach::Mounted)
            }
        }
    }
}
