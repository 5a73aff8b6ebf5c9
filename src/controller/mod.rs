//! Controllers: capability records and their live instances.
//!
//! # Data Flow
//! ```text
//! Loader → &'static ControllerDef<T>          (what the controller can do)
//!     → Controller::new(def, Location, Context)   CREATED
//!     → seed(snapshot?)                           STATE_SEEDED
//!     → begin_render() → View<T>                  RENDERING
//!     → finish_render()                           RENDERED
//!     → activate() (client)                       ACTIVE
//!     → destroy() / drop                          DESTROYED
//! ```
//!
//! # Design Decisions
//! - A controller definition is a plain record of function pointers; every
//!   optional capability is an `Option` checked at one extension point
//! - Definitions are `'static` and built with `const fn`, so route tables can
//!   enumerate them at startup
//! - An instance owns exactly one `Store` and tears it down on drop

pub mod instance;
pub mod lifecycle;
pub mod loader;

use futures_util::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;

use crate::context::{Context, Preload};
use crate::routing::Location;
use crate::store::Action;
use crate::view::{ErrorPhase, RenderError, View};

pub use instance::Controller;
pub use lifecycle::{LifecycleError, LifecycleState};
pub use loader::{LoadError, LoadFuture, Loader};

/// Error raised by controller-supplied code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ControllerError {
    message: String,
}

impl ControllerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Asynchronous initial-state resolver.
pub type ResolveFn =
    for<'a> fn(&'a Location, &'a Context) -> BoxFuture<'a, Result<Value, ControllerError>>;

/// Asynchronous preload collector, run on the server before state seeding.
pub type PreloadFn =
    for<'a> fn(&'a Location, &'a Context) -> BoxFuture<'a, Result<Preload, ControllerError>>;

/// How a controller produces its first state.
#[derive(Clone, Copy)]
pub enum InitialState {
    /// A fixed value.
    Value(fn() -> Value),
    /// Computed synchronously from the location and context.
    Compute(fn(&Location, &Context) -> Result<Value, ControllerError>),
    /// Resolved asynchronously.
    Resolve(ResolveFn),
}

fn empty_state() -> Value {
    Value::Object(Default::default())
}

/// The capability record of a controller.
pub struct ControllerDef<T: 'static> {
    pub name: &'static str,
    /// Render on the server; `false` answers with the client-only shell.
    pub ssr: bool,
    pub initial_state: InitialState,
    pub actions: &'static [Action],
    pub preload: Option<PreloadFn>,
    pub view: fn(&Controller<T>) -> View<T>,
    pub error_did_catch: Option<fn(&Controller<T>, &RenderError, ErrorPhase)>,
    pub get_view_fallback: Option<fn(&Controller<T>, ErrorPhase) -> View<T>>,
    /// Client only: called once the controller becomes active.
    pub did_mount: Option<fn(&Controller<T>)>,
    pub destroy: Option<fn(&Controller<T>)>,
}

impl<T: 'static> ControllerDef<T> {
    /// A server-rendered controller with an empty initial state and no hooks.
    pub const fn new(name: &'static str, view: fn(&Controller<T>) -> View<T>) -> Self {
        Self {
            name,
            ssr: true,
            initial_state: InitialState::Value(empty_state),
            actions: &[],
            preload: None,
            view,
            error_did_catch: None,
            get_view_fallback: None,
            did_mount: None,
            destroy: None,
        }
    }

    pub const fn client_only(mut self) -> Self {
        self.ssr = false;
        self
    }

    pub const fn initial_state(mut self, initial_state: InitialState) -> Self {
        self.initial_state = initial_state;
        self
    }

    pub const fn actions(mut self, actions: &'static [Action]) -> Self {
        self.actions = actions;
        self
    }

    pub const fn preload(mut self, preload: PreloadFn) -> Self {
        self.preload = Some(preload);
        self
    }

    pub const fn on_error(mut self, hook: fn(&Controller<T>, &RenderError, ErrorPhase)) -> Self {
        self.error_did_catch = Some(hook);
        self
    }

    pub const fn fallback(mut self, provider: fn(&Controller<T>, ErrorPhase) -> View<T>) -> Self {
        self.get_view_fallback = Some(provider);
        self
    }

    pub const fn on_mount(mut self, hook: fn(&Controller<T>)) -> Self {
        self.did_mount = Some(hook);
        self
    }

    pub const fn on_destroy(mut self, hook: fn(&Controller<T>)) -> Self {
        self.destroy = Some(hook);
        self
    }
}

impl<T: 'static> std::fmt::Debug for ControllerDef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerDef")
            .field("name", &self.name)
            .field("ssr", &self.ssr)
            .field("actions", &self.actions)
            .field("preload", &self.preload.is_some())
            .field("error_did_catch", &self.error_did_catch.is_some())
            .field("get_view_fallback", &self.get_view_fallback.is_some())
            .finish()
    }
}
