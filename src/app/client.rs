//! Client side of the isomorphic runtime.
//!
//! # Data Flow
//! ```text
//! bootstrap(routes, document, container, url)
//!     → PayloadSource: payload (state snapshot, settings) + preload markers
//!     → resolve(url) → Context::for_client(preload) → Loader::load
//!     → Controller::new → seed(snapshot) → render (hydrate) → activate
//!
//! run_task(f)
//!     → f(controller) dispatches
//!     → Store::flush (one notification) → re-render (mount)
//!
//! navigate(url)
//!     → destroy active controller
//!     → resolve → Context::for_client(no preload) → fresh state → mount
//! ```
//!
//! # Design Decisions
//! - One active controller per page view, reachable through `controller()`
//! - The batching window is one task: `run_task` flushes the store once
//!   after the task body returns

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::context::{Context, Preload, Settings};
use crate::controller::Controller;
use crate::error::RuntimeError;
use crate::hydration::PayloadSource;
use crate::routing::{RouteMatch, RouteTableHandle};
use crate::view::{Attach, ClientViewEngine, DomContainer};

/// The browser-side application: one container, one active controller.
pub struct ClientApp<T: 'static, C: DomContainer<T>> {
    routes: RouteTableHandle<T>,
    settings: Settings,
    container: C,
    engine: ClientViewEngine,
    active: Option<Controller<T>>,
    changed: Arc<AtomicBool>,
}

impl<T: 'static, C: DomContainer<T>> ClientApp<T, C> {
    /// Boot from a server document (or a client-only shell).
    pub async fn bootstrap(
        routes: RouteTableHandle<T>,
        document: &impl PayloadSource,
        container: C,
        url: &str,
    ) -> Result<(Self, Attach), RuntimeError> {
        let payload = document.payload()?.unwrap_or_default();
        let preload = document.preload();
        let server_rendered = payload.is_server_rendered();

        let mut settings = payload.settings;
        if settings.public_path.is_empty() {
            settings.public_path = payload.public_path;
        }

        tracing::debug!(url, server_rendered, preload = preload.len(), "Client bootstrap");

        let mut app = Self {
            routes,
            settings,
            container,
            engine: ClientViewEngine::new(server_rendered),
            active: None,
            changed: Arc::new(AtomicBool::new(false)),
        };
        let attach = app.activate(url, payload.state, Some(preload)).await?;
        Ok((app, attach))
    }

    /// Replace the active controller with the one for `url`.
    pub async fn navigate(&mut self, url: &str) -> Result<Attach, RuntimeError> {
        if let Some(previous) = self.active.take() {
            previous.destroy();
        }
        self.activate(url, None, None).await
    }

    /// Run one task against the active controller, then deliver the
    /// batched notification and re-render if the state changed.
    ///
    /// Returns `None` when there is no active controller.
    pub fn run_task<R>(&mut self, task: impl FnOnce(&Controller<T>) -> R) -> Result<Option<(R, Attach)>, RuntimeError> {
        let Some(controller) = self.active.as_ref() else {
            return Ok(None);
        };

        let output = task(controller);
        controller.store().flush();

        let attach = if self.changed.swap(false, Ordering::SeqCst) {
            self.render_active()?
        } else {
            Attach::Skipped
        };
        Ok(Some((output, attach)))
    }

    /// The active controller.
    pub fn controller(&self) -> Option<&Controller<T>> {
        self.active.as_ref()
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    async fn activate(
        &mut self,
        url: &str,
        snapshot: Option<Value>,
        preload: Option<Preload>,
    ) -> Result<Attach, RuntimeError> {
        let table = self.routes.snapshot();
        let (location, route) = match table.resolve(url, &self.settings.basename) {
            RouteMatch::Matched { location, route } => (location, route),
            RouteMatch::Unmatched(raw) => return Err(RuntimeError::RouteUnmatched(raw.raw)),
        };

        let context = Arc::new(Context::for_client(&self.settings, preload));
        let def = route.loader().load(&location, &context).await?;
        let controller = Controller::new(def, location, context);
        controller.seed(snapshot).await?;

        let changed = self.changed.clone();
        controller.store().subscribe(move |_| changed.store(true, Ordering::SeqCst));

        self.active = Some(controller);
        let attach = self.render_active();
        match attach {
            Ok(attach) => {
                if let Some(controller) = &self.active {
                    controller.activate()?;
                }
                Ok(attach)
            }
            Err(error) => {
                self.active = None;
                Err(error)
            }
        }
    }

    fn render_active(&mut self) -> Result<Attach, RuntimeError> {
        let Some(controller) = self.active.as_ref() else {
            return Ok(Attach::Skipped);
        };

        let view = controller.begin_render()?;
        let attach = self.engine.render(view, controller, &mut self.container)?;
        controller.finish_render()?;
        tracing::debug!(controller = controller.name(), attach = ?attach, "Client render");
        Ok(attach)
    }
}
