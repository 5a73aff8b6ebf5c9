//! Server side of the isomorphic runtime.
//!
//! # Data Flow
//! ```text
//! render(url, transport)
//!     → RenderRegistry::begin (ticket keyed by request id)
//!     → SSR off globally: client-only shell
//!     → RouteTableHandle::snapshot → resolve(url)        (Unmatched → 404)
//!     → Context::for_server → Loader::load
//!     → controller.ssr == false: client-only shell
//!     → Controller::new → seed (preload sealed, initial state)
//!     → begin_render → ServerViewEngine::render → finish_render
//!     → DocumentLayout::document (payload + preload markers)
//!     → Page::Rendered(RenderResult)
//! ```
//!
//! The controller lives inside the `RenderResult` until the body has been
//! written or dropped; that is when it is destroyed.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::Instrument;

use crate::app::registry::{RenderOutcome, RenderRegistry, RenderTicket};
use crate::context::{AbortSignal, Context, ResponseDirectives, Settings, Transport};
use crate::controller::Controller;
use crate::error::RuntimeError;
use crate::hydration::{Document, DocumentLayout, HydrationPayload};
use crate::observability::tracing::{record_controller, render_span};
use crate::routing::{RouteMatch, RouteTableHandle};
use crate::view::{ServerOutput, ServerViewEngine};

/// The response to one page request.
pub enum Page<T: 'static> {
    /// A server-rendered document.
    Rendered(RenderResult<T>),
    /// The client-only shell.
    Shell(String),
}

impl<T: 'static> std::fmt::Debug for Page<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Page::Rendered(result) => f.debug_tuple("Rendered").field(&result.controller).finish(),
            Page::Shell(_) => f.write_str("Shell"),
        }
    }
}

/// The rendered content of one request and the controller that produced it.
pub struct RenderResult<T: 'static> {
    pub content: ServerOutput,
    pub controller: Controller<T>,
    document: Document,
    ticket: RenderTicket,
}

impl<T: 'static> RenderResult<T> {
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Response adjustments the controller requested.
    pub fn directives(&self) -> ResponseDirectives {
        self.controller
            .context()
            .transport()
            .map(|transport| transport.response().directives())
            .unwrap_or_default()
    }

    /// Complete the render without producing a body (redirects).
    pub fn complete(self) {
        self.ticket.finish(RenderOutcome::Completed);
    }

    /// The whole page as one string. Completes the render.
    pub fn into_html(self) -> String {
        let RenderResult {
            content,
            controller,
            document,
            ticket,
        } = self;
        let html = document.wrap(content.into_chunks()).concat();
        ticket.finish(RenderOutcome::Completed);
        drop(controller);
        html
    }

    /// The page as a chunk sequence for a streamed body.
    pub fn into_stream(self) -> PageStream<T> {
        let RenderResult {
            content,
            controller,
            document,
            ticket,
        } = self;
        let abort = controller.context().abort_signal().cloned().unwrap_or_default();
        PageStream {
            chunks: document.wrap(content.into_chunks()).into(),
            abort,
            ticket: Some(ticket),
            _controller: controller,
        }
    }
}

/// Remaining chunks of a streamed page.
///
/// Dropped before the last chunk (client gone), the render is recorded as
/// aborted and the abort signal is raised.
pub struct PageStream<T: 'static> {
    chunks: VecDeque<String>,
    abort: AbortSignal,
    ticket: Option<RenderTicket>,
    _controller: Controller<T>,
}

impl<T: 'static> PageStream<T> {
    /// Next chunk; `None` once the page is complete or aborted.
    pub fn next_chunk(&mut self) -> Option<String> {
        if self.abort.is_aborted() {
            self.chunks.clear();
            return None;
        }
        match self.chunks.pop_front() {
            Some(chunk) => Some(chunk),
            None => {
                if let Some(ticket) = self.ticket.take() {
                    ticket.finish(RenderOutcome::Completed);
                }
                None
            }
        }
    }

    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }
}

impl<T: 'static> Drop for PageStream<T> {
    fn drop(&mut self) {
        if self.ticket.is_some() {
            self.abort.abort();
        }
    }
}

/// Runs server renders against the current route table.
pub struct ServerApp<T: 'static> {
    routes: RouteTableHandle<T>,
    settings: Arc<Settings>,
    engine: ServerViewEngine<T>,
    layout: Arc<DocumentLayout>,
    ssr: bool,
    registry: RenderRegistry,
}

impl<T: 'static> Clone for ServerApp<T> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
            settings: self.settings.clone(),
            engine: self.engine.clone(),
            layout: self.layout.clone(),
            ssr: self.ssr,
            registry: self.registry.clone(),
        }
    }
}

impl<T: 'static> ServerApp<T> {
    pub fn new(
        routes: RouteTableHandle<T>,
        settings: Settings,
        engine: ServerViewEngine<T>,
        layout: DocumentLayout,
        ssr: bool,
    ) -> Self {
        Self {
            routes,
            settings: Arc::new(settings),
            engine,
            layout: Arc::new(layout),
            ssr,
            registry: RenderRegistry::new(),
        }
    }

    pub fn routes(&self) -> &RouteTableHandle<T> {
        &self.routes
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &RenderRegistry {
        &self.registry
    }

    pub fn ssr_enabled(&self) -> bool {
        self.ssr
    }

    /// Render `url` against `transport`.
    pub async fn render(&self, url: &str, transport: Transport) -> Result<Page<T>, RuntimeError> {
        let span = render_span(transport.request_id(), url);
        let ticket = self.registry.begin(transport.request_id(), url);

        match self.render_page(url, transport, &ticket).instrument(span).await {
            Ok(Some((content, controller, document))) => Ok(Page::Rendered(RenderResult {
                content,
                controller,
                document,
                ticket,
            })),
            Ok(None) => {
                let shell = self.layout.shell(&self.settings);
                ticket.finish(if shell.is_ok() {
                    RenderOutcome::Completed
                } else {
                    RenderOutcome::Errored
                });
                Ok(Page::Shell(shell?))
            }
            Err(error) => {
                if error.is_aborted() {
                    tracing::info!(url, "Render abandoned by client");
                    ticket.finish(RenderOutcome::Aborted);
                } else {
                    tracing::warn!(url, kind = error.kind(), error = %error, "Render failed");
                    ticket.finish(RenderOutcome::Errored);
                }
                Err(error)
            }
        }
    }

    /// `None` means "answer with the shell".
    async fn render_page(
        &self,
        url: &str,
        transport: Transport,
        ticket: &RenderTicket,
    ) -> Result<Option<(ServerOutput, Controller<T>, Document)>, RuntimeError> {
        if !self.ssr {
            tracing::debug!(url, "SSR disabled, serving shell");
            return Ok(None);
        }

        let table = self.routes.snapshot();
        let (location, route) = match table.resolve(url, &self.settings.basename) {
            RouteMatch::Matched { location, route } => (location, route),
            RouteMatch::Unmatched(raw) => return Err(RuntimeError::RouteUnmatched(raw.raw)),
        };

        let context = Arc::new(Context::for_server(&self.settings, transport));
        let def = route.loader().load(&location, &context).await?;
        ticket.set_controller(def.name);
        record_controller(def.name);

        if !def.ssr {
            tracing::debug!(controller = def.name, "Controller is client-only, serving shell");
            return Ok(None);
        }

        let controller = Controller::new(def, location, context);
        controller.seed(None).await?;

        let view = controller.begin_render()?;
        let content = self
            .engine
            .render(view, &controller, controller.context().abort_signal())?;
        controller.finish_render()?;

        let state = controller.store().get_state();
        let payload = HydrationPayload::new(Some(state.as_ref().clone()), &self.settings);
        let document = self
            .layout
            .document(&payload, controller.context().preload().entries())?;

        tracing::debug!(controller = def.name, "Server render complete");
        Ok(Some((content, controller, document)))
    }
}
