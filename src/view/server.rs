//! Server render strategy.
//!
//! # Responsibilities
//! - Serialize a view through the injected renderer
//! - Produce one string or a list of chunks depending on the render mode
//! - Apply the capture → fallback → propagate contract on failure
//!
//! # Design Decisions
//! - Aborts are not offered to controller hooks; they are not render bugs
//! - Renderers are synchronous, so `Stream` mode renders the whole view into
//!   memory before the first byte is sent. The sink's abort check therefore
//!   only catches a transport that closed before rendering began; a close
//!   during delivery is caught chunk by chunk in `app::PageStream`
//! - The render scope is built per call and dropped on every exit path

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::AbortSignal;
use crate::controller::Controller;
use crate::view::{recover, ChunkSink, ErrorPhase, RenderError, RenderScope, View};

/// Injected renderer turning an opaque tree into markup.
pub trait ServerRenderer<T>: Send + Sync {
    /// Serialize `tree`, writing markup into `out`.
    fn render(&self, tree: &T, scope: &RenderScope<'_>, out: &mut ChunkSink) -> Result<(), RenderError>;
}

/// How rendered content is handed to the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One body string.
    String,
    /// A chunked body.
    #[default]
    Stream,
}

/// Rendered content of one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerOutput {
    Text(String),
    Chunks(Vec<String>),
}

impl ServerOutput {
    pub fn is_empty(&self) -> bool {
        match self {
            ServerOutput::Text(text) => text.is_empty(),
            ServerOutput::Chunks(chunks) => chunks.iter().all(String::is_empty),
        }
    }

    pub fn into_chunks(self) -> Vec<String> {
        match self {
            ServerOutput::Text(text) => vec![text],
            ServerOutput::Chunks(chunks) => chunks,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            ServerOutput::Text(text) => text,
            ServerOutput::Chunks(chunks) => chunks.concat(),
        }
    }
}

/// Server side of the view engine bridge.
pub struct ServerViewEngine<T> {
    renderer: Arc<dyn ServerRenderer<T>>,
    mode: RenderMode,
}

impl<T> Clone for ServerViewEngine<T> {
    fn clone(&self) -> Self {
        Self {
            renderer: self.renderer.clone(),
            mode: self.mode,
        }
    }
}

impl<T: 'static> ServerViewEngine<T> {
    pub fn new(renderer: Arc<dyn ServerRenderer<T>>, mode: RenderMode) -> Self {
        Self { renderer, mode }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Render `view` on behalf of `controller`.
    pub fn render(
        &self,
        view: View<T>,
        controller: &Controller<T>,
        abort: Option<&AbortSignal>,
    ) -> Result<ServerOutput, RenderError> {
        let state = controller.store().get_state();
        let scope = controller.scope(&state);

        match self.render_view(&view, &scope, abort) {
            Ok(output) => Ok(output),
            Err(RenderError::Aborted) => Err(RenderError::Aborted),
            Err(error) => {
                let fallback = recover(controller, error, ErrorPhase::View)?;
                self.render_view(&fallback, &scope, abort)
            }
        }
    }

    fn render_view(
        &self,
        view: &View<T>,
        scope: &RenderScope<'_>,
        abort: Option<&AbortSignal>,
    ) -> Result<ServerOutput, RenderError> {
        let mut sink = ChunkSink::new(abort.cloned());
        match view {
            View::Empty => {}
            View::Html(html) => sink.push(html.as_str())?,
            View::Tree(tree) => self.renderer.render(tree, scope, &mut sink)?,
        }

        Ok(match self.mode {
            RenderMode::String => ServerOutput::Text(sink.into_string()),
            RenderMode::Stream => ServerOutput::Chunks(sink.into_chunks()),
        })
    }
}
