//! Per-render scope and output sink.

use serde_json::Value;

use crate::context::{AbortSignal, Context, Preload};
use crate::routing::Location;
use crate::view::RenderError;

/// Everything a renderer may consult while rendering one controller's view.
///
/// A scope is created for one render call and dropped when it returns, on
/// success and failure alike. Nothing in it is reachable from another render.
#[derive(Debug, Clone, Copy)]
pub struct RenderScope<'a> {
    controller: &'a str,
    location: &'a Location,
    context: &'a Context,
    state: &'a Value,
}

impl<'a> RenderScope<'a> {
    pub fn new(
        controller: &'a str,
        location: &'a Location,
        context: &'a Context,
        state: &'a Value,
    ) -> Self {
        Self {
            controller,
            location,
            context,
            state,
        }
    }

    /// Name of the controller being rendered.
    pub fn controller(&self) -> &'a str {
        self.controller
    }

    pub fn location(&self) -> &'a Location {
        self.location
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// Store state at the start of this render.
    pub fn state(&self) -> &'a Value {
        self.state
    }

    /// Preloaded content registered under `name`.
    pub fn preload(&self, name: &str) -> Option<&'a str> {
        self.context.preload().get(name)
    }

    /// All preloaded content.
    pub fn preloaded(&self) -> &'a Preload {
        self.context.preload().entries()
    }

    /// Prefix an asset path with the public path.
    pub fn asset_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.context.public_path().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Collects rendered chunks, refusing further writes once the transport
/// has gone away.
///
/// Rendering finishes before delivery starts; see `view::server`.
#[derive(Debug, Default)]
pub struct ChunkSink {
    chunks: Vec<String>,
    len: usize,
    abort: Option<AbortSignal>,
}

impl ChunkSink {
    pub fn new(abort: Option<AbortSignal>) -> Self {
        Self {
            chunks: Vec::new(),
            len: 0,
            abort,
        }
    }

    /// Append a chunk.
    pub fn push(&mut self, chunk: impl Into<String>) -> Result<(), RenderError> {
        if self.abort.as_ref().is_some_and(AbortSignal::is_aborted) {
            return Err(RenderError::Aborted);
        }
        let chunk = chunk.into();
        if !chunk.is_empty() {
            self.len += chunk.len();
            self.chunks.push(chunk);
        }
        Ok(())
    }

    /// Total bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn into_chunks(self) -> Vec<String> {
        self.chunks
    }

    pub fn into_string(self) -> String {
        self.chunks.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_collects_chunks() {
        let mut sink = ChunkSink::new(None);
        sink.push("<p>").unwrap();
        sink.push("").unwrap();
        sink.push("hi</p>").unwrap();
        assert_eq!(sink.len(), 9);
        assert_eq!(sink.into_chunks(), vec!["<p>", "hi</p>"]);
    }

    #[test]
    fn test_sink_refuses_after_abort() {
        let abort = AbortSignal::new();
        let mut sink = ChunkSink::new(Some(abort.clone()));
        sink.push("first").unwrap();
        abort.abort();
        assert_eq!(sink.push("second"), Err(RenderError::Aborted));
        assert_eq!(sink.into_string(), "first");
    }
}
