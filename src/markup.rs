//! A minimal element tree and its server renderer.
//!
//! Applications usually bring their own view tree; `Markup` is the tree the
//! bundled binary and simple hosts use.

use crate::hydration::payload::escape_html;
use crate::view::{ChunkSink, RenderError, RenderScope, ServerRenderer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Markup>,
    },
    Text(String),
    /// Already-serialized markup, written as-is.
    Raw(String),
    /// Preloaded content registered under a name, escaped.
    Preload(String),
    /// URL of a static asset under the public path.
    AssetUrl(String),
    Fragment(Vec<Markup>),
}

impl Markup {
    pub fn element(tag: impl Into<String>, children: Vec<Markup>) -> Self {
        Markup::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Markup::Text(text.into())
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Markup::Element { attrs, .. } = &mut self {
            attrs.push((name.into(), value.into()));
        }
        self
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
}

/// Serializes `Markup`, one chunk per top-level child.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupRenderer;

impl MarkupRenderer {
    fn write(&self, node: &Markup, scope: &RenderScope<'_>, out: &mut String) -> Result<(), RenderError> {
        match node {
            Markup::Element { tag, attrs, children } => {
                if !valid_name(tag) {
                    return Err(RenderError::view(format!("invalid tag name `{}`", tag)));
                }
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    if !valid_name(name) {
                        return Err(RenderError::view(format!("invalid attribute name `{}`", name)));
                    }
                    out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                }
                out.push('>');
                for child in children {
                    self.write(child, scope, out)?;
                }
                out.push_str(&format!("</{}>", tag));
            }
            Markup::Text(text) => out.push_str(&escape_html(text)),
            Markup::Raw(html) => out.push_str(html),
            Markup::Preload(name) => out.push_str(&escape_html(scope.preload(name).unwrap_or_default())),
            Markup::AssetUrl(path) => out.push_str(&escape_html(&scope.asset_url(path))),
            Markup::Fragment(children) => {
                for child in children {
                    self.write(child, scope, out)?;
                }
            }
        }
        Ok(())
    }
}

impl ServerRenderer<Markup> for MarkupRenderer {
    fn render(&self, tree: &Markup, scope: &RenderScope<'_>, out: &mut ChunkSink) -> Result<(), RenderError> {
        let top: &[Markup] = match tree {
            Markup::Fragment(children) => children,
            other => std::slice::from_ref(other),
        };
        for node in top {
            let mut chunk = String::new();
            self.write(node, scope, &mut chunk)?;
            out.push(chunk)?;
        }
        Ok(())
    }
}
