//! Reading the hydration payload back out of a document.

use thiserror::Error;

use crate::context::Preload;
use crate::hydration::payload::{unescape_html, HydrationPayload, PAYLOAD_ELEMENT_ID, PRELOAD_ATTRIBUTE};

#[derive(Debug, Error)]
pub enum HydrationError {
    #[error("hydration payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("hydration payload element is not closed")]
    Unterminated,
}

/// Whatever the client runtime boots from: a parsed page, a live DOM, a
/// test fixture.
pub trait PayloadSource {
    /// The embedded payload; `None` when the page carries none.
    fn payload(&self) -> Result<Option<HydrationPayload>, HydrationError>;

    /// Every preload marker in the page.
    fn preload(&self) -> Preload;
}

/// A server-emitted HTML document held as text.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    html: String,
}

impl HtmlDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    /// Inner markup of the element whose `id` is `id`, if any.
    pub fn element_inner_html(&self, id: &str) -> Option<&str> {
        let marker = format!(r#"id="{}""#, id);
        let at = self.html.find(&marker)?;
        let open_end = at + self.html[at..].find('>')? + 1;
        let tag_start = self.html[..at].rfind('<')?;
        let tag = self.html[tag_start + 1..at].split_whitespace().next()?;
        let close = format!("</{}>", tag);
        let close_at = open_end + self.html[open_end..].rfind(&close)?;
        Some(&self.html[open_end..close_at])
    }
}

impl PayloadSource for HtmlDocument {
    fn payload(&self) -> Result<Option<HydrationPayload>, HydrationError> {
        let marker = format!(r#"id="{}""#, PAYLOAD_ELEMENT_ID);
        let Some(at) = self.html.find(&marker) else {
            return Ok(None);
        };
        let rest = &self.html[at..];
        let start = rest.find('>').ok_or(HydrationError::Unterminated)? + 1;
        let end = rest[start..]
            .find("</script>")
            .ok_or(HydrationError::Unterminated)?;
        Ok(Some(serde_json::from_str(&rest[start..start + end])?))
    }

    fn preload(&self) -> Preload {
        let marker = format!(r#"{}=""#, PRELOAD_ATTRIBUTE);
        let mut preload = Preload::new();
        let mut rest = self.html.as_str();

        while let Some(at) = rest.find(&marker) {
            rest = &rest[at + marker.len()..];
            let Some(name_end) = rest.find('"') else { break };
            let name = unescape_html(&rest[..name_end]);
            let Some(open_end) = rest.find('>') else { break };
            rest = &rest[open_end + 1..];
            let Some(close) = rest.find("</") else { break };
            preload.insert(name, unescape_html(&rest[..close]));
            rest = &rest[close..];
        }
        preload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Settings;
    use crate::hydration::payload::preload_markers;
    use serde_json::json;

    #[test]
    fn test_reads_back_payload_and_preload() {
        let mut preload = Preload::new();
        preload.insert("css".into(), "p{color:red}".into());
        preload.insert("tpl".into(), "<b>&</b>".into());

        let payload = HydrationPayload::new(Some(json!({ "count": 3 })), &Settings::default());
        let html = format!(
            "<html><head>{}</head><body><div id=\"root\"><p>3</p></div>{}</body></html>",
            preload_markers(&preload),
            payload.to_script().unwrap()
        );

        let doc = HtmlDocument::new(html);
        assert_eq!(doc.payload().unwrap(), Some(payload));
        assert_eq!(doc.preload(), preload);
        assert_eq!(doc.element_inner_html("root"), Some("<p>3</p>"));
    }

    #[test]
    fn test_missing_payload() {
        let doc = HtmlDocument::new("<html><body><div id=\"root\"></div></body></html>");
        assert_eq!(doc.payload().unwrap(), None);
        assert!(doc.preload().is_empty());
        assert_eq!(doc.element_inner_html("root"), Some(""));
    }

    #[test]
    fn test_corrupt_payload() {
        let doc = HtmlDocument::new(r#"<script id="__IMVC_PAYLOAD__" type="application/json">{nope</script>"#);
        assert!(matches!(doc.payload(), Err(HydrationError::Payload(_))));
    }
}
