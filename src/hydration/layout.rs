//! Default HTML document layout.
//!
//! ```text
//! <!DOCTYPE html><html><head>
//!   <meta charset> <title> <meta description/keywords>   (state.html)
//!   preload markers
//! </head><body>
//!   <div id="{container}">  rendered content  </div>
//!   payload script, vendor.js, index.js
//! </body></html>
//! ```

use serde_json::Value;

use crate::context::{Preload, Settings};
use crate::hydration::assets::AssetManifest;
use crate::hydration::payload::{escape_html, preload_markers, HydrationPayload};

/// Scripts every page loads, in order.
pub const ENTRY_SCRIPTS: [&str; 2] = ["vendor.js", "index.js"];

/// Page metadata read from the `html` object of a controller's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

impl PageMeta {
    pub fn from_state(state: &Value) -> Self {
        let html = &state["html"];
        let field = |name: &str| html[name].as_str().map(str::to_string);
        Self {
            title: field("title"),
            description: field("description"),
            keywords: field("keywords"),
        }
    }
}

/// The markup around a page's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Everything up to and including the opening container tag.
    pub head: String,
    /// Everything from the closing container tag on.
    pub tail: String,
}

impl Document {
    /// The whole page around `content`.
    pub fn wrap(self, content: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::with_capacity(content.len() + 2);
        chunks.push(self.head);
        chunks.extend(content);
        chunks.push(self.tail);
        chunks
    }
}

#[derive(Debug, Clone)]
pub struct DocumentLayout {
    title: String,
    container_id: String,
    assets: AssetManifest,
}

impl DocumentLayout {
    pub fn new(title: impl Into<String>, container_id: impl Into<String>, assets: AssetManifest) -> Self {
        Self {
            title: title.into(),
            container_id: container_id.into(),
            assets,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Document for a server-rendered page.
    pub fn document(&self, payload: &HydrationPayload, preload: &Preload) -> Result<Document, serde_json::Error> {
        let meta = payload
            .state
            .as_ref()
            .map(PageMeta::from_state)
            .unwrap_or_default();

        let mut head = String::from("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
        head.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
        head.push_str(&format!(
            "<title>{}</title>",
            escape_html(meta.title.as_deref().unwrap_or(&self.title))
        ));
        if let Some(description) = &meta.description {
            head.push_str(&format!(
                "<meta name=\"description\" content=\"{}\">",
                escape_html(description)
            ));
        }
        if let Some(keywords) = &meta.keywords {
            head.push_str(&format!(
                "<meta name=\"keywords\" content=\"{}\">",
                escape_html(keywords)
            ));
        }
        head.push_str(&preload_markers(preload));
        head.push_str(&format!(
            "</head><body><div id=\"{}\">",
            escape_html(&self.container_id)
        ));

        let mut tail = String::from("</div>");
        tail.push_str(&payload.to_script()?);
        for script in ENTRY_SCRIPTS {
            tail.push_str(&format!(
                "<script src=\"{}\"></script>",
                escape_html(&self.assets.url(&payload.public_path, script))
            ));
        }
        tail.push_str("</body></html>");

        Ok(Document { head, tail })
    }

    /// The client-only shell: an empty container and a payload without state.
    pub fn shell(&self, settings: &Settings) -> Result<String, serde_json::Error> {
        let payload = HydrationPayload::new(None, settings);
        let document = self.document(&payload, &Preload::new())?;
        Ok(document.wrap(Vec::new()).concat())
    }
}
