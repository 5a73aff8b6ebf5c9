//! The hydration payload and its in-document encoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{Preload, Settings};

/// `id` of the script element carrying the payload.
pub const PAYLOAD_ELEMENT_ID: &str = "__IMVC_PAYLOAD__";

/// Attribute naming a preload marker.
pub const PRELOAD_ATTRIBUTE: &str = "data-preload";

/// What the server hands to the client's first render.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HydrationPayload {
    /// Store state after the server render; absent for client-only shells.
    pub state: Option<Value>,
    /// Base path for asset resolution.
    pub public_path: String,
    /// Client-visible application settings.
    pub settings: Settings,
}

impl HydrationPayload {
    pub fn new(state: Option<Value>, settings: &Settings) -> Self {
        Self {
            state,
            public_path: settings.public_path.clone(),
            settings: settings.clone(),
        }
    }

    /// Whether the document was server rendered.
    pub fn is_server_rendered(&self) -> bool {
        self.state.is_some()
    }

    /// Encode as a JSON script element.
    pub fn to_script(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!(
            r#"<script id="{}" type="application/json">{}</script>"#,
            PAYLOAD_ELEMENT_ID,
            escape_script_json(&json)
        ))
    }
}

/// Encode every preload entry as a `text/plain` marker element.
pub fn preload_markers(preload: &Preload) -> String {
    preload
        .iter()
        .map(|(name, content)| {
            format!(
                r#"<script type="text/plain" {}="{}">{}</script>"#,
                PRELOAD_ATTRIBUTE,
                escape_html(name),
                escape_html(content)
            )
        })
        .collect()
}

/// Make serialized JSON safe inside a script element.
///
/// The replacements are JSON string escapes, so the text still parses as
/// the same JSON value.
pub fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let entity = [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&#39;", '\''),
        ]
        .into_iter()
        .find(|(name, _)| rest.starts_with(name));

        match entity {
            Some((name, c)) => {
                out.push(c);
                rest = &rest[name.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
