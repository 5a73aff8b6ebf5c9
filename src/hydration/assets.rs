//! Asset manifest lookup.
//!
//! The bundler writes `assets.json` mapping logical names to hashed file
//! names. Values are either a string or a list whose first element is the
//! file. Without a manifest every name maps to itself.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse asset manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AssetEntry {
    File(String),
    Files(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    entries: BTreeMap<String, String>,
}

impl AssetManifest {
    /// Parse manifest JSON. Empty lists are skipped.
    pub fn from_json(source: &str) -> Result<Self, AssetError> {
        let raw: BTreeMap<String, AssetEntry> = serde_json::from_str(source)?;
        let entries = raw
            .into_iter()
            .filter_map(|(name, entry)| {
                let file = match entry {
                    AssetEntry::File(file) => Some(file),
                    AssetEntry::Files(files) => files.into_iter().next(),
                };
                file.map(|file| (name, file))
            })
            .collect();
        Ok(Self { entries })
    }

    /// Load from disk. A missing file yields the identity manifest.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        match fs::read_to_string(path) {
            Ok(source) => Self::from_json(&source),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = ?path, "No asset manifest, using asset names as-is");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The file behind `name`, or `name` itself.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Public URL of `name` under `public_path`.
    pub fn url(&self, public_path: &str, name: &str) -> String {
        format!(
            "{}/{}",
            public_path.trim_end_matches('/'),
            self.resolve(name).trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_list_values() {
        let manifest = AssetManifest::from_json(
            r#"{ "index.js": "js/index-1a2b.js", "vendor.js": ["js/vendor-9f.js", "js/vendor-9f.js.map"], "empty.js": [] }"#,
        )
        .unwrap();
        assert_eq!(manifest.resolve("index.js"), "js/index-1a2b.js");
        assert_eq!(manifest.resolve("vendor.js"), "js/vendor-9f.js");
        assert_eq!(manifest.resolve("empty.js"), "empty.js");
        assert_eq!(manifest.url("/static/", "index.js"), "/static/js/index-1a2b.js");
    }

    #[test]
    fn test_missing_manifest_is_identity() {
        let manifest = AssetManifest::load(Path::new("/nonexistent/assets.json")).unwrap();
        assert_eq!(manifest.resolve("index.js"), "index.js");
        assert_eq!(manifest.url("", "index.js"), "/index.js");
    }
}
