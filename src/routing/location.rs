//! Parsed request locations.
//!
//! # Responsibilities
//! - Split a raw URL into pathname, search and query
//! - Strip the application basename before matching
//! - Produce the same `Location` for the same URL in every environment
//!
//! # Design Decisions
//! - Absolute URLs (what a browser reports) and origin-form URLs (what an
//!   HTTP server receives) are both resolved by the `url` parser, so dot
//!   segments and percent-encoding are normalized identically
//! - Fragments never reach the matcher
//! - Query maps are ordered so that serialized locations compare byte-for-byte

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// Origin that origin-form URLs are resolved against.
const RESOLVE_BASE: &str = "http://localhost/";

/// A URL that has been split but not yet matched against a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUrl {
    pub pathname: String,
    pub search: String,
    pub raw: String,
}

impl RawUrl {
    /// Parse `url` relative to `basename`.
    ///
    /// Accepts both `/path?query` and `scheme://host/path?query`. Both are
    /// resolved against a fixed origin, so dot segments and percent-encoding
    /// come out the same either way.
    pub fn parse(url: &str, basename: &str) -> Self {
        let (path, search) = match Url::parse(RESOLVE_BASE).and_then(|base| base.join(url)) {
            Ok(resolved) if resolved.has_host() => {
                let search = match resolved.query() {
                    Some(query) if !query.is_empty() => format!("?{}", query),
                    _ => String::new(),
                };
                (resolved.path().to_string(), search)
            }
            _ => split_unparsed(url),
        };

        let pathname = strip_basename(&path, basename);
        let raw = format!("{}{}", pathname, search);

        Self {
            pathname,
            search,
            raw,
        }
    }

    /// Query parameters of this URL.
    pub fn query(&self) -> BTreeMap<String, String> {
        parse_query(&self.search)
    }
}

/// A URL matched against a route pattern. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    pub search: String,
    pub query: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub pattern: String,
    pub raw: String,
}

impl Location {
    pub(crate) fn new(url: RawUrl, pattern: &str, params: BTreeMap<String, String>) -> Self {
        let query = url.query();
        Self {
            pathname: url.pathname,
            search: url.search,
            query,
            params,
            pattern: pattern.to_string(),
            raw: url.raw,
        }
    }

    /// Route parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Parse a search string into a flat map. Repeated keys keep the last value.
pub fn parse_query(search: &str) -> BTreeMap<String, String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    let mut map = BTreeMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        map.insert(key.into_owned(), value.into_owned());
    }
    map
}

/// Split a URL the parser rejected, dropping any fragment.
fn split_unparsed(url: &str) -> (String, String) {
    let without_fragment = url.split_once('#').map(|(before, _)| before).unwrap_or(url);
    match without_fragment.split_once('?') {
        Some((path, query)) if !query.is_empty() => (path.to_string(), format!("?{}", query)),
        Some((path, _)) => (path.to_string(), String::new()),
        None => (without_fragment.to_string(), String::new()),
    }
}

fn strip_basename(path: &str, basename: &str) -> String {
    let path = if path.is_empty() { "/" } else { path };
    let base = basename.trim_end_matches('/');
    if base.is_empty() {
        return path.to_string();
    }

    match path.get(..base.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(base) => {
            let rest = &path[base.len()..];
            if rest.is_empty() {
                "/".to_string()
            } else if rest.starts_with('/') {
                rest.to_string()
            } else {
                path.to_string()
            }
        }
        _ => path.to_string(),
    }
}
