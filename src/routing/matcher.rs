//! Route pattern matching.
//!
//! # Responsibilities
//! - Compile pattern strings (`/item/:id`, `/docs/:page?`, `/files/*`)
//! - Match a pathname and extract route parameters
//!
//! # Design Decisions
//! - Literal segments compare case-insensitively
//! - A single trailing slash on the pathname is tolerated
//! - No regex; segment-by-segment comparison keeps matching linear in
//!   practice (optional parameters backtrack, but patterns carry few of them)
//! - Unnamed wildcards are exposed under numeric keys starting at `"0"`

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Errors produced while compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern `{0}` has an empty parameter name")]
    EmptyParamName(String),

    #[error("pattern `{0}` has a wildcard before its last segment")]
    WildcardNotLast(String),

    #[error("pattern `{pattern}` declares parameter `{name}` twice")]
    DuplicateParam { pattern: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param { name: String, optional: bool },
    Wildcard { name: String },
}

/// A compiled route pattern.
#[derive(Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathPattern").field(&self.source).finish()
    }
}

impl PathPattern {
    /// Compile a pattern string.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut names: Vec<String> = Vec::new();
        let mut unnamed = 0usize;

        let parts: Vec<&str> = source
            .trim_start_matches('/')
            .split('/')
            .filter(|part| !part.is_empty())
            .collect();

        for (index, part) in parts.iter().enumerate() {
            let is_last = index + 1 == parts.len();
            let segment = if *part == "*" {
                let name = unnamed.to_string();
                unnamed += 1;
                Segment::Wildcard { name }
            } else if let Some(param) = part.strip_prefix(':') {
                if let Some(name) = param.strip_suffix('*') {
                    Segment::Wildcard {
                        name: name.to_string(),
                    }
                } else if let Some(name) = param.strip_suffix('?') {
                    Segment::Param {
                        name: name.to_string(),
                        optional: true,
                    }
                } else {
                    Segment::Param {
                        name: param.to_string(),
                        optional: false,
                    }
                }
            } else {
                Segment::Literal(part.to_string())
            };

            match &segment {
                Segment::Param { name, .. } | Segment::Wildcard { name } => {
                    if name.is_empty() {
                        return Err(PatternError::EmptyParamName(source.to_string()));
                    }
                    if names.contains(name) {
                        return Err(PatternError::DuplicateParam {
                            pattern: source.to_string(),
                            name: name.clone(),
                        });
                    }
                    names.push(name.clone());
                }
                Segment::Literal(_) => {}
            }

            if matches!(segment, Segment::Wildcard { .. }) && !is_last {
                return Err(PatternError::WildcardNotLast(source.to_string()));
            }
            segments.push(segment);
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match `pathname`, returning the extracted parameters.
    pub fn matches(&self, pathname: &str) -> Option<BTreeMap<String, String>> {
        let trimmed = pathname.trim_start_matches('/');
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let parts: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        let mut params = BTreeMap::new();
        if match_from(&self.segments, &parts, &mut params) {
            Some(params)
        } else {
            None
        }
    }
}

fn match_from(segments: &[Segment], parts: &[&str], params: &mut BTreeMap<String, String>) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return parts.is_empty();
    };

    match segment {
        Segment::Literal(literal) => match parts.split_first() {
            Some((part, remaining)) if part.eq_ignore_ascii_case(literal) => {
                match_from(rest, remaining, params)
            }
            _ => false,
        },
        Segment::Param { name, optional } => {
            if let Some((part, remaining)) = parts.split_first() {
                if !part.is_empty() {
                    params.insert(name.clone(), decode(part));
                    if match_from(rest, remaining, params) {
                        return true;
                    }
                    params.remove(name);
                }
            }
            *optional && match_from(rest, parts, params)
        }
        Segment::Wildcard { name } => {
            let joined: Vec<String> = parts.iter().map(|part| decode(part)).collect();
            params.insert(name.clone(), joined.join("/"));
            true
        }
    }
}

fn decode(part: &str) -> String {
    percent_decode_str(part)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| part.to_string())
}
