//! In-flight server renders, keyed by request id.
//!
//! Replaces any notion of a global "current controller": each render owns a
//! `RenderTicket`, and the registry only lists what is running.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use serde::Serialize;

use crate::observability::metrics;

/// How a render ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderOutcome {
    Completed,
    Errored,
    Aborted,
}

impl RenderOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderOutcome::Completed => "completed",
            RenderOutcome::Errored => "errored",
            RenderOutcome::Aborted => "aborted",
        }
    }
}

#[derive(Debug)]
struct RenderEntry {
    token: u64,
    url: String,
    controller: Option<&'static str>,
    started: Instant,
}

/// A row of the in-flight listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSummary {
    pub request_id: String,
    pub url: String,
    pub controller: Option<&'static str>,
    pub elapsed_ms: u128,
}

/// Shared registry of running renders.
#[derive(Debug, Clone, Default)]
pub struct RenderRegistry {
    entries: Arc<DashMap<String, RenderEntry>>,
    next_token: Arc<AtomicU64>,
}

impl RenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a render. The entry lives as long as the ticket.
    pub fn begin(&self, request_id: &str, url: &str) -> RenderTicket {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        let previous = self.entries.insert(
            request_id.to_string(),
            RenderEntry {
                token,
                url: url.to_string(),
                controller: None,
                started,
            },
        );
        if previous.is_some() {
            tracing::warn!(request_id, "Request id reused while a render was in flight");
        }

        RenderTicket {
            registry: self.clone(),
            request_id: request_id.to_string(),
            token,
            started,
            outcome: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, request_id: &str) -> bool {
        self.entries.contains_key(request_id)
    }

    /// Controller of the render running under `request_id`, once known.
    pub fn controller_of(&self, request_id: &str) -> Option<&'static str> {
        self.entries.get(request_id).and_then(|entry| entry.controller)
    }

    /// Every running render, oldest first.
    pub fn snapshot(&self) -> Vec<RenderSummary> {
        let mut rows: Vec<(Instant, RenderSummary)> = self
            .entries
            .iter()
            .map(|entry| {
                (
                    entry.started,
                    RenderSummary {
                        request_id: entry.key().clone(),
                        url: entry.url.clone(),
                        controller: entry.controller,
                        elapsed_ms: entry.started.elapsed().as_millis(),
                    },
                )
            })
            .collect();
        rows.sort_by_key(|(started, _)| *started);
        rows.into_iter().map(|(_, row)| row).collect()
    }
}

/// Ownership of one registry entry.
///
/// Dropping an unfinished ticket records the render as aborted.
#[derive(Debug)]
pub struct RenderTicket {
    registry: RenderRegistry,
    request_id: String,
    token: u64,
    started: Instant,
    outcome: Option<RenderOutcome>,
}

impl RenderTicket {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn set_controller(&self, name: &'static str) {
        if let Some(mut entry) = self.registry.entries.get_mut(&self.request_id) {
            if entry.token == self.token {
                entry.controller = Some(name);
            }
        }
    }

    /// Record the outcome and release the entry.
    pub fn finish(mut self, outcome: RenderOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for RenderTicket {
    fn drop(&mut self) {
        let token = self.token;
        self.registry
            .entries
            .remove_if(&self.request_id, |_, entry| entry.token == token);

        let outcome = self.outcome.unwrap_or(RenderOutcome::Aborted);
        metrics::record_render(outcome.as_str(), self.started);
        tracing::debug!(
            request_id = %self.request_id,
            outcome = outcome.as_str(),
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Render finished"
        );
    }
}
