//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured events: request id, controller, url, phase)
//!     → metrics.rs (render outcomes, durations, unknown actions, swaps)
//!     → tracing.rs (one span per render, keyed by request id)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the HTTP layer into every render event
//! - Metric calls are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
pub mod tracing;
