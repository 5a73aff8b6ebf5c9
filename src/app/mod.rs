//! Application runtimes tying routing, controllers, views and hydration
//! together, one per environment.
//!
//! - `server.rs`: one controller per request, rendered to a document
//! - `client.rs`: one active controller per page view, hydrated then live
//! - `registry.rs`: in-flight server renders keyed by request id

pub mod client;
pub mod registry;
pub mod server;

pub use client::ClientApp;
pub use registry::{RenderOutcome, RenderRegistry, RenderSummary, RenderTicket};
pub use server::{Page, PageStream, RenderResult, ServerApp};
