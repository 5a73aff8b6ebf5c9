//! HTTP host for the server runtime.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, trace, timeout)
//!     → /__imvc/* (admin) | public_path/* (ServeDir) | page handler
//!     → request.rs (request parts → Transport)
//!     → ServerApp::render
//!     → response.rs (directives, string or stream body, error pages)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
