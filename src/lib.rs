//! Isomorphic controller runtime.
//!
//! The same controller-driven view is rendered on the server (an HTML
//! document for an HTTP response) and in a client host (a live DOM
//! container), sharing one controller state machine.
//!
//! # Architecture Overview
//!
//! ```text
//!   URL ─▶ routing ─▶ Location + Loader
//!                         │
//!                         ▼
//!          context (server: Transport | client: preload bag)
//!                         │
//!                         ▼
//!          controller (capability record + Store + lifecycle)
//!                         │ view()
//!                         ▼
//!          view (ServerViewEngine | ClientViewEngine, fallback contract)
//!                         │
//!            ┌────────────┴────────────┐
//!            ▼                         ▼
//!     hydration: document,        hydration: payload read back,
//!     payload, preload markers    first render hydrates
//!            │                         │
//!            ▼                         ▼
//!     app::ServerApp ─▶ http      app::ClientApp
//! ```

// Core runtime
pub mod app;
pub mod context;
pub mod controller;
pub mod error;
pub mod hydration;
pub mod markup;
pub mod routing;
pub mod store;
pub mod view;

// Host
pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use app::{ClientApp, Page, RenderResult, ServerApp};
pub use config::AppConfig;
pub use context::{Context, Settings, Transport};
pub use controller::{Controller, ControllerDef, ControllerError, InitialState, Loader};
pub use error::RuntimeError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Location, LoaderRegistry, RouteTable, RouteTableHandle};
pub use store::{Action, Store, UPDATE_STATE};
pub use view::{RenderMode, View};
