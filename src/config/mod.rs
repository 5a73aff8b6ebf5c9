//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! imvc.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! routes.toml (dev, hot_reload = true):
//!     watcher.rs detects change
//!     → RouteManifest::load
//!     → routing::apply_updates compiles and swaps the table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the route table hot-swaps
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, AppConfig, AssetsConfig, ListenerConfig, ObservabilityConfig, RenderConfig,
    RoutesConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ManifestWatcher;
