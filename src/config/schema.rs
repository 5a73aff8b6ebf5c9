//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the runtime.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::context::Settings;
use crate::view::RenderMode;

/// Root configuration for the runtime host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Server rendering behavior.
    pub render: RenderConfig,

    /// Settings handed to every Context and embedded in documents.
    pub context: Settings,

    /// Route manifest location and reload policy.
    pub routes: RoutesConfig,

    /// Static assets and the asset manifest.
    pub assets: AssetsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Introspection endpoints.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Server rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render pages on the server. Off answers every page with the shell.
    pub ssr: bool,

    /// Body delivery: one string or a chunked stream.
    pub mode: RenderMode,

    /// `id` of the element the client mounts into.
    pub container_id: String,

    /// Document title when the state does not provide one.
    pub title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ssr: true,
            mode: RenderMode::Stream,
            container_id: "root".to_string(),
            title: "IMVC".to_string(),
        }
    }
}

/// Route manifest configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Path to the TOML route manifest.
    pub manifest_path: PathBuf,

    /// Watch the manifest and swap the route table on change.
    pub hot_reload: bool,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("config/routes.toml"),
            hot_reload: false,
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Path to `assets.json`. A missing file maps names to themselves.
    pub manifest_path: PathBuf,

    /// Directory served under the context's `public_path`.
    pub static_dir: Option<PathBuf>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("public/assets.json"),
            static_dir: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directives; `RUST_LOG` takes precedence.
    pub log_level: Option<String>,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Introspection endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve `/__imvc/*`.
    pub enabled: bool,

    /// Bearer token required when set.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
        }
    }
}
