//! imvc-runtime server.
//!
//! Serves the bundled controllers through the route manifest named in the
//! configuration.

mod demo;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use imvc_runtime::config::{load_config, validate_config, AppConfig, ConfigError};
use imvc_runtime::lifecycle::{self, signals, Shutdown};
use imvc_runtime::markup::MarkupRenderer;
use imvc_runtime::observability::logging::init_logging;

#[derive(Debug, Parser)]
#[command(name = "imvc-runtime", version, about = "Isomorphic controller runtime server")]
struct Cli {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Development mode: hot-reload the route manifest.
    #[arg(long)]
    dev: bool,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if cli.dev {
        config.routes.hot_reload = true;
    }
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(config.observability.log_level.as_deref());
    tracing::info!("imvc-runtime v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        ssr = config.render.ssr,
        routes = ?config.routes.manifest_path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    lifecycle::start(config, demo::registry(), Arc::new(MarkupRenderer), shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
