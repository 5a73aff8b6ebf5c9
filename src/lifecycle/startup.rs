//! Startup orchestration.
//!
//! # Responsibilities
//! - Compile the route manifest against the loader registry
//! - Assemble the server app (view engine, layout, asset manifest)
//! - Start background tasks (metrics exporter, manifest watcher)
//! - Bind the listener and begin accepting traffic

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::app::ServerApp;
use crate::config::{AppConfig, ManifestWatcher};
use crate::hydration::{AssetError, AssetManifest, DocumentLayout};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{apply_updates, LoaderRegistry, ManifestError, RouteManifest, RouteTableHandle};
use crate::view::{ServerRenderer, ServerViewEngine};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Assets(#[from] AssetError),

    #[error("failed to watch route manifest: {0}")]
    Watch(#[from] notify::Error),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Assemble a server app from configuration.
pub fn build_app<T: 'static>(
    config: &AppConfig,
    registry: &LoaderRegistry<T>,
    renderer: Arc<dyn ServerRenderer<T>>,
) -> Result<ServerApp<T>, StartupError> {
    let manifest = RouteManifest::load(&config.routes.manifest_path)?;
    let table = manifest.compile(registry)?;
    tracing::info!(
        routes = table.len(),
        manifest = ?config.routes.manifest_path,
        "Route table compiled"
    );

    let assets = AssetManifest::load(&config.assets.manifest_path)?;
    let layout = DocumentLayout::new(
        config.render.title.clone(),
        config.render.container_id.clone(),
        assets,
    );

    Ok(ServerApp::new(
        RouteTableHandle::new(table),
        config.context.clone(),
        ServerViewEngine::new(renderer, config.render.mode),
        layout,
        config.render.ssr,
    ))
}

/// Run the server until `shutdown` fires.
pub async fn start<T: Send + Sync + 'static>(
    config: AppConfig,
    registry: LoaderRegistry<T>,
    renderer: Arc<dyn ServerRenderer<T>>,
    shutdown: Shutdown,
) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let app = build_app(&config, &registry, renderer)?;

    let _watcher = if config.routes.hot_reload {
        let (watcher, updates) = ManifestWatcher::new(&config.routes.manifest_path);
        let guard = watcher.run()?;
        tokio::spawn(apply_updates(app.routes().clone(), Arc::new(registry), updates));
        Some(guard)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        ssr = config.render.ssr,
        mode = ?config.render.mode,
        hot_reload = config.routes.hot_reload,
        "Listening for connections"
    );

    HttpServer::new(app, &config)
        .run(listener, shutdown.subscribe())
        .await?;
    Ok(())
}
