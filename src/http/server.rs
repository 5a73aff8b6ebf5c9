//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the page handler as catch-all
//! - Serve static assets under the public path
//! - Wire up middleware (tracing, timeout, request ID)
//! - Mount the introspection endpoints
//! - Bind server to listener and shut down gracefully

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::app::{Page, ServerApp};
use crate::config::{AdminConfig, AppConfig};
use crate::context::AbortSignal;
use crate::http::request::{request_url, transport};
use crate::http::response::{error_response, page_response, shell_response};
use crate::view::RenderMode;

/// Application state injected into handlers.
pub struct AppState<T: 'static> {
    pub app: ServerApp<T>,
    pub mode: RenderMode,
    pub admin: AdminConfig,
}

impl<T: 'static> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            mode: self.mode,
            admin: self.admin.clone(),
        }
    }
}

/// HTTP host for a server app.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server for `app` with the given configuration.
    pub fn new<T: Send + Sync + 'static>(app: ServerApp<T>, config: &AppConfig) -> Self {
        let state = AppState {
            app,
            mode: config.render.mode,
            admin: config.admin.clone(),
        };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<T: Send + Sync + 'static>(config: &AppConfig, state: AppState<T>) -> Router {
        let mut router: Router<AppState<T>> = Router::new();

        if config.admin.enabled {
            router = router.merge(admin::router(state.clone()));
        }

        if let Some((prefix, dir)) = static_mount(&config.context.public_path, &config.assets.static_dir) {
            tracing::debug!(prefix = %prefix, dir = ?dir, "Serving static assets");
            router = router.nest_service(&prefix, ServeDir::new(dir));
        }

        router
            .fallback(page_handler::<T>)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `(prefix, dir)` when assets should be served locally.
fn static_mount(public_path: &str, static_dir: &Option<PathBuf>) -> Option<(String, PathBuf)> {
    let dir = static_dir.clone()?;
    let prefix = public_path.trim_end_matches('/');
    if prefix.is_empty() || !prefix.starts_with('/') {
        return None;
    }
    Some((prefix.to_string(), dir))
}

/// Catch-all page handler: render whatever the route table says.
async fn page_handler<T: Send + Sync + 'static>(
    State(state): State<AppState<T>>,
    request: Request<Body>,
) -> Response {
    let url = request_url(&request);
    let transport = transport(request, AbortSignal::new());

    match state.app.render(&url, transport).await {
        Ok(Page::Rendered(result)) => page_response(result, state.mode),
        Ok(Page::Shell(html)) => shell_response(html),
        Err(error) => error_response(&error),
    }
}
