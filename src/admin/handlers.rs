use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::RenderSummary;
use crate::controller::Loader;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub ssr: bool,
    pub in_flight: usize,
    pub route_generation: u64,
}

#[derive(Serialize)]
pub struct RouteStatus {
    pub pattern: String,
    pub controller: Option<&'static str>,
}

pub async fn get_status<T: Send + Sync + 'static>(State(state): State<AppState<T>>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        ssr: state.app.ssr_enabled(),
        in_flight: state.app.registry().len(),
        route_generation: state.app.routes().generation(),
    })
}

pub async fn get_renders<T: Send + Sync + 'static>(
    State(state): State<AppState<T>>,
) -> Json<Vec<RenderSummary>> {
    Json(state.app.registry().snapshot())
}

pub async fn get_routes<T: Send + Sync + 'static>(State(state): State<AppState<T>>) -> Json<Vec<RouteStatus>> {
    let table = state.app.routes().snapshot();
    let routes = table
        .routes()
        .iter()
        .map(|route| RouteStatus {
            pattern: route.pattern().as_str().to_string(),
            controller: match route.loader() {
                Loader::Static(def) => Some(def.name),
                Loader::Deferred(_) => None,
            },
        })
        .collect();
    Json(routes)
}
