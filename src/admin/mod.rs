//! Introspection endpoints under `/__imvc`.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub const PREFIX: &str = "/__imvc";

pub fn router<T: Send + Sync + 'static>(state: AppState<T>) -> Router<AppState<T>> {
    Router::new()
        .route("/__imvc/status", get(get_status::<T>))
        .route("/__imvc/renders", get(get_renders::<T>))
        .route("/__imvc/routes", get(get_routes::<T>))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware::<T>))
}
