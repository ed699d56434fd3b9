//! Top-level router.
//!
//! # Route Structure
//!
//! - `GET  /{token}`      - Redirect and record a visit
//! - `GET  /healthz`      - Store health check
//! - `/url-entries*`      - JSON entry API
//!
//! Every request passes through the [`tracing`] layer.

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/{token}", get(redirect_handler))
        .route("/healthz", get(health_handler))
        .merge(api::routes::entry_routes())
        .with_state(state)
        .layer(tracing::layer())
}
