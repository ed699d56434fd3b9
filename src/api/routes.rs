//! API route configuration.

use crate::api::handlers::{create_entry_handler, entry_by_url_handler, get_entry_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Url entry routes.
///
/// # Endpoints
///
/// - `POST /url-entries`          - Resolve or create the entry for a URL
/// - `GET  /url-entries?url=...`  - Look up an entry by URL
/// - `GET  /url-entries/{token}`  - Look up an entry by token
pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/url-entries",
            post(create_entry_handler).get(entry_by_url_handler),
        )
        .route("/url-entries/{token}", get(get_entry_handler))
}
