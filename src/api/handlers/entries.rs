//! Handlers for the url entry endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};

use crate::api::dto::entry::{EntryRequest, EntryResponse, UrlQuery};
use crate::error::AppError;
use crate::state::AppState;

/// Resolves or creates the entry for a URL.
///
/// # Endpoint
///
/// `POST /url-entries`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// ```json
/// { "token": "aB3_x9Qz", "url": "https://example.com/some/long/path", "visit_count": 0 }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: a new entry was stored
/// - **200 OK**: the URL already had an entry, which is returned unchanged
/// - **400 Bad Request**: the body is not `{"url": string}`, or the URL is empty,
///   unparsable or hostless
/// - **503 Service Unavailable**: no free token was found
pub async fn create_entry_handler(
    State(state): State<AppState>,
    payload: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EntryResponse>), AppError> {
    let Json(payload) = payload?;
    let saved = state.entry_service.save_url(&payload.url).await?;

    let status = if saved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(saved.entry.into())))
}

/// Looks up an entry by token.
///
/// # Endpoint
///
/// `GET /url-entries/{token}`
///
/// # Errors
///
/// Returns 400 if the token is malformed, 404 if it is unknown.
pub async fn get_entry_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<EntryResponse>, AppError> {
    let entry = state.entry_service.get_by_token(&token).await?;
    Ok(Json(entry.into()))
}

/// Looks up an entry by its exact URL.
///
/// # Endpoint
///
/// `GET /url-entries?url=...`
///
/// # Errors
///
/// Returns 400 if the `url` parameter is missing or malformed, 404 if it has no entry.
pub async fn entry_by_url_handler(
    query: Result<Query<UrlQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<EntryResponse>, AppError> {
    let Query(query) = query?;
    let entry = state.entry_service.get_by_url(&query.url).await?;
    Ok(Json(entry.into()))
}
