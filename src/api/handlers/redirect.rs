//! Handler for token redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a token to its URL and records one visit.
///
/// # Endpoint
///
/// `GET /{token}`
///
/// The visit is recorded before the redirect is sent, so a 307 always means
/// the count went up by one.
///
/// # Errors
///
/// Returns 400 if the token is malformed, 404 if it is unknown.
pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.entry_service.get_by_token(&token).await?;
    state.entry_service.record_visit(&token).await?;

    tracing::debug!(token = %entry.token, "redirecting");

    Ok(Redirect::temporary(entry.url.as_str()))
}
