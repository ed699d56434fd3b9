//! Crate-wide error type.
//!
//! Errors fall into two groups that callers must be able to tell apart:
//!
//! - **Validation** - the input was malformed; independent of store state
//! - **Store outcomes** - the input was well-formed but the store said no
//!   ([`AppError::NotFound`], [`AppError::Conflict`], [`AppError::TokenSpaceExhausted`])
//!   or could not be reached ([`AppError::Store`])

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Error payload returned by the HTTP adapter.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Conflict { message: String, details: Value },

    #[error("token space exhausted after {attempts} attempts")]
    TokenSpaceExhausted { attempts: usize },

    #[error("{message}")]
    Store { message: String, details: Value },
}

impl AppError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn store(message: impl Into<String>, details: Value) -> Self {
        Self::Store {
            message: message.into(),
            details,
        }
    }

    /// True for malformed-input errors, which are never worth retrying.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// True for I/O and connectivity failures.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store { .. })
    }

    fn info(self) -> (StatusCode, ErrorInfo) {
        match self {
            AppError::Validation { field, reason } => (
                StatusCode::BAD_REQUEST,
                ErrorInfo {
                    code: "validation_error",
                    message: format!("invalid {field}"),
                    details: json!({ "field": field, "reason": reason }),
                },
            ),
            AppError::NotFound { message, details } => (
                StatusCode::NOT_FOUND,
                ErrorInfo {
                    code: "not_found",
                    message,
                    details,
                },
            ),
            AppError::Conflict { message, details } => (
                StatusCode::CONFLICT,
                ErrorInfo {
                    code: "conflict",
                    message,
                    details,
                },
            ),
            AppError::TokenSpaceExhausted { attempts } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorInfo {
                    code: "token_space_exhausted",
                    message: "Could not allocate an unused token".to_string(),
                    details: json!({ "attempts": attempts }),
                },
            ),
            AppError::Store { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorInfo {
                    code: "store_error",
                    message,
                    details,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.info();
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        AppError::store("Database error", json!({ "reason": e.to_string() }))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("body", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation("query", rejection.body_text())
    }
}

/// MongoDB server error code for a duplicate key on a unique index.
const MONGO_DUPLICATE_KEY: i32 = 11000;

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        if is_duplicate_key(&e) {
            return AppError::conflict(
                "Unique index violation",
                json!({ "reason": e.to_string() }),
            );
        }

        AppError::store("Database error", json!({ "reason": e.to_string() }))
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match e.kind.as_ref() {
        ErrorKind::Command(cmd) => cmd.code == MONGO_DUPLICATE_KEY,
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == MONGO_DUPLICATE_KEY,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_maps_to_bad_request() {
        let (status, body) = body_json(AppError::validation("token", "too short")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["details"]["field"], "token");
        assert_eq!(body["error"]["details"]["reason"], "too short");
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let (status, body) =
            body_json(AppError::not_found("Url entry not found", json!({}))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Url entry not found");
    }

    #[tokio::test]
    async fn test_exhaustion_maps_to_503() {
        let (status, body) = body_json(AppError::TokenSpaceExhausted { attempts: 16 }).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["details"]["attempts"], 16);
    }

    #[test]
    fn test_display_includes_field() {
        let err = AppError::validation("url", "missing scheme");
        assert_eq!(err.to_string(), "invalid url: missing scheme");
        assert!(err.is_validation());
        assert!(!err.is_store_failure());
    }

    #[test]
    fn test_non_database_sqlx_error_is_store_failure() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(err.is_store_failure());
    }
}
