//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::cart::StorageError;
use crate::datastore::DataError;

/// Application-level error type for the store.
#[derive(Debug, Error)]
pub enum AppError {
    /// Data service operation failed.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Local cart persistence failed.
    #[error("Cart storage error: {0}")]
    Storage(#[from] StorageError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Data(DataError::Database(_) | DataError::Corruption(_))
                | Self::Storage(_)
                | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Data(err) => match err {
                DataError::NotFound(_) => StatusCode::NOT_FOUND,
                DataError::InvalidTransition { .. } => StatusCode::CONFLICT,
                DataError::Corruption(_) | DataError::Database(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Data(err) => match err {
                DataError::NotFound(what) => format!("{what} not found"),
                DataError::InvalidTransition { from, to } => {
                    format!("cannot transition order from {from} to {to}")
                }
                DataError::Corruption(_) | DataError::Database(_) => {
                    "Internal server error".to_string()
                }
            },
            Self::Storage(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
