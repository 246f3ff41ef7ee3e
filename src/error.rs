//! Error types for the htmlup server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::pages::PageError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Page error: {0}")]
    Page(#[from] PageError),
}

/// Storage-specific errors
///
/// Everything the object store adapters report is converted into one of
/// these; raw SDK errors never leave the `storage` module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Write to {key} failed: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid read handle: {0}")]
    InvalidHandle(String),
}

impl StorageError {
    /// Whether the error means the object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::ObjectNotFound(_))
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Page(e) => match e {
                PageError::NotFound(slug) => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("Page not found: {}", slug),
                ),
                PageError::Transient { .. } => {
                    tracing::warn!("Transient page error: {}", e);
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "storage_unavailable",
                        "Page is temporarily unavailable, try again".to_string(),
                    )
                }
                PageError::Sanitize(_) => {
                    tracing::error!("Sanitizer error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "render_error",
                        "Failed to render page".to_string(),
                    )
                }
            },
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
