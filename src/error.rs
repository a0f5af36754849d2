//! Error types for the task service
//!
//! Provides unified error handling using thiserror.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::objects::ObjectStoreError;
use crate::storage::TableError;

// == App Error Enum ==
/// Unified error type for the task service.
///
/// "Not found" results of the core operations are returned as `None` or
/// `false`; the boundary turns them into [`AppError::NotFound`] or
/// [`AppError::RemoteNotFound`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or out-of-range caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// The key-value store failed to complete a read or write
    #[error("Persistence unavailable: {0}")]
    Persistence(#[from] TableError),

    /// The blob-storage provider failed to mint a URL or delete an object
    #[error("Object storage error: {0}")]
    ObjectStorage(#[from] ObjectStoreError),

    /// The external collection API failed or was unreachable
    #[error("External service unavailable: {0}")]
    RemoteUnavailable(String),

    /// The external collection API reported the item absent
    #[error("{0}")]
    RemoteNotFound(String),
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::RemoteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) | AppError::ObjectStorage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::RemoteUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to return to clients. Backend details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Persistence(_) => "Failed to access task database".to_string(),
            AppError::ObjectStorage(_) => "Failed to access file storage".to_string(),
            AppError::RemoteUnavailable(_) => {
                "Failed to fetch data from external service".to_string()
            }
            other => other.to_string(),
        }
    }
}

// == Body Rejections ==
/// Unreadable or mistyped JSON bodies are caller input errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "message": self.public_message()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the task service.
pub type Result<T> = std::result::Result<T, AppError>;
