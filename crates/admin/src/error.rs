//! Unified error handling for admin.
//!
//! Responses are JSON `{"error": "..."}` bodies. Server-side failures are
//! captured to Sentry and their details never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use atelier_core::catalog::{PageError, ProductValidationError};

use crate::db::RepositoryError;
use crate::services::{AdminAuthError, StorageError};

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Sign-in failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AdminAuthError),

    /// Object storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The requested page does not exist.
    #[error("{0}")]
    Page(#[from] PageError),

    /// A product failed validation.
    #[error("{0}")]
    InvalidProduct(#[from] ProductValidationError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A feature needs configuration that is missing.
    #[error("{0}")]
    Config(String),

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

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AdminAuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AdminAuthError::NotAdmin => StatusCode::FORBIDDEN,
                AdminAuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Storage(err) => match err {
                StorageError::InvalidUpload(_) | StorageError::Source(_) => StatusCode::BAD_REQUEST,
                StorageError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
                StorageError::Http(_) | StorageError::Rejected { .. } => StatusCode::BAD_GATEWAY,
                StorageError::Signing => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidProduct(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Page(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::InvalidQuery(err)) => err.to_string(),
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Auth(err) => match err {
                AdminAuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AdminAuthError::NotAdmin => "Admin access required".to_string(),
                AdminAuthError::Repository(_) => "Authentication error".to_string(),
            },
            Self::Storage(err) => match err {
                StorageError::InvalidUpload(_) | StorageError::Source(_) => err.to_string(),
                StorageError::Config(_) => "Storage is not available".to_string(),
                StorageError::Http(_) | StorageError::Rejected { .. } | StorageError::Signing => {
                    "Storage request failed".to_string()
                }
            },
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::BadRequest(msg) | Self::Config(msg) => msg.clone(),
            Self::Page(_) | Self::InvalidProduct(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_customer_sign_in_is_forbidden() {
        let (status, body) = body_json(AppError::Auth(AdminAuthError::NotAdmin)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Admin access required");
    }

    #[tokio::test]
    async fn test_storage_failures_hide_bucket_replies() {
        let err = AppError::Storage(StorageError::Rejected {
            status: 403,
            message: "<Error><Code>SignatureDoesNotMatch</Code></Error>".to_string(),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Storage request failed");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Config("Storage is not configured".to_string()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Database(RepositoryError::Conflict("option already exists".to_string()))
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Storage(StorageError::InvalidUpload("file is empty".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
