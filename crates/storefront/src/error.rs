//! Unified error handling with Sentry integration.
//!
//! All route handlers return `Result<T, AppError>`. Responses are JSON
//! `{"error": "..."}` bodies; server-side failures are captured to Sentry and
//! their details never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use atelier_core::catalog::{PageError, QueryError};
use atelier_core::order::CheckoutError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::tryon::TryOnError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// The filter query exceeds backend limits.
    #[error("{0}")]
    Query(#[from] QueryError),

    /// The requested page does not exist.
    #[error("{0}")]
    Page(#[from] PageError),

    /// The cart or shipping details were rejected.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Image generation failed.
    #[error("Try-on error: {0}")]
    TryOn(#[from] TryOnError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A feature needs configuration that is missing.
    #[error("{0}")]
    Config(String),

    /// No one is signed in.
    #[error("Not signed in")]
    Unauthorized,

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
            Self::Query(_) | Self::Checkout(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Page(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::TryOn(err) => match err {
                TryOnError::InvalidPhoto(_) | TryOnError::Garment(_) => StatusCode::BAD_REQUEST,
                TryOnError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
                TryOnError::Http(_) | TryOnError::Api { .. } | TryOnError::NoImage => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
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
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Authentication error".to_string()
                }
            },
            Self::TryOn(err) => match err {
                TryOnError::InvalidPhoto(_) | TryOnError::Garment(_) | TryOnError::NoImage => {
                    err.to_string()
                }
                TryOnError::Config(_) => "Try-on is not available".to_string(),
                TryOnError::Http(_) | TryOnError::Api { .. } => {
                    "Image generation failed".to_string()
                }
            },
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::BadRequest(msg) | Self::Config(msg) => msg.clone(),
            Self::Query(_) | Self::Page(_) | Self::Checkout(_) | Self::Unauthorized => {
                self.to_string()
            }
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
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after login.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

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
    async fn test_query_cap_is_a_bad_request() {
        let err = AppError::from(RepositoryError::InvalidQuery(QueryError::TooManyValues {
            field: "colourIds",
            count: 31,
            max: 30,
        }));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("31"));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "brand b1 has an invalid slug".to_string(),
        ));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_missing_image_message_reaches_client() {
        let (status, body) = body_json(AppError::TryOn(TryOnError::NoImage)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "model did not return an image");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Page(PageError::OutOfRange {
                requested: 9,
                page_count: 3
            })
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Checkout(CheckoutError::EmptyCart).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Auth(AuthError::UserAlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Config("Try-on is not configured".to_string()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
