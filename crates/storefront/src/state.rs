//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::services::tryon::{TryOnClient, TryOnError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    try_on: Option<TryOnClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the try-on client cannot be built from its
    /// configuration.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, TryOnError> {
        let try_on = config.try_on.as_ref().map(TryOnClient::new).transpose()?;
        if try_on.is_none() {
            tracing::info!("try-on API not configured; /api/try-on will answer 503");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                try_on,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The try-on client.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the image generation API is not
    /// configured.
    pub fn try_on(&self) -> Result<&TryOnClient, AppError> {
        self.inner
            .try_on
            .as_ref()
            .ok_or_else(|| AppError::Config("Try-on is not available right now".to_string()))
    }
}
