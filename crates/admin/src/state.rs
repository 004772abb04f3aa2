//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::error::AppError;
use crate::services::{StorageClient, StorageError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    storage: Option<StorageClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage client cannot be built from its
    /// configuration.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, StorageError> {
        let storage = config.storage.as_ref().map(StorageClient::new).transpose()?;
        if storage.is_none() {
            tracing::info!("object storage not configured; uploads will answer 503");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storage,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The bucket client.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when object storage is not configured.
    pub fn storage(&self) -> Result<&StorageClient, AppError> {
        self.inner
            .storage
            .as_ref()
            .ok_or_else(|| AppError::Config("Storage is not configured".to_string()))
    }
}
