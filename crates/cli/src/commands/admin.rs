//! Admin account management.
//!
//! # Usage
//!
//! ```bash
//! # Grant the admin role to an existing storefront account
//! atelier-cli admin promote -e staff@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use thiserror::Error;

use atelier_admin::db::{self, RepositoryError, UserRepository};
use atelier_core::{Email, UserId};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: ADMIN_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query error.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] atelier_core::EmailError),

    /// No account has this email.
    #[error("No account registered with email: {0}")]
    UnknownUser(Email),
}

/// Grant the admin role to the account registered under `email`.
///
/// # Returns
///
/// The ID of the promoted account.
///
/// # Errors
///
/// Returns `AdminError::UnknownUser` if nobody registered with this email.
pub async fn promote(email: &str) -> Result<UserId, AdminError> {
    let email = Email::parse(email)?;
    let database_url = super::database_url().ok_or(AdminError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let user = UserRepository::new(&pool)
        .promote(&email)
        .await?
        .ok_or_else(|| AdminError::UnknownUser(email.clone()))?;

    tracing::info!(user_id = %user.id, email = %user.email, "account promoted to admin");
    Ok(user.id)
}
