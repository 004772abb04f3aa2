//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin sign-in.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Wrong password, unknown email, or malformed email.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but does not hold the admin role.
    #[error("admin access required")]
    NotAdmin,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
