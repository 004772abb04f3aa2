//! Admin authentication service.
//!
//! Admins sign in with the same email/password accounts the storefront
//! creates. Only accounts holding [`UserRole::Admin`] get a session.

mod error;

pub use error::AdminAuthError;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use sqlx::PgPool;

use atelier_core::{Email, UserRole};

use crate::db::UserRepository;
use crate::models::User;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Check an admin's email and password.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the email or password
    /// is wrong, and `AdminAuthError::NotAdmin` if they are right but the
    /// account is a customer.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;
        require_admin(&user)?;
        Ok(user)
    }
}

fn require_admin(user: &User) -> Result<(), AdminAuthError> {
    if user.role == UserRole::Admin {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id, "customer account attempted admin sign-in");
        Err(AdminAuthError::NotAdmin)
    }
}

/// Verify a password against an argon2 PHC string.
fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}
