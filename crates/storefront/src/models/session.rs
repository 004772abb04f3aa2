//! Session-related types.
//!
//! Types stored in the session for authentication state and checkout handoff.

use serde::{Deserialize, Serialize};

use atelier_core::{Email, UserId, UserRole};

use super::user::User;

/// Session-stored user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Role at login time.
    pub role: UserRole,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the order just placed, read by the confirmation page.
    pub const LATEST_ORDER: &str = "latest_order";
}
