//! Shopper accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::{Email, UserId, UserRole};

/// A registered account. The password hash never leaves the repository
/// layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}
