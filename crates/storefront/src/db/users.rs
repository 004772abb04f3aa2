//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use atelier_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::user::User;

/// Advisory lock key serialising first-admin claims.
const FIRST_ADMIN_LOCK: i64 = 0x6174_656c_6965_7201;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    role: UserRole,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: UserId::new(row.id),
            email,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a user with email and password.
    ///
    /// The first account registered while no admin exists becomes the admin;
    /// every later one is a customer. The check and the insert run in one
    /// transaction under an advisory lock so two concurrent registrations
    /// cannot both claim the role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, password_hash), fields(email = %email))]
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(FIRST_ADMIN_LOCK)
            .execute(&mut *tx)
            .await?;

        let admin_exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM account."user" WHERE role = 'admin')"#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let role = if admin_exists {
            UserRole::Customer
        } else {
            UserRole::Admin
        };

        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO account."user" (id, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, role, created_at
            "#,
        )
        .bind(UserId::generate().as_str())
        .bind(email.as_str())
        .bind(password_hash)
        .bind(role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "email"))?;

        tx.commit().await?;

        if role == UserRole::Admin {
            tracing::warn!(email = %email, "first account registered; granted admin role");
        }

        User::try_from(row)
    }

    /// Get a user and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserWithHashRow> = sqlx::query_as(
            r#"
            SELECT id, email, role, created_at, password_hash
            FROM account."user"
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }
}
