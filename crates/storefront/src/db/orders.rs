//! Order writes at checkout.

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use atelier_core::order::Order;

use super::RepositoryError;

/// Repository for placing orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a newly placed order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order ID is taken, or
    /// `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, order), fields(order_id = %order.id, total = %order.total.amount()))]
    pub async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO sales."order" (
                id, user_id, items, shipping, subtotal, discount_code,
                discount_amount, total, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id.as_str())
        .bind(order.user_id.as_ref().map(atelier_core::UserId::as_str))
        .bind(Json(&order.items))
        .bind(Json(&order.shipping))
        .bind(order.subtotal.amount())
        .bind(order.discount_code.as_deref())
        .bind(order.discount_amount.amount())
        .bind(order.total.amount())
        .bind(order.status)
        .bind(order.created_at)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "order"))?;
        Ok(())
    }
}
