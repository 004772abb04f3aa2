//! Order listing and status changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use atelier_core::order::{Order, OrderItem, ShippingDetails, Transition};
use atelier_core::{OrderId, OrderStatus, Price, UserId};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, user_id, items, shipping, subtotal, discount_code, \
     discount_amount, total, status, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: Option<String>,
    items: Json<Vec<OrderItem>>,
    shipping: Json<ShippingDetails>,
    subtotal: Decimal,
    discount_code: Option<String>,
    discount_amount: Decimal,
    total: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            items: row.items.0,
            shipping: row.shipping.0,
            subtotal: Price::new(row.subtotal),
            discount_code: row.discount_code,
            discount_amount: Price::new(row.discount_amount),
            total: Price::new(row.total),
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Repository for order management.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders newest first, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM sales."order"
            WHERE $1::sales.order_status IS NULL OR status = $1
            ORDER BY created_at DESC, id
            "#
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Get one order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM sales."order" WHERE id = $1"#
        ))
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Order::from))
    }

    /// Move an order to `next`.
    ///
    /// Returns `None` for an unknown order. Setting the current status again
    /// writes nothing; moving against the fulfilment path is allowed and
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(order_id = %id, status = %next))]
    pub async fn update_status(
        &self,
        id: &OrderId,
        next: OrderStatus,
    ) -> Result<Option<(Order, Transition)>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM sales."order" WHERE id = $1 FOR UPDATE"#
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut order = Order::from(row);
        let transition = order.transition(next);
        match transition {
            Transition::Unchanged => return Ok(Some((order, transition))),
            Transition::Backward { from } => {
                tracing::warn!(from = %from, to = %next, "order status moved backwards");
            }
            Transition::Forward { from } => {
                tracing::info!(from = %from, to = %next, "order status updated");
            }
        }

        sqlx::query(r#"UPDATE sales."order" SET status = $2, updated_at = NOW() WHERE id = $1"#)
            .bind(id.as_str())
            .bind(next)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some((order, transition)))
    }
}
