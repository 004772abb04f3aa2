//! Discount codes and shipping times.

use sqlx::PgPool;
use tracing::instrument;

use atelier_core::order::{Discount, ShippingTime};

use super::RepositoryError;

/// Repository for checkout reference data writes.
pub struct CheckoutOptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutOptionRepository<'a> {
    /// Create a new checkout option repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a discount code, or update the one with the same code.
    /// Codes are stored uppercase.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, discount), fields(code = %discount.code))]
    pub async fn upsert_discount(&self, discount: &Discount) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO catalog.discount (code, percent_off, active)
            VALUES ($1, $2, $3)
            ON CONFLICT (code) DO UPDATE
            SET percent_off = EXCLUDED.percent_off, active = EXCLUDED.active
            ",
        )
        .bind(Discount::normalise_code(&discount.code))
        .bind(i16::from(discount.percent_off))
        .bind(discount.active)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Insert a shipping time, or update the one with the same ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, shipping), fields(shipping_time_id = %shipping.id))]
    pub async fn upsert_shipping_time(
        &self,
        shipping: &ShippingTime,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO catalog.shipping_time (id, label, min_days, max_days, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET label = EXCLUDED.label, min_days = EXCLUDED.min_days,
                max_days = EXCLUDED.max_days, sort_order = EXCLUDED.sort_order
            ",
        )
        .bind(shipping.id.as_str())
        .bind(&shipping.label)
        .bind(shipping.min_days)
        .bind(shipping.max_days)
        .bind(shipping.sort_order)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
