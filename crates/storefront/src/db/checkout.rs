//! Discount codes and shipping times offered at checkout.

use sqlx::PgPool;

use atelier_core::ShippingTimeId;
use atelier_core::order::{Discount, ShippingTime};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct DiscountRow {
    code: String,
    percent_off: i16,
    active: bool,
}

#[derive(sqlx::FromRow)]
struct ShippingTimeRow {
    id: String,
    label: String,
    min_days: i32,
    max_days: i32,
    sort_order: i32,
}

impl From<ShippingTimeRow> for ShippingTime {
    fn from(row: ShippingTimeRow) -> Self {
        Self {
            id: ShippingTimeId::new(row.id),
            label: row.label,
            min_days: row.min_days,
            max_days: row.max_days,
            sort_order: row.sort_order,
        }
    }
}

/// Repository for checkout reference data.
pub struct CheckoutRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutRepository<'a> {
    /// Create a new checkout repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a discount code, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored percentage is out of range.
    pub async fn discount(&self, code: &str) -> Result<Option<Discount>, RepositoryError> {
        let row: Option<DiscountRow> = sqlx::query_as(
            "SELECT code, percent_off, active FROM catalog.discount WHERE code = $1",
        )
        .bind(Discount::normalise_code(code))
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            let percent_off = u8::try_from(r.percent_off)
                .ok()
                .filter(|p| *p <= 100)
                .ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "discount {} has percent_off {}",
                        r.code, r.percent_off
                    ))
                })?;
            Ok(Discount {
                code: r.code,
                percent_off,
                active: r.active,
            })
        })
        .transpose()
    }

    /// Shipping time options in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shipping_times(&self) -> Result<Vec<ShippingTime>, RepositoryError> {
        let rows: Vec<ShippingTimeRow> = sqlx::query_as(
            r"
            SELECT id, label, min_days, max_days, sort_order
            FROM catalog.shipping_time
            ORDER BY sort_order, min_days, id
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(ShippingTime::from).collect())
    }

    /// Whether a shipping time option exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shipping_time_exists(&self, id: &ShippingTimeId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM catalog.shipping_time WHERE id = $1)")
                .bind(id.as_str())
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }
}
