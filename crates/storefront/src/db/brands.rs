//! Brand reads.

use sqlx::PgPool;

use atelier_core::catalog::Brand;
use atelier_core::catalog::sql::BrandRow;

use super::RepositoryError;

/// Repository for brand reads.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All brands in name order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored slug is invalid.
    pub async fn list(&self) -> Result<Vec<Brand>, RepositoryError> {
        let rows: Vec<BrandRow> = sqlx::query_as(
            "SELECT id, name, slug, description FROM catalog.brand ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Brand::try_from(row).map_err(RepositoryError::DataCorruption))
            .collect()
    }
}
