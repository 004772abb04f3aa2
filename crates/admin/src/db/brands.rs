//! Brand management.

use sqlx::PgPool;
use tracing::instrument;

use atelier_core::catalog::Brand;
use atelier_core::catalog::sql::BrandRow;

use super::RepositoryError;

/// Repository for brands.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every brand, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` for an unparseable stored slug.
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

    /// Insert a brand, or update the one with the same ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, brand), fields(brand_id = %brand.id))]
    pub async fn save(&self, brand: &Brand) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO catalog.brand (id, name, slug, description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, slug = EXCLUDED.slug, description = EXCLUDED.description
            ",
        )
        .bind(brand.id.as_str())
        .bind(&brand.name)
        .bind(brand.slug.as_ref().map(atelier_core::Slug::as_str))
        .bind(brand.description.as_deref())
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
