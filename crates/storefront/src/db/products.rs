//! Product reads for listings, brand pages and product detail.

use sqlx::PgPool;
use tracing::instrument;

use atelier_core::ProductId;
use atelier_core::catalog::sql::{PRODUCT_COLUMNS, PRODUCT_ORDER, ProductRow, select_products};
use atelier_core::catalog::{Product, ProductQuery};

use super::RepositoryError;

/// Repository for catalog product reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every product matching `query`, newest first.
    ///
    /// The full matching set is returned; callers paginate in memory.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidQuery` when the query exceeds backend
    /// limits (the database is not contacted), or `RepositoryError::Database`
    /// if the query fails.
    #[instrument(skip(self, query), fields(predicates = query.predicates().len()))]
    pub async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let mut builder = select_products(query)?;
        builder.push(PRODUCT_ORDER);
        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(self.pool).await?;
        tracing::debug!(matches = rows.len(), "product search");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM catalog.product WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Product::from))
    }

    /// Get the products with the given IDs, in no particular order. Unknown
    /// IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<&str> = ids.iter().map(ProductId::as_str).collect();
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM catalog.product WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}
