//! Product CRUD for the back office.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use atelier_core::ProductId;
use atelier_core::catalog::sql::{PRODUCT_COLUMNS, PRODUCT_ORDER, ProductRow, select_products};
use atelier_core::catalog::{Facet, Product, ProductImage, ProductInput, ProductQuery};

use super::RepositoryError;

/// Facet columns in the order they are written.
const WRITE_FACETS: [Facet; 10] = Facet::ALL;

/// Repository for catalog product reads and writes.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

/// A product's ID and images, for re-hosting.
#[derive(Debug, Clone)]
pub struct ProductImages {
    pub id: ProductId,
    pub images: Vec<ProductImage>,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Products matching `query` and, when given, whose name contains
    /// `name` (case-insensitive). Newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidQuery` when the query exceeds backend
    /// limits, or `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, query), fields(predicates = query.predicates().len()))]
    pub async fn search(
        &self,
        query: &ProductQuery,
        name: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut builder = select_products(query)?;
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            builder
                .push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(name)));
        }
        builder.push(PRODUCT_ORDER);
        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(self.pool).await?;
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

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the ID is taken.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn create(&self, product: &Product) -> Result<(), RepositoryError> {
        insert_statement(product)
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::conflict_on_unique(e, "product"))?;
        Ok(())
    }

    /// Insert a product, or overwrite every column of the existing one with
    /// the same ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut builder = insert_statement(product);
        builder.push(" ON CONFLICT (id) DO UPDATE SET ");
        let mut set = builder.separated(", ");
        for column in writable_columns() {
            set.push(format!("{column} = EXCLUDED.{column}"));
        }
        set.push("updated_at = NOW()");
        builder.build().execute(self.pool).await?;
        Ok(())
    }

    /// Replace every editable field of a product. Returns the updated
    /// product, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: &ProductId,
        input: ProductInput,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut product = input.into_product(id.clone(), Utc::now());
        let created_at: Option<DateTime<Utc>> = update_statement(&product)
            .build_query_scalar()
            .fetch_optional(self.pool)
            .await?;
        Ok(created_at.map(|created_at| {
            product.created_at = created_at;
            product
        }))
    }

    /// Delete a product. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every product's images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_images(&self) -> Result<Vec<ProductImages>, RepositoryError> {
        let rows: Vec<(String, Json<Vec<ProductImage>>)> =
            sqlx::query_as("SELECT id, images FROM catalog.product ORDER BY id")
                .fetch_all(self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(id, images)| ProductImages {
                id: ProductId::new(id),
                images: images.0,
            })
            .collect())
    }

    /// Point every image of `id` whose URL is `from` at `to`.
    ///
    /// Runs as a single JSONB rewrite so concurrent edits to other images are
    /// not overwritten.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn replace_image_url(
        &self,
        id: &ProductId,
        from: &str,
        to: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE catalog.product
            SET images = (
                    SELECT COALESCE(jsonb_agg(
                        CASE WHEN img->>'url' = $2
                             THEN jsonb_set(img, '{url}', to_jsonb($3::text))
                             ELSE img END
                        ORDER BY ord), '[]'::jsonb)
                    FROM jsonb_array_elements(images) WITH ORDINALITY AS t(img, ord)
                ),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .bind(from)
        .bind(to)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Columns written from a [`Product`], except `id`.
fn writable_columns() -> Vec<&'static str> {
    let mut columns = vec!["name", "price", "original_price", "description", "images"];
    columns.extend(WRITE_FACETS.iter().map(|facet| facet.column()));
    columns.extend(["tags", "featured", "new_arrival", "created_at"]);
    columns
}

fn insert_statement(product: &Product) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO catalog.product (id, {}) ",
        writable_columns().join(", ")
    ));
    builder.push_values(std::iter::once(product), |mut row, p| {
        row.push_bind(p.id.as_str().to_owned())
            .push_bind(p.name.clone())
            .push_bind(p.price.amount())
            .push_bind(p.original_price.map(|price| price.amount()))
            .push_bind(p.description.clone())
            .push_bind(Json(p.images.clone()));
        for facet in WRITE_FACETS {
            row.push_bind(facet_values(p, facet));
        }
        row.push_bind(p.tags.clone())
            .push_bind(p.featured)
            .push_bind(p.new_arrival)
            .push_bind(p.created_at);
    });
    builder
}

/// `UPDATE` of every writable column except `created_at`, which is
/// returned instead.
fn update_statement(product: &Product) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE catalog.product SET name = ");
    builder
        .push_bind(product.name.clone())
        .push(", price = ")
        .push_bind(product.price.amount())
        .push(", original_price = ")
        .push_bind(product.original_price.map(|p| p.amount()))
        .push(", description = ")
        .push_bind(product.description.clone())
        .push(", images = ")
        .push_bind(Json(product.images.clone()));
    for facet in WRITE_FACETS {
        builder
            .push(", ")
            .push(facet.column())
            .push(" = ")
            .push_bind(facet_values(product, facet));
    }
    builder
        .push(", tags = ")
        .push_bind(product.tags.clone())
        .push(", featured = ")
        .push_bind(product.featured)
        .push(", new_arrival = ")
        .push_bind(product.new_arrival)
        .push(", updated_at = NOW() WHERE id = ")
        .push_bind(product.id.as_str().to_owned())
        .push(" RETURNING created_at");
    builder
}

fn facet_values(product: &Product, facet: Facet) -> Vec<String> {
    product
        .facets
        .get(facet)
        .iter()
        .map(|id| id.as_str().to_owned())
        .collect()
}

/// Escape `%`, `_` and `\` for use inside an `ILIKE` pattern.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("silk"), "silk");
        assert_eq!(escape_like("100%_wool\\"), "100\\%\\_wool\\\\");
    }

    #[test]
    fn test_writable_columns_match_bind_order() {
        let columns = writable_columns();
        assert_eq!(columns.len(), 19);
        assert_eq!(columns[5], "category_ids");
        assert_eq!(columns[14], "lid_ids");
        assert_eq!(columns.last(), Some(&"created_at"));
    }

    #[test]
    fn test_update_is_one_statement_returning_created_at() {
        let input: ProductInput =
            serde_json::from_str(r#"{"name": "Silk Slip", "price": "120.00"}"#).unwrap();
        let product = input.into_product(ProductId::new("silk-slip"), Utc::now());

        let builder = update_statement(&product);
        let sql = builder.sql();
        assert!(sql.starts_with("UPDATE catalog.product SET name = $1, price = $2"));
        assert!(sql.contains(", lid_ids = $15, tags = $16"));
        assert!(sql.ends_with("updated_at = NOW() WHERE id = $19 RETURNING created_at"));
        assert!(!sql.contains("SELECT"));
        assert!(!sql.contains("created_at ="));
    }
}
