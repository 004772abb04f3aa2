//! PostgreSQL rendering of catalog queries and product row mapping.
//!
//! Products live in `catalog.product`, with one `TEXT[]` column per facet plus
//! `tags`, and images in a `JSONB` column. Predicates render as:
//!
//! | Predicate     | SQL                  |
//! |---------------|----------------------|
//! | `Equals`      | `col = $n`           |
//! | `Contains`    | `$n = ANY(col)`      |
//! | `ContainsAny` | `col && $n::text[]`  |

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};

use super::brand::Brand;
use super::facet::Facet;
use super::option::FacetOption;
use super::product::{FacetMemberships, Product, ProductImage};
use super::query::{Predicate, ProductQuery, QueryError};
use crate::types::{BrandId, FacetOptionId, Price, ProductId, Slug};

/// Column list for `SELECT`s that map into [`ProductRow`].
pub const PRODUCT_COLUMNS: &str = "id, name, price, original_price, description, images, \
     category_ids, size_ids, colour_ids, brand_ids, material_type_ids, finish_type_ids, \
     adhesive_ids, handle_ids, shape_ids, lid_ids, tags, featured, new_arrival, created_at";

/// Listing order: newest first, ID as tie-breaker.
pub const PRODUCT_ORDER: &str = " ORDER BY created_at DESC, id";

/// A `catalog.product` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub description: String,
    pub images: sqlx::types::Json<Vec<ProductImage>>,
    pub category_ids: Vec<String>,
    pub size_ids: Vec<String>,
    pub colour_ids: Vec<String>,
    pub brand_ids: Vec<String>,
    pub material_type_ids: Vec<String>,
    pub finish_type_ids: Vec<String>,
    pub adhesive_ids: Vec<String>,
    pub handle_ids: Vec<String>,
    pub shape_ids: Vec<String>,
    pub lid_ids: Vec<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub new_arrival: bool,
    pub created_at: DateTime<Utc>,
}

fn option_ids(raw: Vec<String>) -> Vec<FacetOptionId> {
    raw.into_iter().map(FacetOptionId::new).collect()
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            price: Price::new(row.price),
            original_price: row.original_price.map(Price::new),
            description: row.description,
            images: row.images.0,
            facets: FacetMemberships {
                category_ids: option_ids(row.category_ids),
                size_ids: option_ids(row.size_ids),
                colour_ids: option_ids(row.colour_ids),
                brand_ids: option_ids(row.brand_ids),
                material_type_ids: option_ids(row.material_type_ids),
                finish_type_ids: option_ids(row.finish_type_ids),
                adhesive_ids: option_ids(row.adhesive_ids),
                handle_ids: option_ids(row.handle_ids),
                shape_ids: option_ids(row.shape_ids),
                lid_ids: option_ids(row.lid_ids),
            },
            tags: row.tags,
            featured: row.featured,
            new_arrival: row.new_arrival,
            created_at: row.created_at,
        }
    }
}

/// A `catalog.brand` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: String,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<BrandRow> for Brand {
    type Error = String;

    fn try_from(row: BrandRow) -> Result<Self, Self::Error> {
        let slug = row
            .slug
            .filter(|s| !s.is_empty())
            .map(Slug::try_from)
            .transpose()
            .map_err(|e| format!("brand {} has an invalid slug: {e}", row.id))?;
        Ok(Self {
            id: BrandId::new(row.id),
            name: row.name,
            slug,
            description: row.description,
        })
    }
}

impl From<BrandRow> for FacetOption {
    /// Brands double as the options of the brand facet.
    fn from(row: BrandRow) -> Self {
        Self {
            id: FacetOptionId::new(row.id),
            facet: Facet::Brand,
            name: row.name,
            sort_order: 0,
            attributes: serde_json::Map::new(),
        }
    }
}

/// A `catalog.facet_option` row. `facet` holds the collection name
/// (`colours`, `sizes`, ...).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FacetOptionRow {
    pub facet: String,
    pub id: String,
    pub name: String,
    pub sort_order: i32,
    pub attributes: sqlx::types::Json<serde_json::Map<String, serde_json::Value>>,
}

impl TryFrom<FacetOptionRow> for FacetOption {
    type Error = String;

    fn try_from(row: FacetOptionRow) -> Result<Self, Self::Error> {
        let facet = Facet::from_collection(&row.facet)
            .ok_or_else(|| format!("unknown facet collection: {}", row.facet))?;
        Ok(Self {
            id: FacetOptionId::new(row.id),
            facet,
            name: row.name,
            sort_order: row.sort_order,
            attributes: row.attributes.0,
        })
    }
}

/// Append `query`'s predicates to a builder whose SQL already ends in a
/// `WHERE` clause (`WHERE TRUE` works), each as `AND <predicate>`.
///
/// # Errors
///
/// Returns [`QueryError`] when the query exceeds backend limits; nothing is
/// pushed in that case.
pub fn push_predicates(
    builder: &mut QueryBuilder<'_, Postgres>,
    query: &ProductQuery,
) -> Result<(), QueryError> {
    query.validate()?;
    for predicate in query.predicates() {
        builder.push(" AND ");
        match predicate {
            Predicate::Equals { field, value } => {
                builder.push(field.column()).push(" = ").push_bind(*value);
            }
            Predicate::Contains { field, value } => {
                builder
                    .push_bind(value.clone())
                    .push(" = ANY(")
                    .push(field.column())
                    .push(")");
            }
            Predicate::ContainsAny { field, values } => {
                builder
                    .push(field.column())
                    .push(" && ")
                    .push_bind(values.clone())
                    .push("::text[]");
            }
        }
    }
    Ok(())
}

/// `SELECT` over `catalog.product` filtered by `query`, without ordering so
/// callers can add clauses before [`PRODUCT_ORDER`].
///
/// # Errors
///
/// See [`push_predicates`].
pub fn select_products(query: &ProductQuery) -> Result<QueryBuilder<'static, Postgres>, QueryError> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {PRODUCT_COLUMNS} FROM catalog.product WHERE TRUE"
    ));
    push_predicates(&mut builder, query)?;
    Ok(builder)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{Facet, FilterSelection, FixedConstraint};

    #[test]
    fn test_empty_query_has_no_predicates() {
        let builder = select_products(&ProductQuery::new()).unwrap();
        assert!(builder.sql().ends_with("FROM catalog.product WHERE TRUE"));
    }

    #[test]
    fn test_predicates_render_as_anded_binds() {
        let selection = FilterSelection::new()
            .with_set(Facet::Category, [FacetOptionId::new("coats")])
            .with_set(Facet::Colour, [FacetOptionId::new("red"), FacetOptionId::new("blue")]);
        let query = ProductQuery::new()
            .with_fixed(&[FixedConstraint::Featured, FixedConstraint::Tag { tag: "wedding".into() }])
            .with_selection(&selection);

        let builder = select_products(&query).unwrap();
        let sql = builder.sql();
        let where_clause = sql.split("WHERE TRUE").nth(1).unwrap();
        assert_eq!(
            where_clause,
            " AND featured = $1 AND $2 = ANY(tags) AND $3 = ANY(category_ids) AND colour_ids && $4::text[]"
        );
    }

    #[test]
    fn test_facet_option_row_maps_collection_name() {
        let row = FacetOptionRow {
            facet: "colours".to_owned(),
            id: "red".to_owned(),
            name: "Red".to_owned(),
            sort_order: 2,
            attributes: sqlx::types::Json(serde_json::Map::from_iter([(
                "hex".to_owned(),
                serde_json::Value::from("#ff0000"),
            )])),
        };
        let option = FacetOption::try_from(row.clone()).unwrap();
        assert_eq!(option.facet, Facet::Colour);
        assert_eq!(option.attributes["hex"], "#ff0000");

        let bad = FacetOptionRow {
            facet: "flavours".to_owned(),
            ..row
        };
        assert!(FacetOption::try_from(bad).is_err());
    }

    #[test]
    fn test_brand_row_blank_slug_is_absent() {
        let brand = Brand::try_from(BrandRow {
            id: "b1".to_owned(),
            name: "Zara Home".to_owned(),
            slug: Some(String::new()),
            description: None,
        })
        .unwrap();
        assert_eq!(brand.slug, None);
        assert_eq!(brand.effective_slug().unwrap().as_str(), "zara-home");
    }

    #[test]
    fn test_over_cap_renders_nothing() {
        let ids = (0..31).map(|i| FacetOptionId::new(format!("s{i}")));
        let query = ProductQuery::new().with_selection(&FilterSelection::new().with_set(Facet::Size, ids));
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 WHERE TRUE");
        assert!(push_predicates(&mut builder, &query).is_err());
        assert_eq!(builder.sql(), "SELECT 1 WHERE TRUE");
    }
}
