//! The listing pipeline shared by `/products` and `/brands/{slug}`.
//!
//! Query rebuild, full fetch, narrowing over the full result set, then
//! pagination. Narrowing always sees every match, not just the current page.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;

use atelier_core::catalog::{
    AvailableOption, Facet, FacetAvailability, FacetOption, FilterSelection, FixedConstraint, Page,
    Paginator, Product, ProductQuery,
};
use atelier_core::{Price, ProductId};

use crate::db::{FacetOptionRepository, ProductRepository};
use crate::error::Result;

/// A product as shown on a listing card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub featured: bool,
    pub new_arrival: bool,
}

impl From<Product> for ProductSummary {
    fn from(product: Product) -> Self {
        let discount_percent = product.discount_percent();
        let image = product.primary_image().map(|img| img.url.clone());
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            original_price: product.original_price,
            discount_percent,
            image,
            featured: product.featured,
            new_arrival: product.new_arrival,
        }
    }
}

/// Response body of a listing surface.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub title: String,
    pub description: String,
    /// The facet selection the results were filtered by.
    pub applied: FilterSelection,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fixed: Vec<FixedConstraint>,
    pub products: Page<ProductSummary>,
    /// Options still offered per visible facet, with match counts.
    pub facets: BTreeMap<Facet, Vec<AvailableOption>>,
}

/// One page of results plus the narrowed facet options.
pub struct Listing {
    pub products: Page<ProductSummary>,
    pub facets: BTreeMap<Facet, Vec<AvailableOption>>,
    /// Every option of every visible facet, for resolving display names.
    pub options: BTreeMap<Facet, Vec<FacetOption>>,
}

/// Run `query`, narrow `visible` facets over the full result set and cut
/// page `page`.
///
/// # Errors
///
/// Over-limit queries fail before the database is contacted; out-of-range
/// pages fail after the fetch with `PageError`.
pub async fn run(
    pool: &PgPool,
    query: &ProductQuery,
    visible: &[Facet],
    page: usize,
    paginator: Paginator,
) -> Result<Listing> {
    let products = ProductRepository::new(pool).search(query).await?;
    let options = FacetOptionRepository::new(pool).list_many(visible).await?;

    let availability = FacetAvailability::from_products(&products);
    let facets = availability.narrow_all(visible.iter().copied(), &options);
    let products = paginator.page(products, page)?.map(ProductSummary::from);

    tracing::debug!(
        total = products.total,
        page = products.page,
        page_count = products.page_count,
        "listing"
    );

    Ok(Listing {
        products,
        facets,
        options,
    })
}

/// Parse a raw query string into owned key/value pairs.
pub fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect()
    })
    .unwrap_or_default()
}

/// Display name of an option, if known.
pub fn option_name(
    options: &BTreeMap<Facet, Vec<FacetOption>>,
    facet: Facet,
    id: &atelier_core::FacetOptionId,
) -> Option<String> {
    options
        .get(&facet)?
        .iter()
        .find(|option| &option.id == id)
        .map(|option| option.name.clone())
}
