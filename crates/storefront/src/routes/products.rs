//! Product listing and detail routes.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use serde::Serialize;
use tracing::instrument;

use atelier_core::ProductId;
use atelier_core::catalog::{Facet, ListingParams, Paginator, Product, page_sizes};

use super::listing::{self, ListingResponse};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /products`: the full catalog under URL-encoded filters.
///
/// Facet parameters (`categoryIds=a,b`), `featured`, `newArrival`, `tag` and
/// `page` are read from the query string.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ListingResponse>> {
    let pairs = listing::query_pairs(raw.as_deref());
    let params = ListingParams::from_query_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    let result = listing::run(
        state.pool(),
        &params.query(),
        &Facet::ALL,
        params.page,
        Paginator::new(page_sizes::PRODUCT_LISTING),
    )
    .await?;

    let heading = params.heading(|facet, id| listing::option_name(&result.options, facet, id));

    Ok(Json(ListingResponse {
        title: heading.title,
        description: heading.description,
        applied: params.selection,
        fixed: params.fixed,
        products: result.products,
        facets: result.facets,
    }))
}

/// A product with its computed saving.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u8>,
}

/// `GET /products/{id}`.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>> {
    let product = ProductRepository::new(state.pool())
        .get(&ProductId::new(id.clone()))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ProductDetail {
        discount_percent: product.discount_percent(),
        product,
    }))
}
