//! Product list and editing.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use chrono::Utc;
use tracing::instrument;

use atelier_core::ProductId;
use atelier_core::catalog::{ListingParams, Page, Paginator, Product, ProductInput, page_sizes};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Query key for the name search box.
const NAME_SEARCH_KEY: &str = "q";

/// `GET /api/products`: the storefront filter parameters plus `q` for a
/// case-insensitive name search, 50 per page.
#[instrument(skip_all)]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<Product>>> {
    let pairs: Vec<(String, String)> =
        url::form_urlencoded::parse(raw.as_deref().unwrap_or_default().as_bytes())
            .into_owned()
            .collect();
    let params = ListingParams::from_query_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let name = pairs
        .iter()
        .find(|(k, _)| k == NAME_SEARCH_KEY)
        .map(|(_, v)| v.as_str());

    let products = ProductRepository::new(state.pool())
        .search(&params.query(), name)
        .await?;
    let page = Paginator::new(page_sizes::ADMIN_LIST).page(products, params.page)?;
    Ok(Json(page))
}

/// `GET /api/products/{id}`
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(&ProductId::new(id.clone()))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// `POST /api/products`
#[instrument(skip_all, fields(name = %input.name))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    input.validate()?;
    let product = input.into_product(ProductId::generate(), Utc::now());
    ProductRepository::new(state.pool()).create(&product).await?;
    tracing::info!(product_id = %product.id, admin = %admin.email, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}`
#[instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    input.validate()?;
    let product = ProductRepository::new(state.pool())
        .update(&ProductId::new(id.clone()), input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    tracing::info!(admin = %admin.email, "product updated");
    Ok(Json(product))
}

/// `DELETE /api/products/{id}`
#[instrument(skip_all, fields(product_id = %id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if !ProductRepository::new(state.pool())
        .delete(&ProductId::new(id.clone()))
        .await?
    {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    tracing::info!(admin = %admin.email, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
