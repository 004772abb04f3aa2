//! Read-only catalog lookups: facet options, shipping times and settings.

use axum::{
    Json,
    extract::{Path, State},
};

use atelier_core::catalog::{Facet, FacetOption};
use atelier_core::order::ShippingTime;

use crate::db::{CheckoutRepository, FacetOptionRepository, SettingsRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /facets/{facet}`. Accepts the field name (`colourIds`) or the
/// collection name (`colours`).
pub async fn facet_options(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<FacetOption>>> {
    let facet: Facet = name
        .parse()
        .map_err(|_| AppError::NotFound(format!("facet {name}")))?;
    let options = FacetOptionRepository::new(state.pool()).list(facet).await?;
    Ok(Json(options))
}

/// `GET /shipping-times`
pub async fn shipping_times(State(state): State<AppState>) -> Result<Json<Vec<ShippingTime>>> {
    let times = CheckoutRepository::new(state.pool()).shipping_times().await?;
    Ok(Json(times))
}

/// `GET /settings/{key}`
pub async fn setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>> {
    SettingsRepository::new(state.pool())
        .get(&key)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("setting {key}")))
}
