//! Facet option management and reordering.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use atelier_core::FacetOptionId;
use atelier_core::catalog::{Facet, FacetOption, FacetOptionInput, MoveDirection};

use crate::db::facets::MoveOutcome;
use crate::db::{BrandRepository, FacetOptionRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

fn parse_facet(raw: &str) -> Result<Facet> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("facet {raw}")))
}

/// Brand options live in the brand table and are ordered by name.
fn reject_brand(facet: Facet) -> Result<()> {
    if facet == Facet::Brand {
        return Err(AppError::BadRequest(
            "brand options are managed through /api/brands".to_string(),
        ));
    }
    Ok(())
}

/// `GET /api/facets/{facet}`, in display order.
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(facet): Path<String>,
) -> Result<Json<Vec<FacetOption>>> {
    let facet = parse_facet(&facet)?;
    let options = if facet == Facet::Brand {
        BrandRepository::new(state.pool())
            .list()
            .await?
            .into_iter()
            .map(FacetOption::from)
            .collect()
    } else {
        FacetOptionRepository::new(state.pool()).list(facet).await?
    };
    Ok(Json(options))
}

/// New option form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOption {
    pub id: String,
    #[serde(flatten)]
    pub input: FacetOptionInput,
}

/// `POST /api/facets/{facet}`
#[instrument(skip_all, fields(facet = %facet, option_id = %form.id))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(facet): Path<String>,
    Json(form): Json<NewOption>,
) -> Result<(StatusCode, Json<FacetOption>)> {
    let facet = parse_facet(&facet)?;
    reject_brand(facet)?;
    let id = form.id.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest("option id cannot be empty".to_string()));
    }
    if form.input.name.trim().is_empty() {
        return Err(AppError::BadRequest("option name cannot be empty".to_string()));
    }

    let option = FacetOptionRepository::new(state.pool())
        .create(facet, &FacetOptionId::new(id), form.input)
        .await?;
    tracing::info!(admin = %admin.email, "facet option created");
    Ok((StatusCode::CREATED, Json(option)))
}

/// Reorder request body.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: MoveDirection,
}

/// Reorder response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub moved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swapped_with: Option<FacetOptionId>,
}

/// `POST /api/facets/{facet}/{id}/move`: swap `sortOrder` with the
/// neighbour above or below.
#[instrument(skip_all, fields(facet = %facet, option_id = %id))]
pub async fn move_option(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path((facet, id)): Path<(String, String)>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>> {
    let facet = parse_facet(&facet)?;
    reject_brand(facet)?;

    let outcome = FacetOptionRepository::new(state.pool())
        .move_option(facet, &FacetOptionId::new(id), request.direction)
        .await?;
    Ok(Json(match outcome {
        MoveOutcome::Swapped { with } => MoveResponse {
            moved: true,
            swapped_with: Some(with),
        },
        MoveOutcome::AtEdge => MoveResponse {
            moved: false,
            swapped_with: None,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_facet_is_rejected_for_writes() {
        assert!(reject_brand(Facet::Brand).is_err());
        assert!(reject_brand(Facet::Colour).is_ok());
    }

    #[test]
    fn test_unknown_facet_is_not_found() {
        assert!(matches!(parse_facet("flavours"), Err(AppError::NotFound(_))));
        assert!(matches!(parse_facet("colours"), Ok(Facet::Colour)));
    }
}
