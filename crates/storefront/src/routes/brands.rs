//! Brand directory and brand pages.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use serde::Serialize;
use tracing::instrument;

use atelier_core::catalog::{
    Facet, FilterState, FixedConstraint, ListingParams, Paginator, ProductQuery, find_by_slug,
    page_sizes, slug_collisions,
};
use atelier_core::{BrandId, FacetOptionId, Slug};

use super::listing::{self, ListingResponse};
use crate::db::BrandRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSummary {
    pub id: BrandId,
    pub name: String,
    pub slug: Slug,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `GET /brands`: every brand reachable by slug, in name order.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<BrandSummary>>> {
    let brands = BrandRepository::new(state.pool()).list().await?;

    for (slug, ids) in slug_collisions(&brands) {
        tracing::warn!(%slug, brands = ?ids, "brands share a slug; the first by name wins");
    }

    let summaries = brands
        .into_iter()
        .filter_map(|brand| match brand.effective_slug() {
            Ok(slug) => Some(BrandSummary {
                id: brand.id,
                name: brand.name,
                slug,
                description: brand.description,
            }),
            Err(err) => {
                tracing::warn!(brand_id = %brand.id, error = %err, "brand has no usable slug");
                None
            }
        })
        .collect();

    Ok(Json(summaries))
}

/// A brand page: the brand plus its filtered products.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandPageResponse {
    pub brand: BrandSummary,
    #[serde(flatten)]
    pub listing: ListingResponse,
}

/// `GET /brands/{slug}`.
///
/// The brand facet is pinned to this brand and hidden from the filter
/// panel; every other facet filters as on `/products`.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<Json<BrandPageResponse>> {
    let brands = BrandRepository::new(state.pool()).list().await?;
    let brand = find_by_slug(&brands, &slug)
        .ok_or_else(|| AppError::NotFound(format!("brand {slug}")))?;
    let brand_slug = brand
        .effective_slug()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let pairs = listing::query_pairs(raw.as_deref());
    let params = ListingParams::from_query_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    let mut fixed = params.fixed.clone();
    fixed.push(FixedConstraint::Option {
        facet: Facet::Brand,
        id: FacetOptionId::new(brand.id.as_str()),
    });

    let initial = params.selection.with_set(Facet::Brand, std::iter::empty());
    let mut filters = FilterState::new(initial, [Facet::Brand], |selection| {
        tracing::trace!(?selection, "brand filters changed");
    });
    filters.set_page(params.page);

    let visible: Vec<Facet> = filters.visible_facets().collect();
    let query = ProductQuery::new()
        .with_fixed(&fixed)
        .with_selection(filters.selection());

    let result = listing::run(
        state.pool(),
        &query,
        &visible,
        filters.page(),
        Paginator::new(page_sizes::BRAND_PAGE),
    )
    .await?;

    let description = brand
        .description
        .clone()
        .unwrap_or_else(|| format!("Shop {}.", brand.name));

    Ok(Json(BrandPageResponse {
        brand: BrandSummary {
            id: brand.id.clone(),
            name: brand.name.clone(),
            slug: brand_slug,
            description: brand.description.clone(),
        },
        listing: ListingResponse {
            title: brand.name.clone(),
            description,
            applied: filters.selection().clone(),
            fixed,
            products: result.products,
            facets: result.facets,
        },
    }))
}
