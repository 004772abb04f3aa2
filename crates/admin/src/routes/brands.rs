//! Brand management. Brands double as the options of the brand facet.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use atelier_core::catalog::Brand;
use atelier_core::{BrandId, Slug};

use crate::db::BrandRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// `GET /api/brands`, by name.
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Brand>>> {
    Ok(Json(BrandRepository::new(state.pool()).list().await?))
}

/// New brand form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandForm {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl BrandForm {
    /// Build the brand, deriving the slug from the name when none is given.
    fn into_brand(self, id: BrandId) -> Result<Brand> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(AppError::BadRequest("brand name cannot be empty".to_string()));
        }
        let slug = match self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => Slug::parse(slug),
            None => Slug::derive(&name),
        }
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(Brand {
            id,
            name,
            slug: Some(slug),
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// `POST /api/brands`
#[instrument(skip_all, fields(name = %form.name))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(form): Json<BrandForm>,
) -> Result<(StatusCode, Json<Brand>)> {
    let brand = form.into_brand(BrandId::generate())?;
    BrandRepository::new(state.pool()).save(&brand).await?;
    tracing::info!(brand_id = %brand.id, admin = %admin.email, "brand created");
    Ok((StatusCode::CREATED, Json(brand)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, slug: Option<&str>) -> BrandForm {
        BrandForm {
            name: name.to_string(),
            slug: slug.map(String::from),
            description: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_slug_is_derived_from_name() {
        let brand = form("Zara Home", None).into_brand(BrandId::new("b1")).unwrap();
        assert_eq!(brand.slug.unwrap().as_str(), "zara-home");
        assert_eq!(brand.description, None);
    }

    #[test]
    fn test_explicit_slug_wins_and_is_validated() {
        let brand = form("Zara Home", Some("zh")).into_brand(BrandId::new("b1")).unwrap();
        assert_eq!(brand.slug.unwrap().as_str(), "zh");
        assert!(form("Zara", Some("Not A Slug!")).into_brand(BrandId::new("b2")).is_err());
        assert!(form("   ", None).into_brand(BrandId::new("b3")).is_err());
    }
}
