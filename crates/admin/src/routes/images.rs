//! Bulk image re-hosting.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::services::{MigrationReport, migrate_images};
use crate::state::AppState;

/// `POST /api/images/migrate`: move every product image not already in the
/// bucket. Individual failures are listed in the report.
#[instrument(skip_all)]
pub async fn migrate(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<MigrationReport>> {
    let storage = state.storage()?;
    tracing::info!(admin = %admin.email, "image migration requested");
    let report = migrate_images(state.pool(), storage).await?;
    Ok(Json(report))
}
