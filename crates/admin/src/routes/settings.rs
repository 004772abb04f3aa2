//! Store setting documents.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value as JsonValue;
use tracing::instrument;

use crate::db::SettingsRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// `GET /api/settings/{key}`
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<JsonValue>> {
    SettingsRepository::new(state.pool())
        .get(&key)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("setting {key}")))
}

/// `PUT /api/settings/{key}`: replace the whole document.
#[instrument(skip_all, fields(key = %key))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<JsonValue>,
) -> Result<Json<JsonValue>> {
    if !value.is_object() {
        return Err(AppError::BadRequest(
            "setting documents must be JSON objects".to_string(),
        ));
    }
    SettingsRepository::new(state.pool()).upsert(&key, &value).await?;
    tracing::info!(admin = %admin.email, "setting updated");
    Ok(Json(value))
}
