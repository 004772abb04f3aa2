//! Virtual try-on.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::services::tryon::DataUri;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnRequest {
    /// The shopper's photo as a base64 data URI.
    pub photo: String,
    pub garment_url: String,
}

#[derive(Debug, Serialize)]
pub struct TryOnResponse {
    /// Generated image as a data URI.
    pub image: String,
}

/// `POST /api/try-on`
#[instrument(skip_all, fields(garment_url = %req.garment_url))]
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<TryOnRequest>,
) -> Result<Json<TryOnResponse>> {
    let client = state.try_on()?;
    let photo = DataUri::parse(&req.photo)?;
    let image = client.generate(&photo, &req.garment_url).await?;
    Ok(Json(TryOnResponse {
        image: image.encode(),
    }))
}
