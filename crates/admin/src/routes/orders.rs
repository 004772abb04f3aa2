//! Order list and status changes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use atelier_core::order::{Order, Transition};
use atelier_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Order list filter.
#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub status: Option<String>,
}

impl OrderFilter {
    fn status(&self) -> Result<Option<OrderStatus>> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .map_err(|_| AppError::BadRequest(format!("unknown order status: {s}")))
            })
            .transpose()
    }
}

/// `GET /api/orders`, newest first.
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list(filter.status()?)
        .await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}`
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get(&OrderId::new(id.clone()))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

/// Status change request body.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
}

/// Status change response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub order: Order,
    pub changed: bool,
    /// Set when the order moved against the fulfilment path.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub backward: bool,
}

/// `POST /api/orders/{id}/status`. Any status may follow any other.
#[instrument(skip_all, fields(order_id = %id, status = %change.status))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Result<Json<StatusChangeResponse>> {
    let (order, transition) = OrderRepository::new(state.pool())
        .update_status(&OrderId::new(id.clone()), change.status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    tracing::debug!(admin = %admin.email, ?transition, "status change applied");

    Ok(Json(StatusChangeResponse {
        order,
        changed: transition != Transition::Unchanged,
        backward: matches!(transition, Transition::Backward { .. }),
    }))
}
