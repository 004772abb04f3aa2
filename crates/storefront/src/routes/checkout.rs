//! Checkout and order confirmation.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use atelier_core::order::{CartLine, CheckoutError, Discount, Order, ShippingDetails, price_cart};
use atelier_core::{OrderId, ProductId};

use crate::db::{CheckoutRepository, OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::session_keys;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub shipping: ShippingDetails,
    #[serde(default)]
    pub discount_code: Option<String>,
}

/// `POST /checkout`: price the cart server-side and place the order.
///
/// The placed order is stored in the session for the confirmation page.
#[instrument(skip_all, fields(lines = req.items.len()))]
pub async fn place_order(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let pool = state.pool();
    let checkout = CheckoutRepository::new(pool);

    req.shipping.validate()?;
    if let Some(id) = &req.shipping.shipping_time_id
        && !checkout.shipping_time_exists(id).await?
    {
        return Err(AppError::BadRequest(format!("unknown shipping time {id}")));
    }

    let discount = match req
        .discount_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
    {
        Some(code) => Some(checkout.discount(code).await?.ok_or_else(|| {
            CheckoutError::InvalidDiscount(Discount::normalise_code(code))
        })?),
        None => None,
    };

    let mut ids: Vec<ProductId> = req.items.iter().map(|l| l.product_id.clone()).collect();
    ids.sort_unstable_by(|a, b| a.as_str().cmp(b.as_str()));
    ids.dedup();
    let products = ProductRepository::new(pool).get_many(&ids).await?;

    let priced = price_cart(&req.items, &products, discount.as_ref())?;
    let order = Order::place(
        OrderId::generate(),
        user.map(|u| u.id),
        priced,
        req.shipping,
        Utc::now(),
    );

    OrderRepository::new(pool).create(&order).await?;
    session.insert(session_keys::LATEST_ORDER, &order).await?;

    tracing::info!(
        order_id = %order.id,
        total = %order.total.amount(),
        units = order.unit_count(),
        "order placed"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /checkout/confirmation`: the order just placed in this session.
///
/// Without one (or if it no longer parses) the shopper is sent home.
pub async fn confirmation(session: Session) -> Response {
    match session.get::<Order>(session_keys::LATEST_ORDER).await {
        Ok(Some(order)) => Json(order).into_response(),
        Ok(None) => Redirect::to("/").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "unreadable order in session");
            Redirect::to("/").into_response()
        }
    }
}
