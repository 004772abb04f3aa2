//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog
//! GET  /products               - Filtered product listing
//! GET  /products/{id}          - Product detail
//! GET  /brands                 - Brand directory
//! GET  /brands/{slug}          - Brand page (brand facet pinned)
//! GET  /facets/{facet}         - Options of one facet
//! GET  /shipping-times         - Delivery windows
//! GET  /settings/{key}         - Public store setting
//!
//! # Checkout
//! POST /checkout               - Place an order
//! GET  /checkout/confirmation  - Last order placed in this session
//!
//! # Try-on
//! POST /api/try-on             - Dress a photo in a garment
//!
//! # Auth
//! POST /auth/register          - Create an account
//! POST /auth/login             - Sign in
//! POST /auth/logout            - Sign out
//! GET  /auth/me                - Current user
//! ```

pub mod auth;
pub mod brands;
pub mod catalog;
pub mod checkout;
pub mod listing;
pub mod products;
pub mod tryon;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::services::tryon::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Base64 inflates by 4/3; leave headroom for the JSON envelope.
const TRY_ON_BODY_LIMIT: usize = MAX_IMAGE_BYTES / 3 * 4 + 64 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/brands", get(brands::index))
        .route("/brands/{slug}", get(brands::show))
        .route("/facets/{facet}", get(catalog::facet_options))
        .route("/shipping-times", get(catalog::shipping_times))
        .route("/settings/{key}", get(catalog::setting))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::place_order))
        .route("/confirmation", get(checkout::confirmation))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/checkout", checkout_routes())
        .route(
            "/api/try-on",
            post(tryon::generate).layer(DefaultBodyLimit::max(TRY_ON_BODY_LIMIT)),
        )
        .nest("/auth", auth_routes())
}
