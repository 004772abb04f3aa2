//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Readiness check (database)
//!
//! # Auth
//! POST   /auth/login                  - Sign in (admin accounts only)
//! POST   /auth/logout                 - Sign out
//!
//! # Catalog (admin only)
//! GET    /api/products                - Filtered product list with name search
//! POST   /api/products                - Create a product
//! GET    /api/products/{id}           - Product detail
//! PUT    /api/products/{id}           - Replace a product
//! DELETE /api/products/{id}           - Delete a product
//! GET    /api/brands                  - Brand list
//! POST   /api/brands                  - Create a brand
//! GET    /api/facets/{facet}          - Options of one facet
//! POST   /api/facets/{facet}          - Create an option
//! POST   /api/facets/{facet}/{id}/move - Swap with the neighbour above/below
//!
//! # Orders (admin only)
//! GET    /api/orders                  - Order list, optional ?status=
//! GET    /api/orders/{id}             - Order detail
//! POST   /api/orders/{id}/status      - Change status
//!
//! # Settings (admin only)
//! GET    /api/settings/{key}          - Setting document
//! PUT    /api/settings/{key}          - Replace a setting document
//!
//! # Media (admin only)
//! POST   /api/uploads                 - Upload a file or copy one from a URL
//! POST   /api/images/migrate          - Re-host product images into the bucket
//! ```

pub mod auth;
pub mod brands;
pub mod facets;
pub mod images;
pub mod orders;
pub mod products;
pub mod settings;
pub mod uploads;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::services::storage::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Room for multipart framing around the file.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the back-office API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/brands", get(brands::index).post(brands::create))
        .route("/facets/{facet}", get(facets::index).post(facets::create))
        .route("/facets/{facet}/{id}/move", post(facets::move_option))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        .route(
            "/settings/{key}",
            get(settings::show).put(settings::update),
        )
        .route(
            "/uploads",
            post(uploads::create).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/images/migrate", post(images::migrate))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}
