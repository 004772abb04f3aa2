//! Integration tests for Atelier.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atelier-integration-tests
//! ```
//!
//! None of these tests need a running database: the routers get a lazily
//! connected pool and only requests answered before any query are sent.
//!
//! # Test Categories
//!
//! - `catalog_listing` - URL → filter → narrowing → pagination, end to end
//! - `sql_rendering` - Listing URLs rendered to `PostgreSQL`
//! - `http_surface` - Storefront and admin routers

use std::net::IpAddr;

use axum::Router;
use chrono::{TimeZone, Utc};
use secrecy::SecretString;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use atelier_core::catalog::{Facet, FacetMemberships, FacetOption, Product};
use atelier_core::{FacetOptionId, Price, ProductId};

/// A product with the given memberships, priced at 10.00.
#[must_use]
pub fn product(id: &str, facets: FacetMemberships) -> Product {
    Product {
        id: ProductId::new(id),
        name: id.to_owned(),
        price: Price::from_minor(1_000),
        original_price: None,
        description: String::new(),
        images: vec![],
        facets,
        tags: vec![],
        featured: false,
        new_arrival: false,
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().unwrap_or_default(),
    }
}

/// A facet option.
#[must_use]
pub fn option(facet: Facet, id: &str, sort_order: i32) -> FacetOption {
    FacetOption {
        id: FacetOptionId::new(id),
        facet,
        name: id.to_uppercase(),
        sort_order,
        attributes: serde_json::Map::new(),
    }
}

/// A pool that never connects unless a query runs.
///
/// # Panics
///
/// Panics if the hardcoded URL cannot be parsed.
#[must_use]
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/atelier_test")
        .expect("valid database URL")
}

/// The storefront router with an in-memory session store.
///
/// # Panics
///
/// Panics if the state cannot be built.
#[must_use]
pub fn storefront_app() -> Router {
    let config = atelier_storefront::config::StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/atelier_test"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("x".repeat(32)),
        try_on: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    let state = atelier_storefront::state::AppState::new(config, lazy_pool())
        .expect("storefront state");
    atelier_storefront::app(state).layer(SessionManagerLayer::new(MemoryStore::default()))
}

/// The admin router with an in-memory session store.
///
/// # Panics
///
/// Panics if the state cannot be built.
#[must_use]
pub fn admin_app() -> Router {
    let config = atelier_admin::config::AdminConfig {
        database_url: SecretString::from("postgres://localhost/atelier_test"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3001,
        base_url: "http://localhost:3001".to_string(),
        session_secret: SecretString::from("y".repeat(32)),
        storage: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    let state = atelier_admin::state::AppState::new(config, lazy_pool()).expect("admin state");
    atelier_admin::app(state).layer(SessionManagerLayer::new(MemoryStore::default()))
}
