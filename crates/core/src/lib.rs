//! Atelier Core - Shared types and the catalog filtering engine.
//!
//! This crate provides the pieces shared by every Atelier component:
//! - `storefront` - Public shop API (listing, brand pages, checkout, try-on)
//! - `admin` - Back-office API (catalog upkeep, orders, uploads)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. The optional `postgres` feature adds `sqlx` type
//! impls, product row mapping and SQL rendering of catalog predicates, none of
//! which open a connection.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, slugs and statuses
//! - [`catalog`] - Products, brands, facet options and the filtering engine
//! - [`order`] - Orders, checkout totals, discounts and shipping times

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod order;
pub mod types;

pub use types::*;
