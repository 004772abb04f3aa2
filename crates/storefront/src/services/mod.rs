//! Business logic services for storefront.
//!
//! - `auth` - Email/password accounts (argon2)
//! - `tryon` - Virtual try-on through an image generation API

pub mod auth;
pub mod tryon;
