//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Email/password sign-in restricted to admin accounts
//! - `storage` - S3 uploads signed with AWS Signature Version 4
//! - `image_migration` - Bulk re-hosting of product images into the bucket

pub mod auth;
pub mod image_migration;
pub mod storage;

pub use auth::{AdminAuthError, AdminAuthService};
pub use image_migration::{MigrationReport, migrate_images};
pub use storage::{StorageClient, StorageError, Upload};
