//! Catalog seeding from a YAML file.
//!
//! # Usage
//!
//! ```bash
//! atelier-cli seed catalog.yaml
//! ```
//!
//! # File Format
//!
//! ```yaml
//! facetOptions:
//!   colours:
//!     - { id: red, name: Red, attributes: { hex: "#c0392b" } }
//!     - { id: ivory, name: Ivory }
//!   sizes:
//!     - { id: s, name: S, sortOrder: 1 }
//! brands:
//!   - { id: zara, name: Zara Home }
//! products:
//!   linen-dress:
//!     name: Linen Dress
//!     price: "89.00"
//!     colourIds: [ivory]
//!     brandIds: [zara]
//! discounts:
//!   - { code: SPRING10, percentOff: 10 }
//! shippingTimes:
//!   - { id: standard, label: Standard, minDays: 3, maxDays: 5 }
//! ```
//!
//! Options and shipping times without a `sortOrder` take their position in
//! the list. Discounts are active unless `active: false`. Every record is
//! upserted, so re-running a seed file updates it in place.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use atelier_admin::db::{
    self, BrandRepository, CheckoutOptionRepository, FacetOptionRepository, ProductRepository,
    RepositoryError,
};
use atelier_core::catalog::{Brand, Facet, FacetOption, Product, ProductInput};
use atelier_core::order::{Discount, ShippingTime};
use atelier_core::{FacetOptionId, ProductId, ShippingTimeId};

/// Errors from the seed command.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: ADMIN_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0}")]
    Invalid(String),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedOption {
    id: String,
    name: String,
    #[serde(default)]
    sort_order: Option<i32>,
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedDiscount {
    code: String,
    percent_off: u8,
    #[serde(default = "active_by_default")]
    active: bool,
}

const fn active_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedShippingTime {
    id: String,
    label: String,
    min_days: i32,
    max_days: i32,
    #[serde(default)]
    sort_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedFile {
    #[serde(default)]
    facet_options: BTreeMap<String, Vec<SeedOption>>,
    #[serde(default)]
    brands: Vec<Brand>,
    #[serde(default)]
    products: BTreeMap<String, ProductInput>,
    #[serde(default)]
    discounts: Vec<SeedDiscount>,
    #[serde(default)]
    shipping_times: Vec<SeedShippingTime>,
}

/// A validated seed file, ready to write.
#[derive(Debug)]
pub struct SeedPlan {
    pub options: Vec<FacetOption>,
    pub brands: Vec<Brand>,
    pub products: Vec<Product>,
    pub discounts: Vec<Discount>,
    pub shipping_times: Vec<ShippingTime>,
}

impl SeedPlan {
    /// Parse and validate a seed document.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` for malformed YAML and `SeedError::Invalid`
    /// for unknown facets, brand options listed under `facetOptions`, or
    /// products, discounts or shipping times that fail validation.
    pub fn parse(content: &str) -> Result<Self, SeedError> {
        let file: SeedFile = serde_yaml::from_str(content)?;

        let mut options = Vec::new();
        for (facet_name, entries) in file.facet_options {
            let facet: Facet = facet_name.parse().map_err(SeedError::Invalid)?;
            if facet == Facet::Brand {
                return Err(SeedError::Invalid(
                    "brand options belong under `brands`".to_owned(),
                ));
            }
            for (position, entry) in (1..).zip(entries) {
                options.push(FacetOption {
                    id: FacetOptionId::new(entry.id),
                    facet,
                    name: entry.name,
                    sort_order: entry.sort_order.unwrap_or(position),
                    attributes: entry.attributes,
                });
            }
        }

        let now = Utc::now();
        let mut products = Vec::with_capacity(file.products.len());
        for (id, input) in file.products {
            input
                .validate()
                .map_err(|e| SeedError::Invalid(format!("product {id}: {e}")))?;
            products.push(input.into_product(ProductId::new(id), now));
        }

        let mut discounts = Vec::with_capacity(file.discounts.len());
        for entry in file.discounts {
            let discount = Discount {
                code: Discount::normalise_code(&entry.code),
                percent_off: entry.percent_off,
                active: entry.active,
            };
            discount
                .validate()
                .map_err(|e| SeedError::Invalid(format!("discount {}: {e}", discount.code)))?;
            discounts.push(discount);
        }

        let mut shipping_times = Vec::with_capacity(file.shipping_times.len());
        for (position, entry) in (1..).zip(file.shipping_times) {
            let shipping = ShippingTime {
                id: ShippingTimeId::new(entry.id),
                label: entry.label,
                min_days: entry.min_days,
                max_days: entry.max_days,
                sort_order: entry.sort_order.unwrap_or(position),
            };
            shipping
                .validate()
                .map_err(|e| SeedError::Invalid(format!("shipping time {}: {e}", shipping.id)))?;
            shipping_times.push(shipping);
        }

        Ok(Self {
            options,
            brands: file.brands,
            products,
            discounts,
            shipping_times,
        })
    }
}

/// Load a seed file into the catalog.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, or a write fails.
pub async fn catalog(file_path: &str) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: file_path.to_owned(),
            source,
        })?;

    // Validate before touching the database
    let plan = SeedPlan::parse(&content)?;
    tracing::info!(
        options = plan.options.len(),
        brands = plan.brands.len(),
        products = plan.products.len(),
        discounts = plan.discounts.len(),
        shipping_times = plan.shipping_times.len(),
        "Parsed seed file"
    );

    let database_url = super::database_url().ok_or(SeedError::MissingDatabaseUrl)?;
    let pool = db::create_pool(&database_url).await?;

    let facets = FacetOptionRepository::new(&pool);
    for option in &plan.options {
        facets.upsert(option).await?;
    }

    let brands = BrandRepository::new(&pool);
    for brand in &plan.brands {
        brands.save(brand).await?;
    }

    let products = ProductRepository::new(&pool);
    for product in &plan.products {
        products.upsert(product).await?;
    }

    let checkout = CheckoutOptionRepository::new(&pool);
    for discount in &plan.discounts {
        checkout.upsert_discount(discount).await?;
    }
    for shipping in &plan.shipping_times {
        checkout.upsert_shipping_time(shipping).await?;
    }

    tracing::info!("Seeding complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SEED: &str = r##"
facetOptions:
  colours:
    - { id: red, name: Red, attributes: { hex: "#c0392b" } }
    - { id: ivory, name: Ivory }
  sizes:
    - { id: s, name: S, sortOrder: 10 }
brands:
  - { id: zara, name: Zara Home }
products:
  linen-dress:
    name: Linen Dress
    price: "89.00"
    colourIds: [ivory]
    brandIds: [zara]
    tags: [Summer]
discounts:
  - { code: spring10, percentOff: 10 }
  - { code: STAFF, percentOff: 30, active: false }
shippingTimes:
  - { id: standard, label: Standard, minDays: 3, maxDays: 5 }
  - { id: express, label: Express, minDays: 1, maxDays: 1 }
"##;

    #[test]
    fn test_parse_seed_file() {
        let plan = SeedPlan::parse(SEED).unwrap();

        let colours: Vec<_> = plan
            .options
            .iter()
            .filter(|o| o.facet == Facet::Colour)
            .map(|o| (o.id.as_str(), o.sort_order))
            .collect();
        assert_eq!(colours, [("red", 1), ("ivory", 2)]);
        let size = plan.options.iter().find(|o| o.facet == Facet::Size).unwrap();
        assert_eq!(size.sort_order, 10);

        assert_eq!(plan.brands[0].name, "Zara Home");

        let dress = &plan.products[0];
        assert_eq!(dress.id.as_str(), "linen-dress");
        assert_eq!(dress.facets.get(Facet::Brand), [FacetOptionId::new("zara")]);
    }

    #[test]
    fn test_brand_options_must_use_brands_section() {
        let err = SeedPlan::parse("facetOptions:\n  brands:\n    - { id: x, name: X }\n")
            .unwrap_err();
        assert!(matches!(err, SeedError::Invalid(_)));
    }

    #[test]
    fn test_unknown_facet_is_rejected() {
        let err = SeedPlan::parse("facetOptions:\n  flavours: []\n").unwrap_err();
        assert!(err.to_string().contains("flavours"));
    }

    #[test]
    fn test_invalid_product_is_rejected() {
        let err = SeedPlan::parse("products:\n  p1:\n    name: ''\n    price: '10.00'\n")
            .unwrap_err();
        assert!(err.to_string().contains("p1"));
    }

    #[test]
    fn test_empty_file_is_an_empty_plan() {
        let plan = SeedPlan::parse("{}").unwrap();
        assert!(plan.options.is_empty() && plan.brands.is_empty() && plan.products.is_empty());
        assert!(plan.discounts.is_empty() && plan.shipping_times.is_empty());
    }

    #[test]
    fn test_parse_discounts_and_shipping_times() {
        let plan = SeedPlan::parse(SEED).unwrap();

        let discounts: Vec<_> = plan
            .discounts
            .iter()
            .map(|d| (d.code.as_str(), d.percent_off, d.active))
            .collect();
        assert_eq!(discounts, [("SPRING10", 10, true), ("STAFF", 30, false)]);

        let shipping: Vec<_> = plan
            .shipping_times
            .iter()
            .map(|s| (s.id.as_str(), s.min_days, s.max_days, s.sort_order))
            .collect();
        assert_eq!(shipping, [("standard", 3, 5, 1), ("express", 1, 1, 2)]);
    }

    #[test]
    fn test_discount_percent_out_of_range_is_rejected() {
        for percent in [0, 101] {
            let seed = format!("discounts:\n  - {{ code: half, percentOff: {percent} }}\n");
            let err = SeedPlan::parse(&seed).unwrap_err();
            assert!(matches!(err, SeedError::Invalid(_)), "{percent}");
            assert!(err.to_string().contains("HALF"));
        }
    }

    #[test]
    fn test_shipping_time_with_inverted_days_is_rejected() {
        let err = SeedPlan::parse(
            "shippingTimes:\n  - { id: slow, label: Slow, minDays: 9, maxDays: 4 }\n",
        )
        .unwrap_err();
        assert!(matches!(err, SeedError::Invalid(_)));
        assert!(err.to_string().contains("slow"));
    }
}
