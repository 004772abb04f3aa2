//! Product documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::facet::Facet;
use crate::types::{FacetOptionId, Price, ProductId};

/// An image attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    /// Marks the image shown on listing cards.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary: bool,
    /// Alt text / styling hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// A product's membership lists, one per facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetMemberships {
    #[serde(default)]
    pub category_ids: Vec<FacetOptionId>,
    #[serde(default)]
    pub size_ids: Vec<FacetOptionId>,
    #[serde(default)]
    pub colour_ids: Vec<FacetOptionId>,
    #[serde(default)]
    pub brand_ids: Vec<FacetOptionId>,
    #[serde(default)]
    pub material_type_ids: Vec<FacetOptionId>,
    #[serde(default)]
    pub finish_type_ids: Vec<FacetOptionId>,
    #[serde(default)]
    pub adhesive_ids: Vec<FacetOptionId>,
    #[serde(default)]
    pub handle_ids: Vec<FacetOptionId>,
    #[serde(default)]
    pub shape_ids: Vec<FacetOptionId>,
    #[serde(default)]
    pub lid_ids: Vec<FacetOptionId>,
}

impl FacetMemberships {
    /// The option IDs this product carries for `facet`.
    #[must_use]
    pub fn get(&self, facet: Facet) -> &[FacetOptionId] {
        match facet {
            Facet::Category => &self.category_ids,
            Facet::Size => &self.size_ids,
            Facet::Colour => &self.colour_ids,
            Facet::Brand => &self.brand_ids,
            Facet::MaterialType => &self.material_type_ids,
            Facet::FinishType => &self.finish_type_ids,
            Facet::Adhesive => &self.adhesive_ids,
            Facet::Handle => &self.handle_ids,
            Facet::Shape => &self.shape_ids,
            Facet::Lid => &self.lid_ids,
        }
    }

    /// Mutable access to the list for `facet`.
    pub fn get_mut(&mut self, facet: Facet) -> &mut Vec<FacetOptionId> {
        match facet {
            Facet::Category => &mut self.category_ids,
            Facet::Size => &mut self.size_ids,
            Facet::Colour => &mut self.colour_ids,
            Facet::Brand => &mut self.brand_ids,
            Facet::MaterialType => &mut self.material_type_ids,
            Facet::FinishType => &mut self.finish_type_ids,
            Facet::Adhesive => &mut self.adhesive_ids,
            Facet::Handle => &mut self.handle_ids,
            Facet::Shape => &mut self.shape_ids,
            Facet::Lid => &mut self.lid_ids,
        }
    }

    /// Builder-style setter, handy for fixtures and seeding.
    #[must_use]
    pub fn with(mut self, facet: Facet, ids: &[&str]) -> Self {
        *self.get_mut(facet) = ids.iter().map(|id| FacetOptionId::new(*id)).collect();
        self
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Pre-discount price, shown struck through when higher than `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(flatten)]
    pub facets: FacetMemberships,
    /// Free-form merchandising tags (e.g. `wedding`).
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub new_arrival: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The image to show on listing cards: the one flagged primary, else the
    /// first.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images
            .iter()
            .find(|img| img.primary)
            .or_else(|| self.images.first())
    }

    /// Whole-percent saving against the original price, if any.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u8> {
        self.price.discount_percent(self.original_price)
    }
}

/// Validation failures for [`ProductInput`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    #[error("product name cannot be empty")]
    EmptyName,
    #[error("price cannot be negative")]
    NegativePrice,
    #[error("original price must be higher than the price")]
    OriginalPriceNotHigher,
    #[error("image {0} has an empty URL")]
    EmptyImageUrl(usize),
    #[error("only one image can be primary")]
    MultiplePrimaryImages,
}

/// Editable product fields, as submitted by the admin product form or a seed
/// file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(flatten)]
    pub facets: FacetMemberships,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub new_arrival: bool,
}

impl ProductInput {
    /// Check the input before it is written.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProductValidationError`] found.
    pub fn validate(&self) -> Result<(), ProductValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        if self.price.is_negative() {
            return Err(ProductValidationError::NegativePrice);
        }
        if let Some(original) = self.original_price
            && original <= self.price
        {
            return Err(ProductValidationError::OriginalPriceNotHigher);
        }
        if let Some(index) = self.images.iter().position(|img| img.url.trim().is_empty()) {
            return Err(ProductValidationError::EmptyImageUrl(index));
        }
        if self.images.iter().filter(|img| img.primary).count() > 1 {
            return Err(ProductValidationError::MultiplePrimaryImages);
        }
        Ok(())
    }

    /// Materialise a product document with the given identity.
    #[must_use]
    pub fn into_product(self, id: ProductId, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name.trim().to_owned(),
            price: self.price,
            original_price: self.original_price,
            description: self.description,
            images: self.images,
            facets: self.facets,
            tags: normalise_tags(self.tags),
            featured: self.featured,
            new_arrival: self.new_arrival,
            created_at,
        }
    }
}

/// Lowercase, trim and de-duplicate tags, keeping first-seen order.
fn normalise_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: "Linen Shirt".to_owned(),
            price: Price::from_minor(4_500),
            original_price: None,
            description: String::new(),
            images: vec![],
            facets: FacetMemberships::default(),
            tags: vec![],
            featured: false,
            new_arrival: false,
        }
    }

    #[test]
    fn test_json_uses_field_names() {
        let product = input().into_product(ProductId::new("p1"), Utc::now());
        let json = serde_json::to_value(&product).unwrap();
        assert!(json.get("categoryIds").is_some());
        assert!(json.get("newArrival").is_some());
        assert!(json.get("originalPrice").is_none());
    }

    #[test]
    fn test_deserialize_defaults_missing_facets() {
        let product: Product = serde_json::from_str(
            r#"{"id":"p1","name":"Tote","price":"12.00","colourIds":["red"]}"#,
        )
        .unwrap();
        assert_eq!(product.facets.get(Facet::Colour), [FacetOptionId::new("red")]);
        assert!(product.facets.get(Facet::Lid).is_empty());
        assert!(product.images.is_empty());
    }

    #[test]
    fn test_primary_image_falls_back_to_first() {
        let mut product = input().into_product(ProductId::new("p1"), Utc::now());
        assert!(product.primary_image().is_none());

        product.images = vec![
            ProductImage { url: "a.jpg".into(), primary: false, hint: None },
            ProductImage { url: "b.jpg".into(), primary: true, hint: None },
        ];
        assert_eq!(product.primary_image().unwrap().url, "b.jpg");

        product.images[1].primary = false;
        assert_eq!(product.primary_image().unwrap().url, "a.jpg");
    }

    #[test]
    fn test_validate() {
        assert!(input().validate().is_ok());

        let mut bad = input();
        bad.name = "  ".into();
        assert_eq!(bad.validate(), Err(ProductValidationError::EmptyName));

        let mut bad = input();
        bad.original_price = Some(Price::from_minor(4_500));
        assert_eq!(bad.validate(), Err(ProductValidationError::OriginalPriceNotHigher));

        let mut bad = input();
        bad.images = vec![ProductImage { url: String::new(), primary: false, hint: None }];
        assert_eq!(bad.validate(), Err(ProductValidationError::EmptyImageUrl(0)));
    }

    #[test]
    fn test_into_product_normalises_tags() {
        let mut raw = input();
        raw.tags = vec![" Wedding".into(), "wedding".into(), String::new(), "Summer".into()];
        let product = raw.into_product(ProductId::new("p1"), Utc::now());
        assert_eq!(product.tags, ["wedding", "summer"]);
    }
}
