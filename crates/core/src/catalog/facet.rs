//! Product facets and the fields predicates can target.
//!
//! Every facet is an independent, multi-valued membership list on a product.
//! The same facet is known by three names: its product field (`categoryIds`,
//! used in URLs and JSON), its option collection (`categories`) and its
//! database column (`category_ids`).

use serde::{Deserialize, Serialize};

/// A filterable facet of the product catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Facet {
    #[serde(rename = "categoryIds")]
    Category,
    #[serde(rename = "sizeIds")]
    Size,
    #[serde(rename = "colourIds")]
    Colour,
    #[serde(rename = "brandIds")]
    Brand,
    #[serde(rename = "materialTypeIds")]
    MaterialType,
    #[serde(rename = "finishTypeIds")]
    FinishType,
    #[serde(rename = "adhesiveIds")]
    Adhesive,
    #[serde(rename = "handleIds")]
    Handle,
    #[serde(rename = "shapeIds")]
    Shape,
    #[serde(rename = "lidIds")]
    Lid,
}

impl Facet {
    /// Every facet, in display order.
    pub const ALL: [Self; 10] = [
        Self::Category,
        Self::Size,
        Self::Colour,
        Self::Brand,
        Self::MaterialType,
        Self::FinishType,
        Self::Adhesive,
        Self::Handle,
        Self::Shape,
        Self::Lid,
    ];

    /// Product field name, as used in URLs and JSON bodies.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Category => "categoryIds",
            Self::Size => "sizeIds",
            Self::Colour => "colourIds",
            Self::Brand => "brandIds",
            Self::MaterialType => "materialTypeIds",
            Self::FinishType => "finishTypeIds",
            Self::Adhesive => "adhesiveIds",
            Self::Handle => "handleIds",
            Self::Shape => "shapeIds",
            Self::Lid => "lidIds",
        }
    }

    /// Name of the collection holding this facet's options.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Category => "categories",
            Self::Size => "sizes",
            Self::Colour => "colours",
            Self::Brand => "brands",
            Self::MaterialType => "materialTypes",
            Self::FinishType => "finishTypes",
            Self::Adhesive => "adhesives",
            Self::Handle => "handles",
            Self::Shape => "shapes",
            Self::Lid => "lids",
        }
    }

    /// Database column holding a product's memberships for this facet.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Category => "category_ids",
            Self::Size => "size_ids",
            Self::Colour => "colour_ids",
            Self::Brand => "brand_ids",
            Self::MaterialType => "material_type_ids",
            Self::FinishType => "finish_type_ids",
            Self::Adhesive => "adhesive_ids",
            Self::Handle => "handle_ids",
            Self::Shape => "shape_ids",
            Self::Lid => "lid_ids",
        }
    }

    /// Label for filter panels.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Size => "Size",
            Self::Colour => "Colour",
            Self::Brand => "Brand",
            Self::MaterialType => "Material",
            Self::FinishType => "Finish",
            Self::Adhesive => "Adhesive",
            Self::Handle => "Handle",
            Self::Shape => "Shape",
            Self::Lid => "Lid",
        }
    }

    /// Look up a facet by its product field name (`categoryIds`).
    #[must_use]
    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.field_name() == name)
    }

    /// Look up a facet by its option collection name (`categories`).
    #[must_use]
    pub fn from_collection(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.collection() == name)
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

impl std::str::FromStr for Facet {
    type Err = String;

    /// Accepts either the field name or the collection name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_field_name(s)
            .or_else(|| Self::from_collection(s))
            .ok_or_else(|| format!("unknown facet: {s}"))
    }
}

/// Multi-valued product fields that list predicates can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ListField {
    Facet(Facet),
    Tags,
}

impl ListField {
    /// Database column backing this field.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Facet(facet) => facet.column(),
            Self::Tags => "tags",
        }
    }

    /// Product field name, for error messages and URLs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Facet(facet) => facet.field_name(),
            Self::Tags => "tags",
        }
    }
}

/// Single-valued boolean product fields that equality predicates can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FlagField {
    Featured,
    NewArrival,
}

impl FlagField {
    /// Database column backing this field.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::NewArrival => "new_arrival",
        }
    }

    /// Product field name, as used in URLs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::NewArrival => "newArrival",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_consistent() {
        for facet in Facet::ALL {
            assert_eq!(Facet::from_field_name(facet.field_name()), Some(facet));
            assert_eq!(Facet::from_collection(facet.collection()), Some(facet));
            let json = serde_json::to_string(&facet).unwrap();
            assert_eq!(json, format!("\"{}\"", facet.field_name()));
        }
    }

    #[test]
    fn test_from_str_accepts_both_names() {
        assert_eq!("colourIds".parse(), Ok(Facet::Colour));
        assert_eq!("materialTypes".parse(), Ok(Facet::MaterialType));
        assert!("flavours".parse::<Facet>().is_err());
    }
}
