//! Brands and their URL slugs.

use serde::{Deserialize, Serialize};

use super::{Facet, FacetOption};
use crate::types::{BrandId, FacetOptionId, Slug, SlugError};

/// A brand. Its product memberships live on [`super::Product::facets`] under
/// [`super::Facet::Brand`]; the brand's ID doubles as that facet option ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    /// Explicit slug. When absent, one is derived from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Brand {
    /// The slug this brand is reachable under.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] when there is no stored slug and the name
    /// contains no slug characters.
    pub fn effective_slug(&self) -> Result<Slug, SlugError> {
        match &self.slug {
            Some(slug) => Ok(slug.clone()),
            None => Slug::derive(&self.name),
        }
    }
}

impl From<Brand> for FacetOption {
    /// Brands double as the options of the brand facet.
    fn from(brand: Brand) -> Self {
        Self {
            id: FacetOptionId::new(brand.id.as_str()),
            facet: Facet::Brand,
            name: brand.name,
            sort_order: 0,
            attributes: serde_json::Map::new(),
        }
    }
}

/// Find the brand reachable under `slug`.
///
/// Brands are searched in name order and the first match wins, so two brands
/// that normalise to the same slug resolve to the alphabetically first one.
#[must_use]
pub fn find_by_slug<'a>(brands: &'a [Brand], slug: &str) -> Option<&'a Brand> {
    let mut ordered: Vec<&Brand> = brands.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));
    ordered
        .into_iter()
        .find(|brand| brand.effective_slug().is_ok_and(|s| s.as_str() == slug))
}

/// Slugs shared by more than one brand, with the brands sharing them.
#[must_use]
pub fn slug_collisions(brands: &[Brand]) -> Vec<(Slug, Vec<BrandId>)> {
    let mut by_slug: std::collections::BTreeMap<Slug, Vec<BrandId>> =
        std::collections::BTreeMap::new();
    for brand in brands {
        if let Ok(slug) = brand.effective_slug() {
            by_slug.entry(slug).or_default().push(brand.id.clone());
        }
    }
    by_slug.into_iter().filter(|(_, ids)| ids.len() > 1).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn brand(id: &str, name: &str, slug: Option<&str>) -> Brand {
        Brand {
            id: BrandId::new(id),
            name: name.to_owned(),
            slug: slug.map(|s| Slug::parse(s).unwrap()),
            description: None,
        }
    }

    #[test]
    fn test_effective_slug_derives_from_name() {
        let b = brand("b1", "Zara Home", None);
        assert_eq!(b.effective_slug().unwrap().as_str(), "zara-home");
    }

    #[test]
    fn test_stored_slug_wins() {
        let b = brand("b1", "Zara Home", Some("zh"));
        assert_eq!(b.effective_slug().unwrap().as_str(), "zh");
    }

    #[test]
    fn test_find_by_slug_prefers_first_by_name() {
        let brands = vec![
            brand("b2", "Zara  Home", None),
            brand("b1", "Zara Home", None),
            brand("b3", "Mango", None),
        ];
        let found = find_by_slug(&brands, "zara-home").unwrap();
        assert_eq!(found.id.as_str(), "b2");
        assert!(find_by_slug(&brands, "missing").is_none());

        let collisions = slug_collisions(&brands);
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].0.as_str(), "zara-home");
        assert_eq!(collisions[0].1.len(), 2);
    }
}
