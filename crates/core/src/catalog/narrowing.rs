//! Facet-option narrowing.
//!
//! After every query the filter panel offers only options that appear on at
//! least one product in the current result set. Availability comes from the
//! filtered set, so picking a category can hide colours that only products in
//! other categories carry.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::facet::Facet;
use super::option::FacetOption;
use super::product::Product;
use crate::types::FacetOptionId;

/// Option IDs present in a result set, with product counts, per facet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetAvailability {
    counts: HashMap<Facet, HashMap<FacetOptionId, usize>>,
}

impl FacetAvailability {
    /// Tally option membership over `products`.
    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let mut counts: HashMap<Facet, HashMap<FacetOptionId, usize>> = HashMap::new();
        for product in products {
            for facet in Facet::ALL {
                let ids = product.facets.get(facet);
                if ids.is_empty() {
                    continue;
                }
                let per_facet = counts.entry(facet).or_default();
                // A product listing an option twice still counts once.
                let mut seen: Vec<&FacetOptionId> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !seen.contains(&id) {
                        seen.push(id);
                        *per_facet.entry(id.clone()).or_insert(0) += 1;
                    }
                }
            }
        }
        Self { counts }
    }

    /// Number of products in the set carrying `option` under `facet`.
    #[must_use]
    pub fn count(&self, facet: Facet, option: &FacetOptionId) -> usize {
        self.counts
            .get(&facet)
            .and_then(|per_facet| per_facet.get(option))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn is_available(&self, facet: Facet, option: &FacetOptionId) -> bool {
        self.count(facet, option) > 0
    }

    /// Keep only the options of `facet` present in the result set, preserving
    /// their order.
    #[must_use]
    pub fn narrow<'a>(&self, facet: Facet, options: &'a [FacetOption]) -> Vec<&'a FacetOption> {
        options
            .iter()
            .filter(|option| self.is_available(facet, &option.id))
            .collect()
    }

    /// Narrow every facet in `facets`, attaching counts for the filter panel.
    #[must_use]
    pub fn narrow_all(
        &self,
        facets: impl IntoIterator<Item = Facet>,
        options: &BTreeMap<Facet, Vec<FacetOption>>,
    ) -> BTreeMap<Facet, Vec<AvailableOption>> {
        facets
            .into_iter()
            .map(|facet| {
                let available = options
                    .get(&facet)
                    .map(|all| {
                        self.narrow(facet, all)
                            .into_iter()
                            .map(|option| AvailableOption {
                                option: option.clone(),
                                count: self.count(facet, &option.id),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                (facet, available)
            })
            .collect()
    }
}

/// A facet option that matches at least one product in the current results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableOption {
    #[serde(flatten)]
    pub option: FacetOption,
    pub count: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::catalog::{FacetMemberships, FilterSelection, ProductQuery};
    use crate::types::{Price, ProductId};

    fn product(id: &str, category: &str, colours: &[&str]) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_owned(),
            price: Price::from_minor(2_000),
            original_price: None,
            description: String::new(),
            images: vec![],
            facets: FacetMemberships::default()
                .with(Facet::Category, &[category])
                .with(Facet::Colour, colours),
            tags: vec![],
            featured: false,
            new_arrival: false,
            created_at: Utc::now(),
        }
    }

    fn colour(id: &str) -> FacetOption {
        FacetOption {
            id: FacetOptionId::new(id),
            facet: Facet::Colour,
            name: id.to_uppercase(),
            sort_order: 0,
            attributes: serde_json::Map::new(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("p1", "dresses", &["red", "black"]),
            product("p2", "dresses", &["red"]),
            product("p3", "dresses", &["blue"]),
            product("p4", "coats", &["red", "green"]),
            product("p5", "coats", &["black"]),
            product("p6", "coats", &["white"]),
            product("p7", "shoes", &["red", "yellow"]),
            product("p8", "shoes", &["brown"]),
            product("p9", "bags", &["pink"]),
            product("p10", "bags", &["red", "beige"]),
        ]
    }

    #[test]
    fn test_category_then_colour_narrows_other_facet() {
        let products = catalog();
        let colours: Vec<FacetOption> = ["red", "black", "blue", "green", "white", "yellow", "brown", "pink", "beige"]
            .into_iter()
            .map(colour)
            .collect();

        let selection = FilterSelection::new()
            .with_set(Facet::Category, [FacetOptionId::new("dresses")])
            .with_set(Facet::Colour, [FacetOptionId::new("red")]);
        let results = ProductQuery::new()
            .with_selection(&selection)
            .execute(&products)
            .unwrap();
        let ids: Vec<_> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2"]);

        let availability = FacetAvailability::from_products(results.iter().copied());
        let offered: Vec<_> = availability
            .narrow(Facet::Colour, &colours)
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        // Green and yellow exist on red products outside the category.
        assert_eq!(offered, ["red", "black"]);
        assert_eq!(availability.count(Facet::Colour, &FacetOptionId::new("red")), 2);
        assert_eq!(availability.count(Facet::Colour, &FacetOptionId::new("green")), 0);
    }

    #[test]
    fn test_never_offers_zero_match_options() {
        let products = catalog();
        let colours: Vec<FacetOption> = ["red", "black", "blue", "green", "white", "yellow", "brown", "pink", "beige", "navy"]
            .into_iter()
            .map(colour)
            .collect();
        for category in ["dresses", "coats", "shoes", "bags", "hats"] {
            let selection = FilterSelection::new().with_set(Facet::Category, [FacetOptionId::new(category)]);
            let results = ProductQuery::new()
                .with_selection(&selection)
                .execute(&products)
                .unwrap();
            let availability = FacetAvailability::from_products(results.iter().copied());
            for option in availability.narrow(Facet::Colour, &colours) {
                let id = option.id.as_str();
                assert!(results.iter().any(|p| p.facets.get(Facet::Colour).iter().any(|c| c.as_str() == id)));
            }
        }
    }

    #[test]
    fn test_narrow_all_attaches_counts() {
        let products = catalog();
        let availability = FacetAvailability::from_products(&products);
        let mut options = BTreeMap::new();
        options.insert(Facet::Colour, vec![colour("red"), colour("navy")]);

        let narrowed = availability.narrow_all([Facet::Colour, Facet::Size], &options);
        assert_eq!(narrowed[&Facet::Colour].len(), 1);
        assert_eq!(narrowed[&Facet::Colour][0].count, 5);
        assert!(narrowed[&Facet::Size].is_empty());
    }
}
