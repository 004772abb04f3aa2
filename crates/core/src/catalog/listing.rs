//! Listing requests parsed from URL parameters.

use serde::Serialize;

use super::facet::Facet;
use super::filter::FilterSelection;
use super::query::{FixedConstraint, ProductQuery};
use crate::types::FacetOptionId;

/// What a product listing URL asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingParams {
    pub selection: FilterSelection,
    pub fixed: Vec<FixedConstraint>,
    /// Requested 1-based page. Unparseable values fall back to 1; 0 is kept
    /// so the paginator can reject it.
    pub page: usize,
}

impl ListingParams {
    /// Parse `categoryIds=a,b&featured=true&tag=wedding&page=2`.
    pub fn from_query_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)> + Clone) -> Self {
        let page = pairs
            .clone()
            .into_iter()
            .filter(|(key, _)| *key == "page")
            .filter_map(|(_, value)| value.trim().parse::<usize>().ok())
            .last()
            .unwrap_or(1);
        Self {
            selection: FilterSelection::from_query_pairs(pairs.clone()),
            fixed: FixedConstraint::from_query_pairs(pairs),
            page,
        }
    }

    /// The query these parameters describe.
    #[must_use]
    pub fn query(&self) -> ProductQuery {
        ProductQuery::new()
            .with_fixed(&self.fixed)
            .with_selection(&self.selection)
    }

    /// Page title and description.
    ///
    /// `option_name` resolves option IDs to display names; a single selected
    /// category or brand names the page.
    pub fn heading(&self, option_name: impl Fn(Facet, &FacetOptionId) -> Option<String>) -> Heading {
        for constraint in &self.fixed {
            match constraint {
                FixedConstraint::Tag { tag } => {
                    let title = capitalise(tag);
                    return Heading {
                        description: format!("Pieces picked for {title}."),
                        title,
                    };
                }
                FixedConstraint::Featured => {
                    return Heading::new("Featured", "Our favourite pieces right now.");
                }
                FixedConstraint::NewArrival => {
                    return Heading::new("New Arrivals", "The latest additions to the shop.");
                }
                FixedConstraint::Option { .. } => {}
            }
        }
        for facet in [Facet::Category, Facet::Brand] {
            if let [only] = self.selection.get(facet)
                && let Some(name) = option_name(facet, only)
            {
                return Heading {
                    description: format!("Shop {name}."),
                    title: name,
                };
            }
        }
        Heading::new("All Products", "Browse the full collection.")
    }
}

/// Page title and meta description for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub title: String,
    pub description: String,
}

impl Heading {
    fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.to_owned(),
            description: description.to_owned(),
        }
    }
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_url() {
        let params = ListingParams::from_query_pairs(vec![
            ("categoryIds", "coats,jackets"),
            ("newArrival", "true"),
            ("page", "3"),
        ]);
        assert_eq!(params.page, 3);
        assert_eq!(params.selection.get(Facet::Category).len(), 2);
        assert_eq!(params.fixed, [FixedConstraint::NewArrival]);
        assert_eq!(params.query().predicates().len(), 2);
    }

    #[test]
    fn test_page_defaults_and_zero_is_kept() {
        assert_eq!(ListingParams::from_query_pairs(Vec::new()).page, 1);
        assert_eq!(ListingParams::from_query_pairs(vec![("page", "x")]).page, 1);
        assert_eq!(ListingParams::from_query_pairs(vec![("page", "0")]).page, 0);
    }

    #[test]
    fn test_heading() {
        let none = |_: Facet, _: &FacetOptionId| None;
        let tagged = ListingParams::from_query_pairs(vec![("tag", "wedding")]);
        assert_eq!(tagged.heading(none).title, "Wedding");

        let featured = ListingParams::from_query_pairs(vec![("featured", "true")]);
        assert_eq!(featured.heading(none).title, "Featured");

        let category = ListingParams::from_query_pairs(vec![("categoryIds", "coats")]);
        let heading = category.heading(|facet, id| {
            (facet == Facet::Category && id.as_str() == "coats").then(|| "Coats".to_owned())
        });
        assert_eq!(heading.title, "Coats");
        assert_eq!(heading.description, "Shop Coats.");

        assert_eq!(ListingParams::default().heading(none).title, "All Products");
    }
}
