//! Typed product queries.
//!
//! A [`ProductQuery`] is a conjunction of [`Predicate`]s. User selections
//! contribute one predicate per constrained facet; [`FixedConstraint`]s from
//! the route or URL are added unconditionally on top. There is no OR across
//! predicates.
//!
//! The database caps list-intersection predicates at
//! [`MAX_DISJUNCTION_VALUES`] values. Queries above the cap are rejected by
//! [`ProductQuery::validate`] rather than split or truncated.

use serde::Serialize;

use super::facet::{Facet, FlagField, ListField};
use super::filter::FilterSelection;
use super::product::Product;
use crate::types::FacetOptionId;

/// Most values a single [`Predicate::ContainsAny`] may carry.
pub const MAX_DISJUNCTION_VALUES: usize = 30;

/// Errors raised when a query cannot be executed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("filter on {field} has {count} values, at most {max} are supported")]
    TooManyValues {
        field: &'static str,
        count: usize,
        max: usize,
    },
}

/// A single typed condition on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Predicate {
    /// Scalar flag equals `value`.
    Equals { field: FlagField, value: bool },
    /// `value` is a member of the stored list.
    Contains { field: ListField, value: String },
    /// The stored list shares at least one element with `values`.
    ContainsAny { field: ListField, values: Vec<String> },
}

impl Predicate {
    /// Predicate for one facet's selection: a single option tests membership,
    /// several test intersection. `None` for an empty selection.
    #[must_use]
    pub fn for_selection(facet: Facet, ids: &[FacetOptionId]) -> Option<Self> {
        let field = ListField::Facet(facet);
        match ids {
            [] => None,
            [only] => Some(Self::Contains {
                field,
                value: only.as_str().to_owned(),
            }),
            many => Some(Self::ContainsAny {
                field,
                values: many.iter().map(|id| id.as_str().to_owned()).collect(),
            }),
        }
    }

    /// Evaluate against an in-memory product.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::Equals { field, value } => flag_value(product, *field) == *value,
            Self::Contains { field, value } => list_contains(product, *field, value),
            Self::ContainsAny { field, values } => {
                values.iter().any(|v| list_contains(product, *field, v))
            }
        }
    }
}

fn flag_value(product: &Product, field: FlagField) -> bool {
    match field {
        FlagField::Featured => product.featured,
        FlagField::NewArrival => product.new_arrival,
    }
}

fn list_contains(product: &Product, field: ListField, value: &str) -> bool {
    match field {
        ListField::Facet(facet) => product.facets.get(facet).iter().any(|id| id.as_str() == value),
        ListField::Tags => product.tags.iter().any(|tag| tag == value),
    }
}

/// Constraints a listing applies regardless of user selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FixedConstraint {
    Featured,
    NewArrival,
    /// Products carrying this tag.
    Tag { tag: String },
    /// Products holding this option, e.g. the brand on its own page.
    Option { facet: Facet, id: FacetOptionId },
}

impl FixedConstraint {
    /// The predicate this constraint contributes.
    #[must_use]
    pub fn predicate(&self) -> Predicate {
        match self {
            Self::Featured => Predicate::Equals {
                field: FlagField::Featured,
                value: true,
            },
            Self::NewArrival => Predicate::Equals {
                field: FlagField::NewArrival,
                value: true,
            },
            Self::Tag { tag } => Predicate::Contains {
                field: ListField::Tags,
                value: tag.clone(),
            },
            Self::Option { facet, id } => Predicate::Contains {
                field: ListField::Facet(*facet),
                value: id.as_str().to_owned(),
            },
        }
    }

    /// Parse the fixed constraints carried by listing URL parameters:
    /// `featured=true`, `newArrival=true` and `tag=<t>`.
    pub fn from_query_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<Self> {
        let mut out = Vec::new();
        for (key, value) in pairs {
            let value = value.trim();
            let constraint = match key {
                "featured" if is_true(value) => Self::Featured,
                "newArrival" if is_true(value) => Self::NewArrival,
                "tag" if !value.is_empty() => Self::Tag {
                    tag: value.to_lowercase(),
                },
                _ => continue,
            };
            if !out.contains(&constraint) {
                out.push(constraint);
            }
        }
        out
    }
}

fn is_true(value: &str) -> bool {
    matches!(value, "true" | "1")
}

/// An AND of predicates over the product collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    predicates: Vec<Predicate>,
}

impl ProductQuery {
    /// A query matching every product.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one predicate per constrained facet of `selection`.
    #[must_use]
    pub fn with_selection(mut self, selection: &FilterSelection) -> Self {
        self.predicates.extend(
            selection
                .iter()
                .filter_map(|(facet, ids)| Predicate::for_selection(facet, ids)),
        );
        self
    }

    /// Add fixed constraints.
    #[must_use]
    pub fn with_fixed<'a>(mut self, fixed: impl IntoIterator<Item = &'a FixedConstraint>) -> Self {
        self.predicates
            .extend(fixed.into_iter().map(FixedConstraint::predicate));
        self
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Check the query against backend limits.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::TooManyValues`] when any intersection predicate
    /// exceeds [`MAX_DISJUNCTION_VALUES`].
    pub fn validate(&self) -> Result<(), QueryError> {
        for predicate in &self.predicates {
            if let Predicate::ContainsAny { field, values } = predicate
                && values.len() > MAX_DISJUNCTION_VALUES
            {
                return Err(QueryError::TooManyValues {
                    field: field.name(),
                    count: values.len(),
                    max: MAX_DISJUNCTION_VALUES,
                });
            }
        }
        Ok(())
    }

    /// Whether `product` satisfies every predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.predicates.iter().all(|p| p.matches(product))
    }

    /// Run the query over an in-memory collection, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the query fails [`ProductQuery::validate`].
    pub fn execute<'a>(
        &self,
        products: impl IntoIterator<Item = &'a Product>,
    ) -> Result<Vec<&'a Product>, QueryError> {
        self.validate()?;
        Ok(products.into_iter().filter(|p| self.matches(p)).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::catalog::FacetMemberships;
    use crate::types::{Price, ProductId};

    fn product(id: &str, facets: FacetMemberships) -> Product {
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
            created_at: Utc::now(),
        }
    }

    fn ids(n: usize) -> Vec<FacetOptionId> {
        (0..n).map(|i| FacetOptionId::new(format!("c{i}"))).collect()
    }

    #[test]
    fn test_predicate_kind_follows_selection_size() {
        assert_eq!(Predicate::for_selection(Facet::Colour, &[]), None);
        assert!(matches!(
            Predicate::for_selection(Facet::Colour, &ids(1)),
            Some(Predicate::Contains { .. })
        ));
        assert!(matches!(
            Predicate::for_selection(Facet::Colour, &ids(2)),
            Some(Predicate::ContainsAny { .. })
        ));
    }

    #[test]
    fn test_predicates_are_anded() {
        let selection = FilterSelection::new()
            .with_set(Facet::Category, [FacetOptionId::new("dresses")])
            .with_set(Facet::Colour, [FacetOptionId::new("red"), FacetOptionId::new("blue")]);
        let query = ProductQuery::new()
            .with_selection(&selection)
            .with_fixed(&[FixedConstraint::Featured]);
        assert_eq!(query.predicates().len(), 3);

        let facets = FacetMemberships::default()
            .with(Facet::Category, &["dresses"])
            .with(Facet::Colour, &["blue"]);
        let mut hit = product("hit", facets.clone());
        hit.featured = true;
        let not_featured = product("plain", facets);
        let wrong_colour = {
            let mut p = product(
                "green",
                FacetMemberships::default()
                    .with(Facet::Category, &["dresses"])
                    .with(Facet::Colour, &["green"]),
            );
            p.featured = true;
            p
        };

        let all = [hit, not_featured, wrong_colour];
        let found = query.execute(&all).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "hit");
    }

    #[test]
    fn test_thirty_values_are_accepted() {
        let selection = FilterSelection::new().with_set(Facet::Category, ids(30));
        assert!(ProductQuery::new().with_selection(&selection).validate().is_ok());
    }

    #[test]
    fn test_thirty_one_values_fail_rather_than_truncate() {
        let selection = FilterSelection::new().with_set(Facet::Category, ids(31));
        let query = ProductQuery::new().with_selection(&selection);

        // All 31 values are kept on the predicate.
        let Predicate::ContainsAny { values, .. } = &query.predicates()[0] else {
            panic!("expected an intersection predicate");
        };
        assert_eq!(values.len(), 31);

        let err = query.validate().unwrap_err();
        assert_eq!(
            err,
            QueryError::TooManyValues {
                field: "categoryIds",
                count: 31,
                max: 30
            }
        );
        let products = [product("p", FacetMemberships::default().with(Facet::Category, &["c0"]))];
        assert!(query.execute(&products).is_err());
    }

    #[test]
    fn test_fixed_constraints_from_url() {
        let fixed = FixedConstraint::from_query_pairs([
            ("featured", "true"),
            ("newArrival", "false"),
            ("tag", "Wedding"),
            ("tag", "wedding"),
            ("categoryIds", "a"),
        ]);
        assert_eq!(
            fixed,
            [
                FixedConstraint::Featured,
                FixedConstraint::Tag {
                    tag: "wedding".into()
                }
            ]
        );

        let mut tagged = product("t", FacetMemberships::default());
        tagged.tags = vec!["wedding".into()];
        tagged.featured = true;
        let query = ProductQuery::new().with_fixed(&fixed);
        assert!(query.matches(&tagged));
        tagged.tags.clear();
        assert!(!query.matches(&tagged));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = ProductQuery::new().with_selection(&FilterSelection::new());
        assert!(query.predicates().is_empty());
        assert!(query.matches(&product("any", FacetMemberships::default())));
    }
}
