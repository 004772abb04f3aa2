//! End-to-end listing flows over an in-memory catalog.
//!
//! Each test walks the same path a listing request takes: URL parameters,
//! query, full result set, facet narrowing, then one page.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::BTreeMap;

use atelier_core::FacetOptionId;
use atelier_core::catalog::{
    Facet, FacetAvailability, FacetMemberships, FacetOption, FilterSelection, FilterState,
    FixedConstraint, ListingParams, PageError, Paginator, Product, QueryError, page_sizes,
};
use atelier_integration_tests::{option, product};

fn catalog() -> Vec<Product> {
    let facets = FacetMemberships::default;
    vec![
        product(
            "trench",
            facets()
                .with(Facet::Category, &["coats"])
                .with(Facet::Colour, &["camel"])
                .with(Facet::Brand, &["maison"]),
        ),
        product(
            "peacoat",
            facets()
                .with(Facet::Category, &["coats"])
                .with(Facet::Colour, &["navy"])
                .with(Facet::Brand, &["north"]),
        ),
        product(
            "slip-dress",
            facets()
                .with(Facet::Category, &["dresses"])
                .with(Facet::Colour, &["ivory", "black"])
                .with(Facet::Brand, &["maison"]),
        ),
        product(
            "knit",
            facets()
                .with(Facet::Category, &["knitwear"])
                .with(Facet::Colour, &["camel"]),
        ),
    ]
}

fn options() -> BTreeMap<Facet, Vec<FacetOption>> {
    BTreeMap::from([
        (
            Facet::Colour,
            vec![
                option(Facet::Colour, "black", 1),
                option(Facet::Colour, "camel", 2),
                option(Facet::Colour, "ivory", 3),
                option(Facet::Colour, "navy", 4),
            ],
        ),
        (
            Facet::Category,
            vec![
                option(Facet::Category, "coats", 1),
                option(Facet::Category, "dresses", 2),
                option(Facet::Category, "knitwear", 3),
            ],
        ),
    ])
}

fn ids<'a>(products: impl IntoIterator<Item = &'a &'a Product>) -> Vec<&'a str> {
    products.into_iter().map(|p| p.id.as_str()).collect()
}

#[test]
fn test_category_selection_narrows_colours() {
    let catalog = catalog();
    let params = ListingParams::from_query_pairs(vec![("categoryIds", "coats")]);

    let results = params.query().execute(&catalog).unwrap();
    assert_eq!(ids(&results), ["trench", "peacoat"]);

    let availability = FacetAvailability::from_products(results.iter().copied());
    let narrowed = availability.narrow_all([Facet::Colour], &options());
    let colours: Vec<_> = narrowed[&Facet::Colour]
        .iter()
        .map(|o| (o.option.id.as_str(), o.count))
        .collect();
    // Ivory and black only appear on dresses
    assert_eq!(colours, [("camel", 1), ("navy", 1)]);
}

#[test]
fn test_options_within_a_facet_are_ored_and_facets_are_anded() {
    let catalog = catalog();
    let params = ListingParams::from_query_pairs(vec![
        ("colourIds", "camel,ivory"),
        ("brandIds", "maison"),
    ]);
    let results = params.query().execute(&catalog).unwrap();
    assert_eq!(ids(&results), ["trench", "slip-dress"]);
}

#[test]
fn test_no_matches_still_renders_an_empty_first_page() {
    let catalog = catalog();
    let params = ListingParams::from_query_pairs(vec![("colourIds", "chartreuse")]);
    let results = params.query().execute(&catalog).unwrap();
    assert!(results.is_empty());

    let page = Paginator::new(page_sizes::PRODUCT_LISTING)
        .page(results, params.page)
        .unwrap();
    assert_eq!((page.total, page.page_count), (0, 0));
    assert!(page.items.is_empty());

    let availability = FacetAvailability::from_products(page.items.iter().copied());
    assert!(availability.narrow(Facet::Colour, &options()[&Facet::Colour]).is_empty());
}

#[test]
fn test_paging_a_large_result_set() {
    let catalog: Vec<Product> = (0..237)
        .map(|i| {
            product(
                &format!("p{i:03}"),
                FacetMemberships::default().with(Facet::Category, &["coats"]),
            )
        })
        .collect();
    let params = ListingParams::from_query_pairs(vec![("categoryIds", "coats"), ("page", "3")]);
    let results = params.query().execute(&catalog).unwrap();

    let paginator = Paginator::new(100);
    let page = paginator.page(results.clone(), params.page).unwrap();
    assert_eq!(page.items.len(), 37);
    assert_eq!(page.items[0].id.as_str(), "p200");
    assert_eq!(page.page_count, 3);
    assert!(page.has_previous() && !page.has_next());

    let err = paginator.page(results, 4).unwrap_err();
    assert_eq!(
        err,
        PageError::OutOfRange {
            requested: 4,
            page_count: 3
        }
    );
}

#[test]
fn test_brand_page_keeps_its_brand_through_clear() {
    let catalog = catalog();
    let maison = FacetOptionId::new("maison");
    let fixed = [FixedConstraint::Option {
        facet: Facet::Brand,
        id: maison.clone(),
    }];
    let initial = FilterSelection::new().with_set(Facet::Brand, [maison]);

    let mut seen = Vec::new();
    let mut state = FilterState::new(initial, [Facet::Brand], |s: &FilterSelection| {
        seen.push(s.clone());
    });
    assert!(!state.visible_facets().any(|f| f == Facet::Brand));
    assert!(!state.toggle(Facet::Brand, &FacetOptionId::new("north")));

    assert!(state.toggle(Facet::Colour, &FacetOptionId::new("ivory")));
    let query = atelier_core::catalog::ProductQuery::new()
        .with_fixed(&fixed)
        .with_selection(state.selection());
    assert_eq!(ids(&query.execute(&catalog).unwrap()), ["slip-dress"]);

    state.clear();
    let query = atelier_core::catalog::ProductQuery::new()
        .with_fixed(&fixed)
        .with_selection(state.selection());
    assert_eq!(ids(&query.execute(&catalog).unwrap()), ["trench", "slip-dress"]);

    drop(state);
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].get(Facet::Brand), [FacetOptionId::new("maison")]);
    assert!(seen[1].get(Facet::Colour).is_empty());
}

#[test]
fn test_tag_listing_heading_and_results() {
    let mut catalog = catalog();
    catalog[2].tags = vec!["wedding".to_owned()];
    let params = ListingParams::from_query_pairs(vec![("tag", "Wedding")]);

    assert_eq!(ids(&params.query().execute(&catalog).unwrap()), ["slip-dress"]);
    let heading = params.heading(|_, _| None);
    assert_eq!(heading.title, "Wedding");
    assert_eq!(heading.description, "Pieces picked for Wedding.");
}

#[test]
fn test_over_limit_selection_never_runs() {
    let catalog = catalog();
    let colours: Vec<String> = (0..31).map(|i| format!("c{i}")).collect();
    let joined = colours.join(",");
    let params = ListingParams::from_query_pairs(vec![("colourIds", joined.as_str())]);

    let err = params.query().execute(&catalog).unwrap_err();
    assert_eq!(
        err,
        QueryError::TooManyValues {
            field: "colourIds",
            count: 31,
            max: 30
        }
    );
}
