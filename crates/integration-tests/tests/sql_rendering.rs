//! Listing URLs rendered to `PostgreSQL`.

#![allow(clippy::unwrap_used)]

use atelier_core::catalog::sql::select_products;
use atelier_core::catalog::{ListingParams, QueryError};

fn where_clause(pairs: Vec<(&str, &str)>) -> Result<String, QueryError> {
    let params = ListingParams::from_query_pairs(pairs);
    let builder = select_products(&params.query())?;
    Ok(builder
        .sql()
        .split_once("WHERE TRUE")
        .map(|(_, rest)| rest.to_owned())
        .unwrap_or_default())
}

#[test]
fn test_unfiltered_listing_has_no_predicates() {
    assert_eq!(where_clause(vec![("page", "2")]).unwrap(), "");
}

#[test]
fn test_listing_url_renders_fixed_then_selected_predicates() {
    let sql = where_clause(vec![
        ("newArrival", "true"),
        ("sizeIds", "s,m"),
        ("categoryIds", "coats"),
    ])
    .unwrap();
    assert_eq!(
        sql,
        " AND new_arrival = $1 AND $2 = ANY(category_ids) AND size_ids && $3::text[]"
    );
}

#[test]
fn test_thirty_values_is_the_limit() {
    let thirty: Vec<String> = (0..30).map(|i| format!("c{i}")).collect();
    let joined = thirty.join(",");
    assert!(where_clause(vec![("colourIds", joined.as_str())]).is_ok());

    let joined = format!("{joined},c30");
    let err = where_clause(vec![("colourIds", joined.as_str())]).unwrap_err();
    assert!(matches!(err, QueryError::TooManyValues { count: 31, .. }));
}
