//! The product catalog and its filtering engine.
//!
//! A listing request flows through these pieces in order:
//!
//! 1. [`FilterState`] / [`FilterSelection`] hold the shopper's facet picks.
//! 2. [`ProductQuery`] turns picks plus [`FixedConstraint`]s into AND-ed
//!    [`Predicate`]s (rendered to SQL by `sql` with the `postgres` feature).
//! 3. [`Paginator`] slices the full result set into pages.
//! 4. [`FacetAvailability`] narrows each facet's options to those present in
//!    the results.

pub mod brand;
pub mod facet;
pub mod filter;
pub mod latest;
pub mod listing;
pub mod narrowing;
pub mod option;
pub mod pagination;
pub mod product;
pub mod query;
#[cfg(feature = "postgres")]
pub mod sql;

pub use brand::{Brand, find_by_slug, slug_collisions};
pub use facet::{Facet, FlagField, ListField};
pub use filter::{FilterSelection, FilterState};
pub use latest::LatestResults;
pub use listing::{Heading, ListingParams};
pub use narrowing::{AvailableOption, FacetAvailability};
pub use option::{FacetOption, FacetOptionInput, MoveDirection, sort_for_display, swap_partner};
pub use pagination::{Page, PageError, Paginator, sizes as page_sizes};
pub use product::{FacetMemberships, Product, ProductImage, ProductInput, ProductValidationError};
pub use query::{FixedConstraint, MAX_DISJUNCTION_VALUES, Predicate, ProductQuery, QueryError};
