//! Facet option reads.
//!
//! Options for nine facets live in `catalog.facet_option`; the brand facet's
//! options are the brands themselves.

use std::collections::BTreeMap;

use sqlx::PgPool;

use atelier_core::catalog::sql::{BrandRow, FacetOptionRow};
use atelier_core::catalog::{Facet, FacetOption};

use super::RepositoryError;

/// Repository for facet option reads.
pub struct FacetOptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FacetOptionRepository<'a> {
    /// Create a new facet option repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All options of one facet, in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, facet: Facet) -> Result<Vec<FacetOption>, RepositoryError> {
        let mut all = self.list_many(&[facet]).await?;
        Ok(all.remove(&facet).unwrap_or_default())
    }

    /// Options of every facet in `facets`, keyed by facet. Facets without
    /// options map to an empty list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` for rows naming an unknown facet.
    pub async fn list_many(
        &self,
        facets: &[Facet],
    ) -> Result<BTreeMap<Facet, Vec<FacetOption>>, RepositoryError> {
        let mut out: BTreeMap<Facet, Vec<FacetOption>> =
            facets.iter().map(|facet| (*facet, Vec::new())).collect();

        let collections: Vec<&str> = facets
            .iter()
            .filter(|facet| **facet != Facet::Brand)
            .map(|facet| facet.collection())
            .collect();
        if !collections.is_empty() {
            let rows: Vec<FacetOptionRow> = sqlx::query_as(
                r"
                SELECT facet, id, name, sort_order, attributes
                FROM catalog.facet_option
                WHERE facet = ANY($1)
                ORDER BY facet, sort_order, name
                ",
            )
            .bind(collections)
            .fetch_all(self.pool)
            .await?;

            for row in rows {
                let option = FacetOption::try_from(row).map_err(RepositoryError::DataCorruption)?;
                out.entry(option.facet).or_default().push(option);
            }
        }

        if facets.contains(&Facet::Brand) {
            let rows: Vec<BrandRow> = sqlx::query_as(
                "SELECT id, name, slug, description FROM catalog.brand ORDER BY name, id",
            )
            .fetch_all(self.pool)
            .await?;
            out.insert(Facet::Brand, rows.into_iter().map(FacetOption::from).collect());
        }

        Ok(out)
    }
}
