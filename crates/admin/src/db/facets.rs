//! Facet option management and reordering.
//!
//! Brand options are managed through [`super::BrandRepository`]; this
//! repository only handles the nine `catalog.facet_option` facets.

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use atelier_core::FacetOptionId;
use atelier_core::catalog::sql::FacetOptionRow;
use atelier_core::catalog::{Facet, FacetOption, FacetOptionInput, MoveDirection, swap_partner};

use super::RepositoryError;

/// Outcome of a reorder request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Sort orders were swapped with this neighbour.
    Swapped { with: FacetOptionId },
    /// Already first (or last); nothing changed.
    AtEdge,
}

/// Repository for facet option writes.
pub struct FacetOptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FacetOptionRepository<'a> {
    /// Create a new facet option repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All options of one non-brand facet, in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, facet: Facet) -> Result<Vec<FacetOption>, RepositoryError> {
        let rows: Vec<FacetOptionRow> = sqlx::query_as(
            r"
            SELECT facet, id, name, sort_order, attributes
            FROM catalog.facet_option
            WHERE facet = $1
            ORDER BY sort_order, name
            ",
        )
        .bind(facet.collection())
        .fetch_all(self.pool)
        .await?;
        rows.into_iter()
            .map(|row| FacetOption::try_from(row).map_err(RepositoryError::DataCorruption))
            .collect()
    }

    /// Create an option. Without an explicit `sort_order` it goes last.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the ID is taken in this facet.
    #[instrument(skip(self, input), fields(facet = %facet, option_id = %id))]
    pub async fn create(
        &self,
        facet: Facet,
        id: &FacetOptionId,
        input: FacetOptionInput,
    ) -> Result<FacetOption, RepositoryError> {
        let row: FacetOptionRow = sqlx::query_as(
            r"
            INSERT INTO catalog.facet_option (facet, id, name, sort_order, attributes)
            VALUES (
                $1, $2, $3,
                COALESCE($4, (SELECT COALESCE(MAX(sort_order), 0) + 1
                              FROM catalog.facet_option WHERE facet = $1)),
                $5
            )
            RETURNING facet, id, name, sort_order, attributes
            ",
        )
        .bind(facet.collection())
        .bind(id.as_str())
        .bind(input.name.trim())
        .bind(input.sort_order)
        .bind(Json(&input.attributes))
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "option"))?;
        FacetOption::try_from(row).map_err(RepositoryError::DataCorruption)
    }

    /// Insert or overwrite an option, keeping the given sort order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, option: &FacetOption) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO catalog.facet_option (facet, id, name, sort_order, attributes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (facet, id) DO UPDATE
            SET name = EXCLUDED.name, sort_order = EXCLUDED.sort_order,
                attributes = EXCLUDED.attributes
            ",
        )
        .bind(option.facet.collection())
        .bind(option.id.as_str())
        .bind(&option.name)
        .bind(option.sort_order)
        .bind(Json(&option.attributes))
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Swap `id`'s `sort_order` with its display-order neighbour.
    ///
    /// The facet's rows are locked for the duration so concurrent moves
    /// serialise instead of interleaving.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the option does not exist.
    #[instrument(skip(self), fields(facet = %facet, option_id = %id))]
    pub async fn move_option(
        &self,
        facet: Facet,
        id: &FacetOptionId,
        direction: MoveDirection,
    ) -> Result<MoveOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let rows: Vec<FacetOptionRow> = sqlx::query_as(
            r"
            SELECT facet, id, name, sort_order, attributes
            FROM catalog.facet_option
            WHERE facet = $1
            ORDER BY sort_order, name
            FOR UPDATE
            ",
        )
        .bind(facet.collection())
        .fetch_all(&mut *tx)
        .await?;
        let options = rows
            .into_iter()
            .map(FacetOption::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::DataCorruption)?;

        if !options.iter().any(|o| &o.id == id) {
            return Err(RepositoryError::NotFound);
        }
        let Some((me, other)) = swap_partner(&options, id, direction) else {
            return Ok(MoveOutcome::AtEdge);
        };

        let with = other.id.clone();
        let updates = swap_plan(&options, me, other);

        for (option_id, sort_order) in &updates {
            sqlx::query(
                "UPDATE catalog.facet_option SET sort_order = $3 WHERE facet = $1 AND id = $2",
            )
            .bind(facet.collection())
            .bind(option_id.as_str())
            .bind(*sort_order)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(MoveOutcome::Swapped { with })
    }
}

/// The `(id, sort_order)` writes that swap `me` and `other`.
///
/// Distinct sort orders are exchanged. A tie would make that a no-op, so the
/// whole facet is renumbered from 1 in its new display order instead.
fn swap_plan(
    options: &[FacetOption],
    me: &FacetOption,
    other: &FacetOption,
) -> Vec<(FacetOptionId, i32)> {
    if me.sort_order != other.sort_order {
        return vec![
            (me.id.clone(), other.sort_order),
            (other.id.clone(), me.sort_order),
        ];
    }
    let mut ids: Vec<FacetOptionId> = options.iter().map(|o| o.id.clone()).collect();
    let a = options.iter().position(|o| o.id == me.id).unwrap_or_default();
    let b = options.iter().position(|o| o.id == other.id).unwrap_or_default();
    ids.swap(a, b);
    ids.into_iter().zip(1..).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn option(id: &str, sort_order: i32) -> FacetOption {
        FacetOption {
            id: FacetOptionId::new(id),
            facet: Facet::Size,
            name: id.to_uppercase(),
            sort_order,
            attributes: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_swap_plan_exchanges_distinct_orders() {
        let options = vec![option("s", 10), option("m", 20), option("l", 30)];
        let plan = swap_plan(&options, &options[1], &options[0]);
        assert_eq!(
            plan,
            vec![(FacetOptionId::new("m"), 10), (FacetOptionId::new("s"), 20)]
        );
    }

    #[test]
    fn test_swap_plan_renumbers_on_tie() {
        let options = vec![option("a", 0), option("b", 0), option("c", 0)];
        let plan = swap_plan(&options, &options[2], &options[1]);
        let ids: Vec<(&str, i32)> = plan.iter().map(|(id, o)| (id.as_str(), *o)).collect();
        assert_eq!(ids, [("a", 1), ("c", 2), ("b", 3)]);
    }
}
