//! Filter selections and the state machine that edits them.
//!
//! A [`FilterSelection`] maps facets to the option IDs a shopper picked. A
//! facet that is absent from the map places no constraint on results; an
//! empty list is never stored.
//!
//! [`FilterState`] owns the selection for one listing surface. It never
//! mutates a selection in place: every edit builds a new selection, swaps it
//! in, resets the page to 1 and hands the whole mapping to the caller's
//! callback.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::facet::Facet;
use crate::types::FacetOptionId;

/// Facet → selected option IDs. Never contains an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Facet, Vec<FacetOptionId>>")]
pub struct FilterSelection(BTreeMap<Facet, Vec<FacetOptionId>>);

impl FilterSelection {
    /// An empty selection (no constraints).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected options for `facet`; empty when unconstrained.
    #[must_use]
    pub fn get(&self, facet: Facet) -> &[FacetOptionId] {
        self.0.get(&facet).map_or(&[], Vec::as_slice)
    }

    /// Whether `option` is selected under `facet`.
    #[must_use]
    pub fn is_selected(&self, facet: Facet, option: &FacetOptionId) -> bool {
        self.get(facet).contains(option)
    }

    /// Whether `facet` has a constraint.
    #[must_use]
    pub fn contains_facet(&self, facet: Facet) -> bool {
        self.0.contains_key(&facet)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Constrained facets with their selected options.
    pub fn iter(&self) -> impl Iterator<Item = (Facet, &[FacetOptionId])> {
        self.0.iter().map(|(facet, ids)| (*facet, ids.as_slice()))
    }

    /// A copy with `option` toggled under `facet`: removed if present,
    /// appended otherwise. The facet disappears once its list is empty.
    #[must_use]
    pub fn with_toggled(&self, facet: Facet, option: &FacetOptionId) -> Self {
        let mut next = self.0.clone();
        let ids = next.entry(facet).or_default();
        if let Some(index) = ids.iter().position(|id| id == option) {
            ids.remove(index);
        } else {
            ids.push(option.clone());
        }
        if ids.is_empty() {
            next.remove(&facet);
        }
        Self(next)
    }

    /// A copy with `facet` constrained to exactly `ids` (duplicates dropped,
    /// first occurrence kept). An empty `ids` removes the constraint.
    #[must_use]
    pub fn with_set(&self, facet: Facet, ids: impl IntoIterator<Item = FacetOptionId>) -> Self {
        let mut deduped: Vec<FacetOptionId> = Vec::new();
        for id in ids {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        let mut next = self.0.clone();
        if deduped.is_empty() {
            next.remove(&facet);
        } else {
            next.insert(facet, deduped);
        }
        Self(next)
    }

    /// A copy keeping only the given facets.
    #[must_use]
    pub fn restricted_to(&self, facets: &BTreeSet<Facet>) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(facet, _)| facets.contains(facet))
                .map(|(facet, ids)| (*facet, ids.clone()))
                .collect(),
        )
    }

    /// Parse URL query pairs. Keys are facet field names (`categoryIds`) and
    /// values comma-separated option IDs; unknown keys are ignored and
    /// repeated keys accumulate.
    pub fn from_query_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut selection = Self::new();
        for (key, value) in pairs {
            let Some(facet) = Facet::from_field_name(key) else {
                continue;
            };
            let ids = selection
                .get(facet)
                .iter()
                .cloned()
                .chain(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(FacetOptionId::new),
                )
                .collect::<Vec<_>>();
            selection = selection.with_set(facet, ids);
        }
        selection
    }

    /// Render as URL query pairs, the inverse of
    /// [`FilterSelection::from_query_pairs`].
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        self.iter()
            .map(|(facet, ids)| {
                let joined = ids.iter().map(FacetOptionId::as_str).collect::<Vec<_>>().join(",");
                (facet.field_name(), joined)
            })
            .collect()
    }
}

impl From<BTreeMap<Facet, Vec<FacetOptionId>>> for FilterSelection {
    fn from(map: BTreeMap<Facet, Vec<FacetOptionId>>) -> Self {
        map.into_iter().collect()
    }
}

impl FromIterator<(Facet, Vec<FacetOptionId>)> for FilterSelection {
    fn from_iter<T: IntoIterator<Item = (Facet, Vec<FacetOptionId>)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |acc, (facet, ids)| acc.with_set(facet, ids))
    }
}

/// The live filter state of one listing surface.
///
/// `F` is called with the full selection after every change. Suppressed
/// ("disabled") facets keep their initial values for the state's lifetime:
/// toggles on them are refused and [`FilterState::clear`] restores them.
pub struct FilterState<F>
where
    F: FnMut(&FilterSelection),
{
    selection: FilterSelection,
    fixed: FilterSelection,
    disabled: BTreeSet<Facet>,
    page: usize,
    generation: u64,
    on_change: F,
}

impl<F> FilterState<F>
where
    F: FnMut(&FilterSelection),
{
    /// Start from `initial`, suppressing `disabled`.
    pub fn new(
        initial: FilterSelection,
        disabled: impl IntoIterator<Item = Facet>,
        on_change: F,
    ) -> Self {
        let disabled: BTreeSet<Facet> = disabled.into_iter().collect();
        let fixed = initial.restricted_to(&disabled);
        Self {
            selection: initial,
            fixed,
            disabled,
            page: 1,
            generation: 0,
            on_change,
        }
    }

    #[must_use]
    pub const fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Current 1-based page.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Move to another page. Page bounds are checked by the paginator.
    pub const fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Incremented on every selection change; pairs with
    /// [`super::LatestResults`] to drop stale responses.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_disabled(&self, facet: Facet) -> bool {
        self.disabled.contains(&facet)
    }

    /// Facets a filter panel should render.
    pub fn visible_facets(&self) -> impl Iterator<Item = Facet> + '_ {
        Facet::ALL.into_iter().filter(|f| !self.disabled.contains(f))
    }

    /// Toggle `option` under `facet`. Returns `false` (and changes nothing)
    /// when the facet is disabled.
    pub fn toggle(&mut self, facet: Facet, option: &FacetOptionId) -> bool {
        if self.is_disabled(facet) {
            return false;
        }
        let next = self.selection.with_toggled(facet, option);
        self.replace(next);
        true
    }

    /// Replace the selection for `facet`. Returns `false` when disabled.
    pub fn set(&mut self, facet: Facet, ids: impl IntoIterator<Item = FacetOptionId>) -> bool {
        if self.is_disabled(facet) {
            return false;
        }
        let next = self.selection.with_set(facet, ids);
        self.replace(next);
        true
    }

    /// Drop every user selection, keeping only the disabled facets at their
    /// initial values.
    pub fn clear(&mut self) {
        let next = self.fixed.clone();
        self.replace(next);
    }

    fn replace(&mut self, next: FilterSelection) {
        self.selection = next;
        self.page = 1;
        self.generation += 1;
        (self.on_change)(&self.selection);
    }
}

impl<F> std::fmt::Debug for FilterState<F>
where
    F: FnMut(&FilterSelection),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterState")
            .field("selection", &self.selection)
            .field("disabled", &self.disabled)
            .field("page", &self.page)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn id(s: &str) -> FacetOptionId {
        FacetOptionId::new(s)
    }

    #[test]
    fn test_toggle_adds_then_removes_and_drops_empty_facet() {
        let empty = FilterSelection::new();
        let one = empty.with_toggled(Facet::Colour, &id("red"));
        assert_eq!(one.get(Facet::Colour), [id("red")]);

        let two = one.with_toggled(Facet::Colour, &id("blue"));
        assert_eq!(two.get(Facet::Colour), [id("red"), id("blue")]);

        let back = two.with_toggled(Facet::Colour, &id("red"));
        assert_eq!(back.get(Facet::Colour), [id("blue")]);

        let none = back.with_toggled(Facet::Colour, &id("blue"));
        assert!(!none.contains_facet(Facet::Colour));
        assert!(none.is_empty());
    }

    #[test]
    fn test_toggle_leaves_other_facets_alone() {
        let base: FilterSelection = [
            (Facet::Category, vec![id("dresses")]),
            (Facet::Size, vec![id("s"), id("m")]),
        ]
        .into_iter()
        .collect();

        for option in ["s", "m", "l"] {
            let next = base.with_toggled(Facet::Size, &id(option));
            assert_eq!(next.get(Facet::Category), base.get(Facet::Category));
            let was = base.is_selected(Facet::Size, &id(option));
            assert_eq!(next.is_selected(Facet::Size, &id(option)), !was);
            // Exactly one option differs.
            let before = base.get(Facet::Size).len();
            let after = next.get(Facet::Size).len();
            assert_eq!(before.abs_diff(after), 1);
        }
    }

    #[test]
    fn test_state_notifies_and_resets_page() {
        let seen = RefCell::new(Vec::new());
        let mut state = FilterState::new(FilterSelection::new(), [], |sel: &FilterSelection| {
            seen.borrow_mut().push(sel.clone());
        });

        state.set_page(4);
        assert!(state.toggle(Facet::Category, &id("tops")));
        assert_eq!(state.page(), 1);
        assert_eq!(state.generation(), 1);

        state.set_page(2);
        assert!(state.toggle(Facet::Colour, &id("red")));
        assert_eq!(state.page(), 1);
        drop(state);

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].get(Facet::Category), [id("tops")]);
        assert_eq!(seen[1].get(Facet::Colour), [id("red")]);
    }

    #[test]
    fn test_disabled_facet_is_not_toggled() {
        let initial = FilterSelection::new().with_set(Facet::Brand, [id("zara")]);
        let mut calls = 0;
        let mut state = FilterState::new(initial, [Facet::Brand], |_: &FilterSelection| calls += 1);

        assert!(!state.toggle(Facet::Brand, &id("zara")));
        assert!(!state.set(Facet::Brand, [id("mango")]));
        assert_eq!(state.selection().get(Facet::Brand), [id("zara")]);
        assert_eq!(state.visible_facets().count(), 9);
        assert!(state.visible_facets().all(|f| f != Facet::Brand));
        drop(state);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_clear_keeps_exactly_the_fixed_facets() {
        let initial = FilterSelection::new()
            .with_set(Facet::Brand, [id("zara")])
            .with_set(Facet::Size, [id("m")]);
        let mut state = FilterState::new(initial, [Facet::Brand, Facet::Lid], |_: &FilterSelection| {});

        state.toggle(Facet::Colour, &id("red"));
        state.toggle(Facet::Category, &id("coats"));
        state.clear();

        let expected = FilterSelection::new().with_set(Facet::Brand, [id("zara")]);
        assert_eq!(state.selection(), &expected);
        assert!(!state.selection().contains_facet(Facet::Lid));
    }

    #[test]
    fn test_query_pairs_roundtrip() {
        let selection = FilterSelection::from_query_pairs([
            ("categoryIds", "a, b,,a"),
            ("colourIds", "red"),
            ("page", "2"),
            ("colourIds", "blue"),
        ]);
        assert_eq!(selection.get(Facet::Category), [id("a"), id("b")]);
        assert_eq!(selection.get(Facet::Colour), [id("red"), id("blue")]);

        let pairs = selection.to_query_pairs();
        assert_eq!(
            pairs,
            [("categoryIds", "a,b".to_owned()), ("colourIds", "red,blue".to_owned())]
        );
        let reparsed = FilterSelection::from_query_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        assert_eq!(reparsed, selection);
    }

    #[test]
    fn test_selection_json_keys_are_field_names() {
        let selection = FilterSelection::new().with_set(Facet::MaterialType, [id("silk")]);
        let json = serde_json::to_string(&selection).unwrap();
        assert_eq!(json, r#"{"materialTypeIds":["silk"]}"#);
    }

    #[test]
    fn test_deserialized_selection_drops_empty_and_duplicate_ids() {
        let empty: FilterSelection = serde_json::from_str(r#"{"colourIds":[]}"#).unwrap();
        assert!(empty.is_empty());
        assert!(!empty.contains_facet(Facet::Colour));

        let doubled: FilterSelection =
            serde_json::from_str(r#"{"colourIds":["a","a"],"sizeIds":["s"]}"#).unwrap();
        assert_eq!(doubled.get(Facet::Colour), [id("a")]);
        assert_eq!(doubled.get(Facet::Size), [id("s")]);
    }
}
