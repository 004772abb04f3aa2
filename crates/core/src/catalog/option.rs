//! Facet options: the selectable values of a facet.

use serde::{Deserialize, Serialize};

use super::facet::Facet;
use crate::types::FacetOptionId;

/// One selectable value of a facet (a colour, a size, a category...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetOption {
    pub id: FacetOptionId,
    pub facet: Facet,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
    /// Facet-specific extras such as a colour's `hex`.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// Fields accepted when creating a facet option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetOptionInput {
    pub name: String,
    /// Defaults to one past the current maximum.
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// Sort options for display: `sort_order`, then name.
pub fn sort_for_display(options: &mut [FacetOption]) {
    options.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Direction for reordering an option among its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// The sibling an option swaps `sort_order` with, if any.
///
/// `options` must already be in display order.
#[must_use]
pub fn swap_partner<'a>(
    options: &'a [FacetOption],
    id: &FacetOptionId,
    direction: MoveDirection,
) -> Option<(&'a FacetOption, &'a FacetOption)> {
    let index = options.iter().position(|o| &o.id == id)?;
    let partner = match direction {
        MoveDirection::Up => index.checked_sub(1)?,
        MoveDirection::Down => index + 1,
    };
    Some((&options[index], options.get(partner)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn option(id: &str, name: &str, sort_order: i32) -> FacetOption {
        FacetOption {
            id: FacetOptionId::new(id),
            facet: Facet::Size,
            name: name.to_owned(),
            sort_order,
            attributes: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_sort_for_display() {
        let mut options = vec![option("l", "L", 3), option("s", "S", 1), option("xs", "XS", 1)];
        sort_for_display(&mut options);
        let ids: Vec<_> = options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["s", "xs", "l"]);
    }

    #[test]
    fn test_swap_partner_at_edges() {
        let options = vec![option("s", "S", 1), option("m", "M", 2), option("l", "L", 3)];
        let (me, other) = swap_partner(&options, &FacetOptionId::new("m"), MoveDirection::Up).unwrap();
        assert_eq!((me.id.as_str(), other.id.as_str()), ("m", "s"));
        assert!(swap_partner(&options, &FacetOptionId::new("s"), MoveDirection::Up).is_none());
        assert!(swap_partner(&options, &FacetOptionId::new("l"), MoveDirection::Down).is_none());
        assert!(swap_partner(&options, &FacetOptionId::new("x"), MoveDirection::Down).is_none());
    }

    #[test]
    fn test_attributes_roundtrip_in_json() {
        let colour: FacetOption = serde_json::from_str(
            r##"{"id":"red","facet":"colourIds","name":"Red","sortOrder":2,"attributes":{"hex":"#ff0000"}}"##,
        )
        .unwrap();
        assert_eq!(colour.attributes["hex"], "#ff0000");
        assert_eq!(colour.facet, Facet::Colour);
    }
}
