//! The equipped-part map.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use partwise_catalog::{PartId, PartTypeId};

/// Mapping from part type to the currently selected part.
///
/// The single source of truth for "what is equipped". Updates go
/// through [`Selection::with_part`], which returns a fresh snapshot —
/// the session replaces its selection wholesale so concurrent readers
/// never observe a half-applied change. Entries are replaced, never
/// removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    by_part_type: HashMap<PartTypeId, PartId>,
}

impl Selection {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from `(part_type, part)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (PartTypeId, PartId)>) -> Self {
        Self {
            by_part_type: entries.into_iter().collect(),
        }
    }

    /// Snapshot with `part_type_id` now mapping to `part_id`.
    pub fn with_part(&self, part_type_id: PartTypeId, part_id: PartId) -> Self {
        let mut by_part_type = self.by_part_type.clone();
        by_part_type.insert(part_type_id, part_id);
        Self { by_part_type }
    }

    /// The selected part for a slot, if any.
    pub fn selected(&self, part_type_id: PartTypeId) -> Option<PartId> {
        self.by_part_type.get(&part_type_id).copied()
    }

    /// All selected part ids, in no particular order.
    pub fn part_ids(&self) -> Vec<PartId> {
        self.by_part_type.values().copied().collect()
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.by_part_type.len()
    }

    /// Whether no slot is filled.
    pub fn is_empty(&self) -> bool {
        self.by_part_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_part_leaves_original_untouched() {
        let base = Selection::from_entries([(1, 10)]);
        let next = base.with_part(2, 20);

        assert_eq!(base.len(), 1);
        assert_eq!(next.len(), 2);
        assert_eq!(next.selected(1), Some(10));
        assert_eq!(next.selected(2), Some(20));
    }

    #[test]
    fn replacing_a_slot_keeps_one_entry() {
        let sel = Selection::from_entries([(1, 10)]).with_part(1, 11);
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.selected(1), Some(11));
    }

    #[test]
    fn missing_slot_is_none() {
        assert_eq!(Selection::new().selected(5), None);
    }
}
