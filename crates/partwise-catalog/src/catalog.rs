//! Normalized catalog store and part-type hierarchy lookups.

use std::collections::HashMap;

use crate::error::{CatalogError, Result};
use crate::{Part, PartId, PartStatus, PartType, PartTypeId, RawParts, WorldData};

/// Normalized store of part types and parts.
///
/// Both collections are kept as an id-keyed map plus an insertion-ordered
/// id list, so display order survives normalization. The part-type parent
/// graph is validated to be an acyclic forest exactly once, here.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    part_types_by_id: HashMap<PartTypeId, PartType>,
    part_type_ids: Vec<PartTypeId>,
    parts_by_id: HashMap<PartId, Part>,
    part_ids: Vec<PartId>,
}

impl Catalog {
    /// Build a catalog from raw world data and per-part-type part lists.
    ///
    /// Flattens `groups[].categories[]` into the part-type store, then
    /// ingests each part list in `all_part_type_ids` order, stamping
    /// every part with its part type and [`PartStatus::InSync`].
    pub fn from_world(world: &WorldData, parts: &RawParts) -> Result<Self> {
        let mut catalog = Self::default();

        for part_type in world.part_types() {
            catalog.insert_part_type(part_type.clone());
        }
        catalog.validate_forest()?;

        for &part_type_id in &parts.all_part_type_ids {
            if !catalog.part_types_by_id.contains_key(&part_type_id) {
                return Err(CatalogError::UnknownPartType(part_type_id));
            }
            let Some(list) = parts.by_part_type_id.get(&part_type_id) else {
                continue;
            };
            for raw in list {
                catalog.insert_part(Part::from_raw(raw.clone(), part_type_id));
            }
        }

        Ok(catalog)
    }

    fn insert_part_type(&mut self, part_type: PartType) {
        if self
            .part_types_by_id
            .insert(part_type.id, part_type.clone())
            .is_none()
        {
            self.part_type_ids.push(part_type.id);
        }
    }

    /// Insert a part, preserving insertion order for new ids.
    ///
    /// Used both at construction and when an upload completes.
    pub fn insert_part(&mut self, part: Part) {
        if self.parts_by_id.insert(part.id, part.clone()).is_none() {
            self.part_ids.push(part.id);
        }
    }

    /// Every parent link must resolve and the walk from any part type
    /// must reach a root without revisiting a node.
    fn validate_forest(&self) -> Result<()> {
        for &start in &self.part_type_ids {
            let mut seen = vec![start];
            let mut current = start;
            while let Some(link) = &self.part_types_by_id[&current].parent {
                let parent = self
                    .part_types_by_id
                    .get(&link.id)
                    .ok_or(CatalogError::UnknownParent {
                        part_type: current,
                        parent: link.id,
                    })?;
                if seen.contains(&parent.id) {
                    return Err(CatalogError::ParentCycle(parent.id));
                }
                seen.push(parent.id);
                current = parent.id;
            }
        }
        Ok(())
    }

    /// Look up a part type.
    pub fn part_type(&self, id: PartTypeId) -> Option<&PartType> {
        self.part_types_by_id.get(&id)
    }

    /// Part types in display order.
    pub fn part_types(&self) -> impl Iterator<Item = &PartType> {
        self.part_type_ids
            .iter()
            .map(|id| &self.part_types_by_id[id])
    }

    /// Number of part types.
    pub fn part_type_count(&self) -> usize {
        self.part_type_ids.len()
    }

    /// Look up a part.
    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts_by_id.get(&id)
    }

    /// Parts of one part type, in display order.
    pub fn parts_of_type(&self, part_type_id: PartTypeId) -> impl Iterator<Item = &Part> {
        self.part_ids
            .iter()
            .map(|id| &self.parts_by_id[id])
            .filter(move |part| part.part_type_id == part_type_id)
    }

    /// First catalog entry of a part type — the load-time default.
    pub fn first_part_of_type(&self, part_type_id: PartTypeId) -> Option<&Part> {
        self.parts_of_type(part_type_id).next()
    }

    /// Update a part's status, returning the previous one.
    ///
    /// Returns `None` when the part is unknown, which callers treat as
    /// a skipped update rather than an error.
    pub fn set_part_status(&mut self, id: PartId, status: PartStatus) -> Option<PartStatus> {
        let part = self.parts_by_id.get_mut(&id)?;
        Some(std::mem::replace(&mut part.status, status))
    }

    /// Parent part type of `part_type_id`, `None` for roots.
    pub fn parent_of(&self, part_type_id: PartTypeId) -> Option<&PartType> {
        let link = self.part_type(part_type_id)?.parent.as_ref()?;
        self.part_type(link.id)
    }

    /// Attach point name on the parent where `part_type_id` connects.
    pub fn attach_point_of(&self, part_type_id: PartTypeId) -> Option<&str> {
        let link = self.part_type(part_type_id)?.parent.as_ref()?;
        Some(link.attach_point.as_str())
    }

    /// Reverse lookup: the part type attached at a named parent anchor.
    ///
    /// `None` is a valid, expected state — many anchors have nothing
    /// attached to them.
    pub fn child_by_attach_point(&self, attach_point: &str) -> Option<&PartType> {
        self.part_types().find(|part_type| {
            part_type
                .parent
                .as_ref()
                .is_some_and(|link| link.attach_point == attach_point)
        })
    }
}
