//! Recursive attach-point position resolution.
//!
//! Every part type's global offset is the sum of attach-point positions
//! along its parent chain, terminated at a root whose authored origin
//! is negated — meshes are authored with the origin moved to their own
//! pivot, and the negation re-aligns the composite at the world origin.
//!
//! All lookups degrade to the zero vector: scene state can transiently
//! lack a selection during async loads, and that must never take the
//! resolver down.

use tracing::warn;

use partwise_catalog::{Catalog, PartId, PartType, PartTypeId, Vec3};

use crate::Selection;

/// Global offset at which `part_type_id`'s mesh must be placed.
///
/// Walks parent links up to the root and sums attach-point positions
/// componentwise. Pure: identical inputs always yield the same result.
/// Depth is bounded by the hierarchy height — the catalog validated
/// acyclicity at construction.
pub fn global_position(catalog: &Catalog, selection: &Selection, part_type_id: PartTypeId) -> Vec3 {
    let Some(part_type) = catalog.part_type(part_type_id) else {
        warn!(part_type_id, "global_position: unknown part type");
        return Vec3::ZERO;
    };

    let Some(link) = &part_type.parent else {
        // Root: undo the offset created when the mesh origin was moved
        // to its own pivot.
        return authored_origin(catalog, selection, part_type).neg();
    };

    let anchor = position_inside_parent(catalog, selection, part_type);
    global_position(catalog, selection, link.id).add(&anchor)
}

/// Attach-point position on the parent's selected part where
/// `part_type` connects; zero for roots.
///
/// Used when placing a freshly uploaded part against the currently
/// visible parent.
pub fn parent_attach_point_position(
    catalog: &Catalog,
    selection: &Selection,
    part_type: &PartType,
) -> Vec3 {
    if part_type.parent.is_none() {
        return Vec3::ZERO;
    }
    position_inside_parent(catalog, selection, part_type)
}

/// Anchor position for a non-root part type: the named attach point on
/// the parent's currently selected part.
fn position_inside_parent(catalog: &Catalog, selection: &Selection, part_type: &PartType) -> Vec3 {
    let Some(link) = &part_type.parent else {
        return Vec3::ZERO;
    };

    let Some(parent_part_id) = selection.selected(link.id) else {
        warn!(
            part_type_id = part_type.id,
            parent_part_type_id = link.id,
            "no part selected for parent slot, substituting zero anchor"
        );
        return Vec3::ZERO;
    };

    attach_point_position(catalog, parent_part_id, &link.attach_point)
}

/// Named attach point on a part, zero when the part or point is absent.
fn attach_point_position(catalog: &Catalog, part_id: PartId, attach_point: &str) -> Vec3 {
    match catalog.part(part_id) {
        Some(part) => part.metadata.attach_point(attach_point),
        None => {
            warn!(part_id, attach_point, "attach point lookup on unknown part");
            Vec3::ZERO
        }
    }
}

/// Authored origin offset of the slot's selected part, zero when no
/// part is selected.
fn authored_origin(catalog: &Catalog, selection: &Selection, part_type: &PartType) -> Vec3 {
    let Some(part_id) = selection.selected(part_type.id) else {
        warn!(
            part_type_id = part_type.id,
            "no part selected for slot, substituting zero origin"
        );
        return Vec3::ZERO;
    };

    match catalog.part(part_id) {
        Some(part) => part.metadata.position_or_zero(),
        None => {
            warn!(part_id, "selected part missing from catalog");
            Vec3::ZERO
        }
    }
}
