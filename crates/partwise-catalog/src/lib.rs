#![warn(missing_docs)]

//! Data model and catalog store for the partwise customizer.
//!
//! This crate defines the part-type hierarchy and the normalized part
//! catalog that the assembly resolver and checkout logic operate on.
//! It is purely declarative — no mesh data, just ids, attach-point
//! metadata, and display info. Geometry loading is handled separately
//! by the scene adapter.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

mod catalog;
mod error;
mod part;
mod world;

pub use catalog::Catalog;
pub use error::{CatalogError, Result};
pub use part::{FileRef, Part, PartMetadata, PartStatus, RawPart};
pub use world::{Group, RawParts, WorldData};

/// Unique identifier for a part type (a customizable slot, e.g. "torso").
pub type PartTypeId = u64;

/// Unique identifier for a concrete part asset.
pub type PartId = u64;

/// Unique identifier for a generated composite mesh.
pub type CompositeMeshId = u64;

/// 3D offset with f64 components, in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Componentwise sum.
    pub fn add(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Componentwise negation.
    pub fn neg(&self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Link from a part type to the parent it attaches to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentLink {
    /// Id of the parent part type.
    pub id: PartTypeId,
    /// Named anchor on the parent's parts where this type's origin lands.
    pub attach_point: String,
}

/// A customizable slot in the character (e.g. "foot", "hand").
///
/// Part types form a forest: each has at most one parent, roots have
/// `parent = None`. Acyclicity is validated once at [`Catalog`]
/// construction, never per traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartType {
    /// Unique identifier.
    pub id: PartTypeId,
    /// Human-readable slot name.
    pub name: String,
    /// Parent attachment, `None` for root part types.
    #[serde(default)]
    pub parent: Option<ParentLink>,
}

/// Named attach points authored on a part's geometry.
pub type AttachPoints = HashMap<String, Vec3>;
