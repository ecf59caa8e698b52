//! Concrete part assets and their attachment metadata.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{AttachPoints, PartId, PartTypeId, Vec3};

/// Synchronization status of a part relative to the backend.
///
/// Status is only ever mutated through the catalog store; a part is
/// never physically removed until a delete call has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartStatus {
    /// Persisted and consistent with the backend.
    InSync,
    /// A mutating request for this part is in flight.
    Loading,
    /// Deleted on the backend, kept locally as a tombstone.
    Deleted,
}

/// Reference to one uploaded file variant of a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    /// File extension without the dot (e.g. "stl").
    pub extension: String,
    /// Location the scene adapter loads geometry from.
    pub url: String,
}

/// Authored placement metadata for a part.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartMetadata {
    /// Offset of the authored origin from the mesh pivot.
    ///
    /// Meshes are authored with the origin moved to their own pivot;
    /// the resolver negates this at the root to re-align the composite
    /// at the world origin.
    #[serde(default)]
    pub position: Option<Vec3>,
    /// Named anchors where child part types connect.
    #[serde(default)]
    pub attach_points: AttachPoints,
}

impl PartMetadata {
    /// Authored origin offset, zero when unspecified.
    pub fn position_or_zero(&self) -> Vec3 {
        self.position.unwrap_or(Vec3::ZERO)
    }

    /// Position of a named attach point, zero when the point is absent.
    pub fn attach_point(&self, name: &str) -> Vec3 {
        self.attach_points.get(name).copied().unwrap_or(Vec3::ZERO)
    }
}

/// A part as it arrives from the backend, before normalization.
///
/// Raw parts are keyed by part type externally, so they carry no
/// `part_type_id` and no status of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPart {
    /// Unique identifier.
    pub id: PartId,
    /// Display name.
    pub name: String,
    /// Preview image location, if any.
    #[serde(default)]
    pub img: Option<String>,
    /// Uploaded file variants, keyed by variant name ("default", ...).
    #[serde(default)]
    pub files: HashMap<String, FileRef>,
    /// Authored placement metadata.
    #[serde(default)]
    pub metadata: PartMetadata,
    /// Whether the asset is gated behind a premium account.
    #[serde(default)]
    pub premium: bool,
    /// Author display name.
    #[serde(default)]
    pub author: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A concrete selectable mesh asset belonging to a part type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Unique identifier.
    pub id: PartId,
    /// The slot this part belongs to.
    pub part_type_id: PartTypeId,
    /// Display name.
    pub name: String,
    /// Preview image location, if any.
    #[serde(default)]
    pub img: Option<String>,
    /// Uploaded file variants, keyed by variant name.
    #[serde(default)]
    pub files: HashMap<String, FileRef>,
    /// Authored placement metadata.
    #[serde(default)]
    pub metadata: PartMetadata,
    /// Whether the asset is gated behind a premium account.
    #[serde(default)]
    pub premium: bool,
    /// Synchronization status.
    pub status: PartStatus,
}

impl Part {
    /// Normalize a raw part under its part type.
    pub fn from_raw(raw: RawPart, part_type_id: PartTypeId) -> Self {
        Self {
            id: raw.id,
            part_type_id,
            name: raw.name,
            img: raw.img,
            files: raw.files,
            metadata: raw.metadata,
            premium: raw.premium,
            status: PartStatus::InSync,
        }
    }
}
