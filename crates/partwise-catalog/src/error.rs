//! Error types for catalog construction and lookup.

use thiserror::Error;

use crate::PartTypeId;

/// Errors that can occur while building or validating a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A part type references a parent that is not in the catalog.
    #[error("part type {part_type} references unknown parent {parent}")]
    UnknownParent {
        /// The child part type.
        part_type: PartTypeId,
        /// The missing parent id.
        parent: PartTypeId,
    },

    /// The parent graph contains a cycle.
    #[error("parent cycle detected through part type {0}")]
    ParentCycle(PartTypeId),

    /// A part list references a part type that is not in the catalog.
    #[error("parts listed under unknown part type {0}")]
    UnknownPartType(PartTypeId),

    /// World data could not be deserialized.
    #[error("malformed world data: {0}")]
    MalformedWorld(#[from] serde_json::Error),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
