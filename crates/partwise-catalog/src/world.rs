//! Raw world data as delivered by the backend.
//!
//! Part types arrive grouped (`groups[].categories[]`) and parts arrive
//! keyed by part type id; [`crate::Catalog::from_world`] flattens both
//! into the normalized store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::{PartType, PartTypeId, RawPart, Vec3};

/// One display group of part-type categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Part types in this group, in display order.
    pub categories: Vec<PartType>,
}

/// Top-level customizer world payload.
///
/// Session fields (`name`, `price`, ...) are adopted by the facade;
/// only `groups` matters to the catalog itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldData {
    /// Customizer title.
    #[serde(default)]
    pub name: String,
    /// Price of a composite download, zero when free.
    #[serde(default)]
    pub price: f64,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Whether the customizer is hidden from public listings.
    #[serde(default)]
    pub is_private: bool,
    /// Cover image location, if any.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Owner display name.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Owner profile location.
    #[serde(default)]
    pub user_url: Option<String>,
    /// Initial rotation applied to the scene container.
    #[serde(default)]
    pub container_rotation: Option<Vec3>,
    /// Part-type groups, in display order.
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl WorldData {
    /// Deserialize world data from the backend's JSON payload.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize back to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Part types across all groups, flattened in display order.
    pub fn part_types(&self) -> impl Iterator<Item = &PartType> {
        self.groups.iter().flat_map(|group| group.categories.iter())
    }
}

/// Parts payload: per-part-type lists plus the id order to read them in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParts {
    /// Parts of each part type, in display order.
    #[serde(default)]
    pub by_part_type_id: HashMap<PartTypeId, Vec<RawPart>>,
    /// Part type ids in the order their lists should be ingested.
    #[serde(default)]
    pub all_part_type_ids: Vec<PartTypeId>,
}

impl RawParts {
    /// Deserialize the parts payload from the backend's JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
