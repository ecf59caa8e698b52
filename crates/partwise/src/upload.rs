//! Upload staging and new-part payloads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use partwise_catalog::{FileRef, Part, PartId, PartMetadata, PartStatus, PartTypeId};

/// Split a filename into `(name, extension)` at the last dot.
///
/// A filename without a dot keeps its full name and yields an empty
/// extension.
pub fn name_and_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(dot) => (&filename[..dot], &filename[dot + 1..]),
        None => (filename, ""),
    }
}

/// An upload that passed validation and awaits wizard completion.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpload {
    /// Slot the new part will belong to.
    pub part_type_id: PartTypeId,
    /// Filename without extension.
    pub name: String,
    /// Accepted file extension.
    pub extension: String,
}

/// Payload for persisting a newly uploaded part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPartData {
    /// Display name.
    pub name: String,
    /// Slot the part belongs to.
    pub part_type_id: PartTypeId,
    /// Source file extension.
    pub extension: String,
    /// Location of the uploaded geometry.
    pub url: String,
    /// Preview image, if captured.
    #[serde(default)]
    pub img: Option<String>,
    /// Placement metadata authored in the upload wizard.
    #[serde(default)]
    pub metadata: PartMetadata,
}

impl NewPartData {
    /// Materialize the catalog part once the backend assigned an id.
    pub fn into_part(self, id: PartId) -> Part {
        Part {
            id,
            part_type_id: self.part_type_id,
            name: self.name,
            img: self.img,
            files: HashMap::from([(
                "default".to_string(),
                FileRef {
                    extension: self.extension,
                    url: self.url,
                },
            )]),
            metadata: self.metadata,
            premium: false,
            status: PartStatus::InSync,
        }
    }
}
