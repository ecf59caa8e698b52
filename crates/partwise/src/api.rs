//! Remote-API boundary.

use serde::{Deserialize, Serialize};

use partwise_catalog::{CompositeMeshId, PartId};
use partwise_checkout::CompositeMeshRecord;

use crate::error::ApiError;
use crate::session::SessionSettings;
use crate::upload::NewPartData;

/// Download descriptor for a finished composite mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDownload {
    /// Location of the generated file.
    pub file_url: String,
}

/// The backend the session persists through.
///
/// Calls block the invoking event handler; failures are reported as
/// [`ApiError`] and handled at the call site (logged, rolled back, or
/// turned into a login prompt).
pub trait ApiClient {
    /// Delete an uploaded part.
    fn delete_part(&mut self, id: PartId) -> Result<(), ApiError>;

    /// Persist a newly uploaded part, returning its assigned id.
    fn post_part(&mut self, part: &NewPartData) -> Result<PartId, ApiError>;

    /// Request generation of a composite mesh for a part-id set.
    fn generate_customized_mesh(
        &mut self,
        selected_part_ids: &[PartId],
    ) -> Result<CompositeMeshRecord, ApiError>;

    /// Fetch the download descriptor of a generated composite.
    fn get_customized_mesh(&mut self, id: CompositeMeshId) -> Result<MeshDownload, ApiError>;

    /// Put a generated composite in the user's cart.
    ///
    /// The returned payload is forwarded opaquely to the UI in
    /// [`crate::Effect::ItemAddedToCart`].
    fn add_to_cart(&mut self, id: CompositeMeshId) -> Result<serde_json::Value, ApiError>;

    /// Patch customizer settings, returning the fields as stored.
    fn patch_customizer(&mut self, fields: &SessionSettings) -> Result<SessionSettings, ApiError>;
}
