#![warn(missing_docs)]

//! partwise — composable character/avatar part assembly core.
//!
//! A [`Customizer`] session owns the part catalog, the current
//! [`Selection`], and the user's generated-composite collections, and
//! drives an injected [`SceneAdapter`] and [`ApiClient`] from discrete
//! UI events. Rendering and HTTP transport stay behind those traits so
//! the attachment resolver and checkout logic run (and test) without a
//! rendering environment.
//!
//! # Example
//!
//! ```rust,ignore
//! use partwise::{Customizer, SessionOptions};
//!
//! let options = SessionOptions::from_toml(&std::fs::read_to_string("session.toml")?)?;
//! let mut session = Customizer::new(scene, api, options, &world, &parts, meshes, owned, cart)?;
//! session.restore_selection(url_fragment.as_deref());
//! let effects = session.download();
//! ```

mod api;
mod error;
mod options;
mod scene;
mod session;
mod upload;

pub use api::{ApiClient, MeshDownload};
pub use error::{ApiError, OptionsError, SceneError, UploadError};
pub use options::SessionOptions;
pub use scene::SceneAdapter;
pub use session::{Customizer, Effect, SessionSettings};
pub use upload::{name_and_extension, NewPartData, PendingUpload};

pub use partwise_assembly::{global_position, parent_attach_point_position, Selection};
pub use partwise_catalog::{
    Catalog, CatalogError, CompositeMeshId, Part, PartId, PartStatus, PartType, PartTypeId,
    RawParts, Vec3, WorldData,
};
pub use partwise_checkout::{
    must_buy, CompositeIndex, CompositeMeshRecord, Fingerprint, PurchaseTerms, MESH_STATUS_READY,
};
