//! Error types at the session boundary.

use thiserror::Error;

/// Errors returned by the remote API client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend refused the request for lack of authorization.
    ///
    /// Surfaced to the UI as a login prompt, never as a generic
    /// failure.
    #[error("access denied")]
    AccessDenied,

    /// Any other failed request.
    #[error("request failed: {0}")]
    Request(String),
}

/// Errors returned by the scene adapter while loading or placing
/// geometry.
#[derive(Error, Debug)]
#[error("scene: {0}")]
pub struct SceneError(pub String);

/// Errors staging an upload before it reaches the backend.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The file extension is not in the accepted list.
    #[error("unrecognized extension '{0}'")]
    UnsupportedExtension(String),

    /// The target part type is not in the catalog.
    #[error("unknown part type {0}")]
    UnknownPartType(partwise_catalog::PartTypeId),
}

/// Errors loading session options.
#[derive(Error, Debug)]
pub enum OptionsError {
    /// The TOML source could not be parsed.
    #[error("malformed session options: {0}")]
    Malformed(#[from] toml::de::Error),
}
