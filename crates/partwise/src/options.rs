//! Session options, loadable from TOML.

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

fn default_accepted_extensions() -> Vec<String> {
    ["stl", "obj", "gltf", "glb"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_rescale_padding() -> f64 {
    4.0
}

/// Per-session behavior switches the embedding page supplies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Whether downloads are gated behind purchases at all.
    pub pay_per_download_enabled: bool,
    /// Whether the caller can edit this customizer (owner or admin).
    pub edit_mode: bool,
    /// Upload file extensions accepted by [`crate::Customizer::stage_upload`].
    pub accepted_extensions: Vec<String>,
    /// Container padding applied after a single-part swap.
    pub rescale_padding: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            pay_per_download_enabled: false,
            edit_mode: false,
            accepted_extensions: default_accepted_extensions(),
            rescale_padding: default_rescale_padding(),
        }
    }
}

impl SessionOptions {
    /// Parse options from a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(source)?)
    }

    /// Whether a file extension is accepted for upload.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.accepted_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(extension))
    }
}
