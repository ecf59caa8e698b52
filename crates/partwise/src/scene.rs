//! Scene-adapter boundary.

use std::collections::HashMap;

use partwise_catalog::{Part, PartType, PartTypeId, Vec3};

use crate::error::SceneError;

/// The 3D scene manager the session drives.
///
/// Implementations own geometry loading and rendering; the session only
/// tells them which part goes in which slot. Loading may suspend the
/// caller — the session brackets such calls with its loading flag.
///
/// Canvas access is deliberately not part of this trait: the canvas
/// type is implementation-specific and the session never touches it, so
/// the embedding UI reaches it through
/// [`Customizer::scene`](crate::Customizer::scene) instead.
pub trait SceneAdapter {
    /// Prepare one scene slot per part type.
    fn init(&mut self, part_types: &[PartType]);

    /// Load a part's geometry and place it in its slot, replacing
    /// whatever was there.
    fn add(&mut self, part_type_id: PartTypeId, part: &Part) -> Result<(), SceneError>;

    /// Load and place a full set of parts at once.
    fn add_all(&mut self, parts: &HashMap<PartTypeId, Part>) -> Result<(), SceneError>;

    /// Refit the scene container around the placed objects.
    fn rescale_container_to_fit_objects(&mut self, padding: Option<f64>);

    /// Redraw.
    fn render_scene(&mut self);

    /// Rotate the scene container.
    fn set_container_rotation(&mut self, rotation: Vec3);
}
