#![warn(missing_docs)]

//! Selection model and attach-point position resolution.
//!
//! A [`Selection`] records which part is equipped in each slot; the
//! [`resolver`] walks the part-type hierarchy to place each slot's mesh
//! in global coordinates. Both are pure over the catalog — rendering
//! and persistence happen elsewhere.

mod selection;
pub mod resolver;

pub use resolver::{global_position, parent_attach_point_position};
pub use selection::Selection;
