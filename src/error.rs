//! Typed construction failures of the scene core.
//!
//! Everything that can be rejected while a scene is being assembled is a
//! [`SceneError`]. Once a [`Scene`](crate::data_structures::scene::Scene) exists,
//! updating and rendering it cannot fail. GPU setup and asset IO report through
//! `anyhow` instead, as they are fatal to startup anyway.

use thiserror::Error;

use crate::data_structures::transform::TransformHandle;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// A disk fan needs at least a triangle's worth of rim.
    #[error("a disk needs at least 3 slices, got {0}")]
    TooFewSlices(u32),

    #[error("orbital period must be positive and finite, got {0}")]
    InvalidPeriod(f32),

    /// A node or engine refers to a transform the scene does not own.
    #[error("transform {0:?} is not part of this scene (arena holds {1} transforms)")]
    UnknownTransform(TransformHandle, usize),
}
