//! Composable affine transforms and the arena that owns them.
//!
//! A [`Transform`] is a 4x4 matrix plus incremental mutations. Every mutation
//! right-multiplies the current matrix, so calls compose in the order they are
//! made: `translate` followed by `scale` first scales the geometry in object
//! space and then moves it.
//!
//! Transforms that are animated live in a [`Transforms`] arena. Nodes and engines
//! only hold [`TransformHandle`]s, which keeps the animation system free of
//! references into the scene graph.

use std::{
    ops::{Index, IndexMut},
    sync::atomic::{AtomicU64, Ordering},
};

use cgmath::{Deg, InnerSpace, Matrix4, SquareMatrix, Vector3, Zero};
use log::warn;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f32>,
}

impl Transform {
    /// The identity transform.
    pub fn new() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.matrix = self.matrix * Matrix4::from_translation(Vector3::new(x, y, z));
        self
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.matrix = self.matrix * Matrix4::from_nonuniform_scale(x, y, z);
        self
    }

    /// Rotate by `degrees` around the axis `(x, y, z)`.
    ///
    /// The axis does not need to be normalized. A zero axis leaves the transform
    /// untouched.
    pub fn rotate(&mut self, degrees: f32, x: f32, y: f32, z: f32) -> &mut Self {
        let axis = Vector3::new(x, y, z);
        if axis.is_zero() {
            warn!("ignoring rotation of {degrees} degrees around a zero axis");
            return self;
        }
        self.matrix = self.matrix * Matrix4::from_axis_angle(axis.normalize(), Deg(degrees));
        self
    }

    pub fn reset(&mut self) -> &mut Self {
        self.matrix = Matrix4::identity();
        self
    }

    pub fn set_matrix(&mut self, matrix: Matrix4<f32>) -> &mut Self {
        self.matrix = matrix;
        self
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.matrix
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Matrix4<f32>> for Transform {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }
}

/// Stable address of a transform inside one [`Transforms`] arena.
///
/// A handle remembers which arena issued it, so a handle from another arena is
/// never mistaken for a local one even when its index is in range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransformHandle {
    arena: u64,
    index: usize,
}

impl TransformHandle {
    pub fn index(self) -> usize {
        self.index
    }
}

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Arena of every transform a scene can animate.
///
/// Handles stay valid for the lifetime of the arena: transforms are only ever
/// appended, never removed. A clone keeps the arena identity, so handles issued
/// before cloning address the same slots in the copy.
#[derive(Clone, Debug)]
pub struct Transforms {
    id: u64,
    slots: Vec<Transform>,
}

impl Default for Transforms {
    fn default() -> Self {
        Self {
            id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
        }
    }
}

impl Transforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, transform: Transform) -> TransformHandle {
        self.slots.push(transform);
        TransformHandle {
            arena: self.id,
            index: self.slots.len() - 1,
        }
    }

    pub fn get(&self, handle: TransformHandle) -> Option<&Transform> {
        self.owns(handle).then(|| &self.slots[handle.index])
    }

    pub fn get_mut(&mut self, handle: TransformHandle) -> Option<&mut Transform> {
        if self.owns(handle) {
            self.slots.get_mut(handle.index)
        } else {
            None
        }
    }

    /// Whether `handle` was issued by this arena (or the arena it was cloned from).
    pub fn contains(&self, handle: TransformHandle) -> bool {
        self.owns(handle)
    }

    fn owns(&self, handle: TransformHandle) -> bool {
        handle.arena == self.id && handle.index < self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/**
 * Indexing panics on a foreign handle. Scenes validate every handle they are
 * built with, so inside a scene this cannot happen.
 */
impl Index<TransformHandle> for Transforms {
    type Output = Transform;

    fn index(&self, handle: TransformHandle) -> &Self::Output {
        match self.get(handle) {
            Some(transform) => transform,
            None => panic!("{handle:?} does not belong to this arena"),
        }
    }
}

impl IndexMut<TransformHandle> for Transforms {
    fn index_mut(&mut self, handle: TransformHandle) -> &mut Self::Output {
        match self.get_mut(handle) {
            Some(transform) => transform,
            None => panic!("{handle:?} does not belong to this arena"),
        }
    }
}
