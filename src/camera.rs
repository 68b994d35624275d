//! Cameras seed the traversal with a view and a projection.

use cgmath::{Matrix4, SquareMatrix};

/// cgmath builds OpenGL clip space (z in [-1, 1]); wgpu expects z in [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub trait Camera {
    fn view(&self) -> Matrix4<f32>;

    /// Projection into wgpu clip space.
    fn projection(&self) -> Matrix4<f32>;

    fn view_projection(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }
}

/// Orthographic camera looking down the z axis at a fixed window of the plane.
///
/// Depths in `[-10, 10]` are visible; larger z ends up in front.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera2D {
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
}

impl Camera2D {
    pub const DEPTH: f32 = 10.0;

    pub fn new(xmin: f32, xmax: f32, ymin: f32, ymax: f32) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }
}

impl Camera for Camera2D {
    fn view(&self) -> Matrix4<f32> {
        Matrix4::identity()
    }

    fn projection(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX
            * cgmath::ortho(
                self.xmin,
                self.xmax,
                self.ymin,
                self.ymax,
                -Self::DEPTH,
                Self::DEPTH,
            )
    }
}
