//! Draw-time context threaded through the scene graph.

use cgmath::{Matrix4, SquareMatrix};

use crate::{
    camera::Camera,
    data_structures::material::{Material, MaterialState},
};

/// Handle of a render pipeline registered with the GPU context.
///
/// `ShaderId::default()` is the built-in shape shader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ShaderId(pub usize);

/// Everything a draw call inherits from its ancestors.
///
/// A `State` is a value: composing a node into it produces a new one, so
/// nothing a node contributes can reach its siblings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct State {
    pub world: Matrix4<f32>,
    pub view_projection: Matrix4<f32>,
    pub shader: ShaderId,
    pub material: MaterialState,
}

impl State {
    pub fn new(camera: &dyn Camera) -> Self {
        Self {
            view_projection: camera.view_projection(),
            ..Self::default()
        }
    }

    pub fn composed_with(
        &self,
        local: Option<Matrix4<f32>>,
        shader: ShaderId,
        materials: &[Material],
    ) -> State {
        State {
            world: match local {
                Some(local) => self.world * local,
                None => self.world,
            },
            view_projection: self.view_projection,
            shader,
            material: self.material.applied(materials),
        }
    }

    /// Final clip-space matrix of geometry drawn with this state.
    pub fn model_view_projection(&self) -> Matrix4<f32> {
        self.view_projection * self.world
    }
}

impl Default for State {
    fn default() -> Self {
        Self {
            world: Matrix4::identity(),
            view_projection: Matrix4::identity(),
            shader: ShaderId::default(),
            material: MaterialState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        camera::Camera2D,
        data_structures::material::{Rgba, TextureId},
    };
    use cgmath::Vector3;

    #[test]
    fn new_state_takes_the_camera_matrices() {
        let camera = Camera2D::new(-20.0, 20.0, -20.0, 20.0);
        let state = State::new(&camera);
        assert_eq!(state.view_projection, camera.view_projection());
        assert_eq!(state.world, Matrix4::identity());
        assert_eq!(state.shader, ShaderId::default());
    }

    #[test]
    fn composition_right_multiplies_and_leaves_the_parent_alone() {
        let parent = State::default().composed_with(
            Some(Matrix4::from_translation(Vector3::new(15.0, 0.0, 1.0))),
            ShaderId(0),
            &[Material::Texture(TextureId(3))],
        );
        let snapshot = parent;
        let local = Matrix4::from_nonuniform_scale(0.5, 0.5, 1.0);

        let child = parent.composed_with(Some(local), ShaderId(1), &[Material::color(1.0, 0.0, 0.0)]);

        assert_eq!(parent, snapshot);
        assert_eq!(child.world, parent.world * local);
        assert_eq!(child.shader, ShaderId(1));
        assert_eq!(child.material.texture, Some(TextureId(3)));
        assert_eq!(child.material.color, Rgba::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn missing_local_transform_is_identity() {
        let parent = State::default().composed_with(
            Some(Matrix4::from_angle_z(cgmath::Deg(30.0))),
            ShaderId(0),
            &[],
        );
        let child = parent.composed_with(None, ShaderId(0), &[]);
        assert_eq!(child.world, parent.world);
        assert_eq!(child.material, parent.material);
    }
}
