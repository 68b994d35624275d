//! A scene: one root node, the transforms it animates and the engines animating them.
//!
//! Per frame the driver calls [`Scene::update`] and then [`Scene::render`].
//! `update` first cascades through the node tree and then runs every engine in
//! registration order, so whatever the engines do is visible in the frame
//! rendered right after.

use log::{debug, trace};

use crate::{
    camera::Camera,
    data_structures::{
        engine::Engine,
        scene_graph::Node,
        state::State,
        transform::{TransformHandle, Transforms},
    },
    error::SceneError,
    render::Frame,
};

pub struct Scene {
    root: Node,
    transforms: Transforms,
    engines: Vec<Box<dyn Engine>>,
}

impl Scene {
    /// Take ownership of a node tree and the arena its handles point into.
    ///
    /// Fails if any node refers to a transform outside `transforms`.
    pub fn new(root: Node, transforms: Transforms) -> Result<Self, SceneError> {
        for handle in root.transform_handles() {
            check_handle(&transforms, handle)?;
        }
        debug!(
            "scene with {} nodes and {} transforms",
            root.node_count(),
            transforms.len()
        );
        Ok(Self {
            root,
            transforms,
            engines: Vec::new(),
        })
    }

    /// Register an engine. Engines run in the order they were added.
    pub fn add_engine(&mut self, engine: impl Engine + 'static) -> Result<(), SceneError> {
        check_handle(&self.transforms, engine.target())?;
        self.engines.push(Box::new(engine));
        Ok(())
    }

    pub fn update(&mut self, dt: f32) {
        trace!("update dt={dt}");
        self.root.update(dt);
        for engine in self.engines.iter_mut() {
            engine.update(dt, &mut self.transforms);
        }
    }

    pub fn render(&self, camera: &dyn Camera) -> Frame {
        let mut frame = Frame::new();
        self.root
            .render(&State::new(camera), &self.transforms, &mut frame);
        trace!("rendered {} draw calls", frame.len());
        frame
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    /// Direct access for manual animation outside of engines.
    pub fn transforms_mut(&mut self) -> &mut Transforms {
        &mut self.transforms
    }

    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }
}

fn check_handle(transforms: &Transforms, handle: TransformHandle) -> Result<(), SceneError> {
    if transforms.contains(handle) {
        Ok(())
    } else {
        Err(SceneError::UnknownTransform(handle, transforms.len()))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{
        camera::Camera2D,
        data_structures::{
            engine::MovePointer,
            shape::{Geometry, Shape},
            state::ShaderId,
            transform::Transform,
        },
    };
    use cgmath::{Deg, Matrix4, Vector3, assert_abs_diff_eq};

    fn camera() -> Camera2D {
        Camera2D::new(-20.0, 20.0, -20.0, 20.0)
    }

    fn orbiting_scene() -> (Scene, TransformHandle, TransformHandle) {
        let mut transforms = Transforms::new();
        let orbit = transforms.insert(Transform::new());
        let mut offset = Transform::new();
        offset.translate(15.0, 0.0, 1.0);
        let offset = transforms.insert(offset);
        let root = Node::new(ShaderId(0)).with_transform(orbit).with(
            Node::new(ShaderId(0))
                .with_transform(offset)
                .with(Geometry::headless(Shape::default_disk())),
        );
        (Scene::new(root, transforms).unwrap(), orbit, offset)
    }

    #[test]
    fn disk_then_child_square_gives_two_ordered_draw_calls() {
        let root = Node::new(ShaderId(0))
            .with(Geometry::headless(Shape::disk(32).unwrap()))
            .with(Node::new(ShaderId(0)).with(Geometry::headless(Shape::Square)));
        let mut scene = Scene::new(root, Transforms::new()).unwrap();

        scene.update(1.0);
        let frame = scene.render(&camera());

        let shapes: Vec<_> = frame.iter().map(|call| call.geometry.shape()).collect();
        assert_eq!(shapes, vec![Shape::Disk { slices: 32 }, Shape::Square]);
        assert!(frame
            .iter()
            .all(|call| call.view_projection == camera().view_projection()));
    }

    #[test]
    fn engine_effect_is_visible_in_the_same_frame() {
        let (mut scene, orbit, _) = orbiting_scene();
        scene.add_engine(MovePointer::new(orbit, 100.0).unwrap()).unwrap();

        scene.update(0.9);
        let frame = scene.render(&camera());

        let expected = Matrix4::from_angle_z(Deg(90.0))
            * Matrix4::from_translation(Vector3::new(15.0, 0.0, 1.0));
        assert_abs_diff_eq!(frame.calls()[0].world, expected, epsilon = 1e-4);
    }

    #[test]
    fn update_then_render_is_deterministic() {
        let run = || {
            let (mut scene, orbit, offset) = orbiting_scene();
            scene.add_engine(MovePointer::new(orbit, 365.0).unwrap()).unwrap();
            scene.add_engine(MovePointer::new(offset, 28.0).unwrap()).unwrap();
            for dt in [0.016, 0.02, 0.5, 0.0, 1.0] {
                scene.update(dt);
            }
            scene.render(&camera()).summary()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn rendering_does_not_mutate_the_scene() {
        let (mut scene, orbit, _) = orbiting_scene();
        scene.add_engine(MovePointer::yearly(orbit)).unwrap();
        scene.update(0.5);
        let transforms = scene.transforms().clone();

        let first = scene.render(&camera());
        let second = scene.render(&camera());

        assert_eq!(first.summary(), second.summary());
        assert_eq!(scene.transforms()[orbit], transforms[orbit]);
    }

    #[test]
    fn every_registered_engine_runs_each_update() {
        let (mut scene, orbit, _) = orbiting_scene();
        scene.add_engine(MovePointer::new(orbit, 10.0).unwrap()).unwrap();
        scene.add_engine(MovePointer::new(orbit, 20.0).unwrap()).unwrap();
        assert_eq!(scene.engine_count(), 2);

        scene.update(0.1);
        // rotations about a shared axis commute: 100 + 50 degrees
        assert_abs_diff_eq!(
            scene.transforms()[orbit].matrix(),
            Matrix4::from_angle_z(Deg(150.0)),
            epsilon = 1e-4
        );
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let mut other = Transforms::new();
        other.insert(Transform::new());
        let stranger = other.insert(Transform::new());

        let root = Node::new(ShaderId(0)).with(Node::new(ShaderId(0)).with_transform(stranger));
        assert_eq!(
            Scene::new(root, Transforms::new()).err(),
            Some(SceneError::UnknownTransform(stranger, 0))
        );

        let (mut scene, _, _) = orbiting_scene();
        let mut far = Transforms::new();
        for _ in 0..5 {
            far.insert(Transform::new());
        }
        let far = far.insert(Transform::new());
        assert_eq!(
            scene.add_engine(MovePointer::yearly(far)),
            Err(SceneError::UnknownTransform(far, 2))
        );
        assert_eq!(scene.engine_count(), 0);
    }

    #[test]
    fn handles_from_another_arena_are_rejected_even_when_in_range() {
        let mut other = Transforms::new();
        let foreign = other.insert(Transform::new());
        let mut mine = Transforms::new();
        let local = mine.insert(Transform::new());
        assert_eq!(foreign.index(), local.index());

        let root = Node::new(ShaderId(0)).with_transform(foreign);
        assert_eq!(
            Scene::new(root, mine.clone()).err(),
            Some(SceneError::UnknownTransform(foreign, 1))
        );

        let mut scene = Scene::new(Node::new(ShaderId(0)).with_transform(local), mine).unwrap();
        assert_eq!(
            scene.add_engine(MovePointer::yearly(foreign)),
            Err(SceneError::UnknownTransform(foreign, 1))
        );
        assert_eq!(scene.engine_count(), 0);

        scene.add_engine(MovePointer::yearly(local)).unwrap();
        scene.update(1.0);
        assert_eq!(other[foreign], Transform::new());
        assert_ne!(scene.transforms()[local], Transform::new());
    }

    #[test]
    fn manual_transform_edits_show_up_in_the_next_frame() {
        let (mut scene, _, offset) = orbiting_scene();
        scene.transforms_mut()[offset].reset().translate(-4.0, 2.0, 0.0);
        let frame = scene.render(&camera());
        assert_eq!(
            frame.calls()[0].world,
            Matrix4::from_translation(Vector3::new(-4.0, 2.0, 0.0))
        );
        assert!(Rc::strong_count(&frame.calls()[0].geometry) >= 2);
    }
}
