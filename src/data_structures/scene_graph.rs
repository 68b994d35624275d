//! Scene graph nodes.
//!
//! A [`Node`] bundles an optional local transform, a list of materials, a list of
//! geometry and a list of child nodes. Rendering composes the node's own
//! contributions into the inherited [`State`], draws the node's geometry and then
//! hands the very same composed state to every child. Children and geometry are
//! shared through `Rc`, so one subtree or one mesh may appear under several
//! parents.

use std::rc::Rc;

use log::trace;

use crate::{
    data_structures::{
        material::Material,
        shape::Geometry,
        state::{ShaderId, State},
        transform::{TransformHandle, Transforms},
    },
    render::Frame,
};

/// Anything a node can hold: another node or a piece of geometry.
#[derive(Clone, Debug)]
pub enum Content {
    Node(Rc<Node>),
    Geometry(Rc<Geometry>),
}

impl From<Node> for Content {
    fn from(node: Node) -> Self {
        Content::Node(Rc::new(node))
    }
}

impl From<Rc<Node>> for Content {
    fn from(node: Rc<Node>) -> Self {
        Content::Node(node)
    }
}

impl From<Geometry> for Content {
    fn from(geometry: Geometry) -> Self {
        Content::Geometry(Rc::new(geometry))
    }
}

impl From<Rc<Geometry>> for Content {
    fn from(geometry: Rc<Geometry>) -> Self {
        Content::Geometry(geometry)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    shader: ShaderId,
    transform: Option<TransformHandle>,
    materials: Vec<Material>,
    geometry: Vec<Rc<Geometry>>,
    children: Vec<Rc<Node>>,
}

impl Node {
    pub fn new(shader: ShaderId) -> Self {
        Self {
            shader,
            transform: None,
            materials: Vec::new(),
            geometry: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: TransformHandle) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_material(mut self, material: impl Into<Material>) -> Self {
        self.materials.push(material.into());
        self
    }

    pub fn with_materials(mut self, materials: impl IntoIterator<Item = Material>) -> Self {
        self.materials.extend(materials);
        self
    }

    /// Append a child node or a piece of geometry, keeping insertion order.
    pub fn with(mut self, content: impl Into<Content>) -> Self {
        match content.into() {
            Content::Node(node) => self.children.push(node),
            Content::Geometry(geometry) => self.geometry.push(geometry),
        }
        self
    }

    pub fn with_all(self, contents: impl IntoIterator<Item = Content>) -> Self {
        contents.into_iter().fold(self, |node, content| node.with(content))
    }

    pub fn shader(&self) -> ShaderId {
        self.shader
    }

    pub fn transform(&self) -> Option<TransformHandle> {
        self.transform
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn geometry(&self) -> &[Rc<Geometry>] {
        &self.geometry
    }

    pub fn children(&self) -> &[Rc<Node>] {
        &self.children
    }

    /// Number of nodes in this subtree, counting shared subtrees once per parent.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Every transform handle referenced by this subtree, in traversal order.
    pub fn transform_handles(&self) -> Vec<TransformHandle> {
        let mut handles = Vec::new();
        self.collect_handles(&mut handles);
        handles
    }

    fn collect_handles(&self, handles: &mut Vec<TransformHandle>) {
        handles.extend(self.transform);
        self.children
            .iter()
            .for_each(|child| child.collect_handles(handles));
    }

    /// Advance per-frame state of the subtree.
    ///
    /// Geometry is static, so this only walks the children; animation lives in
    /// engines.
    pub fn update(&self, dt: f32) {
        for child in &self.children {
            child.update(dt);
        }
    }

    pub fn render(&self, state: &State, transforms: &Transforms, frame: &mut Frame) {
        let local = self
            .transform
            .and_then(|handle| transforms.get(handle))
            .map(|transform| transform.matrix());
        let child_state = state.composed_with(local, self.shader, &self.materials);
        trace!(
            "node: {} geometry, {} children, material {:?}",
            self.geometry.len(),
            self.children.len(),
            child_state.material
        );
        for geometry in &self.geometry {
            frame.draw(geometry, &child_state);
        }
        for child in &self.children {
            child.render(&child_state, transforms, frame);
        }
    }
}
