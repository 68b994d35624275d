//! orbit-ngin
//!
//! A small 2D scene-graph renderer. A tree of nodes carries local transforms,
//! colours, textures and shapes; engines animate transforms between frames; a
//! wgpu backend draws the result.
//!
//! High-level modules
//! - `camera`: camera trait and the orthographic 2D camera
//! - `config`: application settings
//! - `context`: GPU and window context that owns device/queue/pipelines/textures
//! - `data_structures`: transforms, shapes, materials, nodes, engines and scenes
//! - `error`: typed failures while assembling a scene
//! - `flow`: the window event loop driving update and render
//! - `pipelines`: bind group layouts and the shape render pipeline
//! - `resources`: helpers to load textures and shader sources
//! - `render`: draw calls collected by traversal and their GPU encoding
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use data_structures::{
    engine::{Engine, MovePointer},
    material::{Material, Rgba, TextureId},
    scene::Scene,
    scene_graph::{Content, Node},
    shape::{Geometry, Shape},
    state::{ShaderId, State},
    transform::{Transform, TransformHandle, Transforms},
};
pub use error::SceneError;
pub use wgpu;
