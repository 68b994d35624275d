//! Scene data structures.
//!
//! Everything but `texture` is plain CPU data and can be built and traversed
//! without a GPU:
//!
//! - `transform` holds composable affine transforms and the arena animating them
//! - `shape` generates disk, square and triangle meshes and uploads them
//! - `material` contains colours, texture handles and the inherited material state
//! - `state` is the draw-time context copied down the tree
//! - `scene_graph` defines nodes and how they are traversed
//! - `engine` holds per-frame animation units
//! - `scene` ties a root node, its transforms and its engines together
//! - `texture` contains the GPU texture wrapper and creation utilities

pub mod engine;
pub mod material;
pub mod scene;
pub mod scene_graph;
pub mod shape;
pub mod state;
pub mod texture;
pub mod transform;
