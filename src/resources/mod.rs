/**
 * This module contains all logic for loading textures and shader sources from
 * the asset directory.
 */
pub mod texture;

pub use texture::{load_binary, load_string, load_texture};
