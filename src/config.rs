//! Application settings.
//!
//! A [`Config`] is handed to [`run`](crate::flow::run) and stays available on the
//! [`Context`](crate::context::Context) while the scene is being built.

use std::path::PathBuf;

use winit::keyboard::KeyCode;

/// Environment variable that overrides [`Config::asset_dir`].
pub const ASSET_DIR_VAR: &str = "ORBIT_ASSETS";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_colour: wgpu::Color,
    /// Directory textures and shaders are loaded from.
    pub asset_dir: PathBuf,
    pub quit_key: KeyCode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "orbit-ngin".to_string(),
            width: 800,
            height: 600,
            clear_colour: wgpu::Color::BLACK,
            asset_dir: PathBuf::from("./assets"),
            quit_key: KeyCode::KeyQ,
        }
    }
}

impl Config {
    /// Defaults, with the asset directory taken from `ORBIT_ASSETS` when set.
    pub fn from_env() -> Self {
        Self::default().with_env(|var| std::env::var(var).ok())
    }

    fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ASSET_DIR_VAR).filter(|dir| !dir.is_empty()) {
            self.asset_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_clear_colour(mut self, clear_colour: wgpu::Color) -> Self {
        self.clear_colour = clear_colour;
        self
    }

    pub fn with_asset_dir(mut self, asset_dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = asset_dir.into();
        self
    }

    pub fn with_quit_key(mut self, quit_key: KeyCode) -> Self {
        self.quit_key = quit_key;
        self
    }
}
