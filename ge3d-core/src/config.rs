//! Engine configuration.
//!
//! Every section has defaults, so a partial JSON file only needs the values it wants to
//! change:
//!
//! ```json
//! { "window": { "title": "demo", "vsync": false }, "camera": { "controls": "first_person" } }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::Controls;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub gl: GlConfig,
    pub paths: PathConfig,
    pub camera: CameraConfig,
    pub log: LogConfig,
}

impl EngineConfig {
    /// Reads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
    /// Hide the cursor and report relative motion.
    pub capture_cursor: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "ge3d".to_owned(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            capture_cursor: false,
        }
    }
}

/// Requested OpenGL core profile version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlConfig {
    pub major: u8,
    pub minor: u8,
}

impl Default for GlConfig {
    fn default() -> Self {
        Self { major: 3, minor: 3 }
    }
}

/// Asset directories. The per-kind directories are relative to `base`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub base: PathBuf,
    pub models: PathBuf,
    pub skyboxes: PathBuf,
    pub textures: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            base: PathBuf::from("../../"),
            models: PathBuf::from("models/"),
            skyboxes: PathBuf::from("skyboxes/"),
            textures: PathBuf::from("textures/"),
        }
    }
}

impl PathConfig {
    pub fn resolve_model(&self, name: impl AsRef<Path>) -> PathBuf {
        self.base.join(&self.models).join(name)
    }

    pub fn resolve_skybox(&self, name: impl AsRef<Path>) -> PathBuf {
        self.base.join(&self.skyboxes).join(name)
    }

    pub fn resolve_texture(&self, name: impl AsRef<Path>) -> PathBuf {
        self.base.join(&self.textures).join(name)
    }
}

/// Settings of the camera created with the game. Angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub controls: Controls,
    pub max_fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            controls: Controls::Navigator,
            max_fov: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
    /// Also write log lines to this file.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: None,
        }
    }
}
