use std::fs;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };

use serde::Deserialize;

use crate::engine::error::{ RenderError, Result };

/// Name of the optional settings file looked up inside the resources directory.
pub const CONFIG_FILE_NAME: &str = "cubegl.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            title: "CubeGl Modular".to_string(),
            vsync: true,
        }
    }
}

impl WindowConfig {
    pub fn aspect_ratio(&self) -> f32 {
        (self.width as f32) / (self.height.max(1) as f32)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { fov_degrees: 60.0, near: 0.1, far: 100.0 }
    }
}

/// Per-second rates; the frame loop scales them by delta time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub move_speed: f32,
    /// Degrees of yaw per second.
    pub rotation_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self { move_speed: 5.0, rotation_speed: 80.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub resources_dir: PathBuf,
    /// Texture path relative to `resources_dir`.
    pub texture: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            resources_dir: PathBuf::from("resources"),
            texture: PathBuf::from("textures/crate.png"),
        }
    }
}

impl AppConfig {
    /// Reads `path` if it exists. A missing file yields the defaults; a file
    /// that cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(RenderError::Config { path: path.to_path_buf(), reason: e.to_string() });
            }
        };

        let config: AppConfig = serde_json
            ::from_str(&text)
            .map_err(|e| RenderError::Config { path: path.to_path_buf(), reason: e.to_string() })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn texture_path(&self) -> PathBuf {
        self.resources_dir.join(&self.texture)
    }
}
