//! Scene configuration loading and saving
//!
//! Uses RON (Rusty Object Notation) so scene files stay human-editable.
//! Every field has a default, so a scene file only needs the values it
//! changes.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::rasterizer::{Color, Light, Material, Vec3};

/// Framebuffer size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { width: 800, height: 900 }
    }
}

impl ViewportConfig {
    /// Size as texture dimensions, or `None` when a side is zero or
    /// does not fit in a `u16`
    pub fn texture_size(&self) -> Option<(u16, u16)> {
        let w = u16::try_from(self.width).ok().filter(|&w| w > 0)?;
        let h = u16::try_from(self.height).ok().filter(|&h| h > 0)?;
        Some((w, h))
    }
}

/// Look-at camera with a perspective lens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// A dent in the moon surface, in (theta, phi) angle space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crater {
    pub theta: f32,
    pub phi: f32,
    pub radius: f32,
    pub depth: f32,
}

impl Crater {
    pub const fn new(theta: f32, phi: f32, radius: f32, depth: f32) -> Self {
        Self { theta, phi, radius, depth }
    }
}

/// Cratered sphere parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
    pub radius: f32,
    pub lat_segments: usize,
    pub lon_segments: usize,
    /// Amplitude of the sin/cos surface ripple
    pub roughness: f32,
    pub material: Material,
    pub craters: Vec<Crater>,
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            radius: 2.0,
            lat_segments: 400,
            lon_segments: 400,
            roughness: 0.02,
            material: Material {
                ambient: Vec3::splat(0.2),
                diffuse: Vec3::new(0.8, 0.8, 0.75),
                specular: Vec3::splat(0.2),
                shininess: 8.0,
            },
            craters: vec![
                Crater::new(0.5, 0.8, 0.3, 0.15),
                Crater::new(2.0, 1.5, 0.25, 0.12),
                Crater::new(-1.0, 0.5, 0.2, 0.10),
                Crater::new(1.5, -0.7, 0.35, 0.18),
                Crater::new(-0.8, -1.2, 0.15, 0.08),
                Crater::new(0.2, -0.3, 0.22, 0.11),
                Crater::new(-1.8, 1.8, 0.28, 0.14),
                Crater::new(2.5, 0.2, 0.18, 0.09),
            ],
        }
    }
}

/// Which object sits at the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Moon,
    Cube,
}

/// Filled triangles or outlines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    Shaded,
    Wireframe,
}

/// Everything needed to render a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub viewport: ViewportConfig,
    pub clear_color: Color,
    pub camera: CameraConfig,
    pub light: Light,
    pub subject: Subject,
    pub moon: MoonConfig,
    pub mode: RenderMode,
    pub wire_color: Color,
    pub show_light_marker: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            clear_color: Color::BLACK,
            camera: CameraConfig::default(),
            light: Light {
                position: Vec3::new(5.0, 3.0, 5.0),
                color: Vec3::ONE,
                ambient: Vec3::splat(0.3),
            },
            subject: Subject::Moon,
            moon: MoonConfig::default(),
            mode: RenderMode::Shaded,
            wire_color: Color::WHITE,
            show_light_marker: false,
        }
    }
}

/// Why a scene file could not be read or written
#[derive(Debug)]
pub enum ConfigError {
    /// The scene file could not be opened or read
    Read { path: PathBuf, source: std::io::Error },
    /// The scene file could not be written
    Write { path: PathBuf, source: std::io::Error },
    /// The text is not a valid scene description
    Parse(ron::error::SpannedError),
    /// The scene could not be turned into RON
    Serialize(ron::Error),
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read scene file {}: {}", path.display(), source)
            }
            ConfigError::Write { path, source } => {
                write!(f, "cannot write scene file {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "invalid scene description: {}", e),
            ConfigError::Serialize(e) => write!(f, "cannot encode scene as RON: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } | ConfigError::Write { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
        }
    }
}

/// Load a scene from a RON file
pub fn load_scene_config<P: AsRef<Path>>(path: P) -> Result<SceneConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = load_scene_config_from_str(&contents)?;
    log::info!("loaded scene config from {}", path.display());
    Ok(config)
}

/// Parse a scene from a RON string
pub fn load_scene_config_from_str(s: &str) -> Result<SceneConfig, ConfigError> {
    let config: SceneConfig = ron::from_str(s)?;
    Ok(config)
}

/// Save a scene to a RON file
pub fn save_scene_config<P: AsRef<Path>>(config: &SceneConfig, path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
