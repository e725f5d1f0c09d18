//! Lumina3D: a CPU software rendering pipeline
//!
//! - Model/view/projection transforms and Cohen-Sutherland clipping
//! - Bresenham lines, midpoint circles, scanline triangles with a Z-buffer
//! - Blinn-Phong lighting with Gouraud or Phong evaluation
//! - A demo scene (cratered moon, cube) driven by RON config

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rasterizer;
pub mod scene;
pub mod export;
pub mod logging;
