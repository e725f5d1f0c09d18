//! Scene module - the demo world drawn by the host binaries
//!
//! - RON scene configuration
//! - Procedural moon, cube and light-marker meshes
//! - Per-vertex lit projection into the rasterizer

mod config;
mod mesh;
mod renderer;

pub use config::*;
pub use mesh::*;
pub use renderer::*;
