//! Software rendering core
//!
//! Features:
//! - Model/view/projection transforms with a matrix stack
//! - Cohen-Sutherland line clipping
//! - Bresenham lines and midpoint circles
//! - Scanline triangle fill with a Z-buffer
//! - Blinn-Phong lighting (evaluated by the caller, per vertex or per pixel)

mod math;
mod types;
mod transform;
mod shading;
mod render;

pub use math::*;
pub use types::*;
pub use transform::*;
pub use shading::*;
pub use render::*;
