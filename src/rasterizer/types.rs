//! Core types for the rasterizer

use serde::{Deserialize, Serialize};
use super::math::{Vec3, Vec4};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build from a [0, 1] float color. Channels are clamped, scaled by 255
    /// and truncated; alpha is opaque.
    pub fn from_unit(c: Vec3) -> Self {
        let c = c.clamp(0.0, 1.0);
        Self {
            r: (c.x * 255.0) as u8,
            g: (c.y * 255.0) as u8,
            b: (c.z * 255.0) as u8,
            a: 255,
        }
    }

    /// Multiply RGB by another color treated as [0, 1] factors
    pub fn tint(self, other: Color) -> Self {
        Self {
            r: (self.r as f32 * other.r as f32 / 255.0) as u8,
            g: (self.g as f32 * other.g as f32 / 255.0) as u8,
            b: (self.b as f32 * other.b as f32 / 255.0) as u8,
            a: self.a,
        }
    }

    /// RGB bytes as stored in the framebuffer
    pub fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// A vertex handed to the rasterizer
///
/// `position` holds clip-space coordinates until the caller divides by w;
/// from then on x/y are screen pixels and z is the NDC depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec4,
    /// World-space position, for lighting
    pub world_pos: Vec3,
    pub normal: Vec3,
    pub color: Color,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec4::default(),
            world_pos: Vec3::ZERO,
            normal: Vec3::new(0.0, 0.0, 1.0),
            color: Color::WHITE,
        }
    }
}

impl Vertex {
    /// Screen-space vertex with the given depth and color
    pub fn screen(x: f32, y: f32, depth: f32, color: Color) -> Self {
        Self {
            position: Vec4::new(x, y, depth, 1.0),
            color,
            ..Default::default()
        }
    }
}

/// Point light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub ambient: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 5.0),
            color: Vec3::ONE,
            ambient: Vec3::splat(0.2),
        }
    }
}

/// Surface reflectance for Blinn-Phong
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.2),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            shininess: 32.0,
        }
    }
}
