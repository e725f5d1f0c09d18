//! Procedural meshes for the demo scene
//!
//! Pure data: triangles carry object-space positions and normals. Projection
//! and lighting happen in the renderer.

use std::f32::consts::PI;
use crate::rasterizer::{Color, Material, Vec3};
use super::config::{Crater, MoonConfig};

/// Position plus surface normal, in object space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
}

impl SurfacePoint {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// One triangle with a per-triangle color multiplier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshTriangle {
    pub corners: [SurfacePoint; 3],
    pub tint: Color,
}

/// How a mesh gets its vertex colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    /// Gouraud-lit with this material, then multiplied by the triangle tint
    Lit(Material),
    /// Flat tint color, ignores the light
    Emissive,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<MeshTriangle>,
    pub surface: Surface,
    /// Triangles per latitude band (or per face); the unit of render progress
    pub band_len: usize,
}

impl Mesh {
    pub fn band_count(&self) -> usize {
        self.triangles.len().div_ceil(self.band_len.max(1))
    }
}

/// Radial offset at (theta, phi): cosine-profile dents plus a sin/cos ripple
pub fn crater_displacement(theta: f32, phi: f32, craters: &[Crater], roughness: f32) -> f32 {
    let mut displacement = 0.0;

    for crater in craters {
        let d_theta = theta - crater.theta;
        let d_phi = phi - crater.phi;
        let dist = (d_theta * d_theta + d_phi * d_phi).sqrt();

        if dist < crater.radius {
            let t = dist / crater.radius;
            displacement -= crater.depth * ((t * PI).cos() + 1.0) * 0.5;
        }
    }

    displacement + roughness * (theta * 10.0).sin() * (phi * 10.0).cos()
}

/// Walk a latitude/longitude grid, splitting each quad into two triangles.
/// `point` maps (theta, phi) to a surface point.
fn lat_lon_sphere<F>(lat_segments: usize, lon_segments: usize, tint: Color, point: F) -> Vec<MeshTriangle>
where
    F: Fn(f32, f32) -> SurfacePoint,
{
    let mut triangles = Vec::with_capacity(lat_segments * lon_segments * 2);

    for lat in 0..lat_segments {
        let theta1 = lat as f32 * PI / lat_segments as f32;
        let theta2 = (lat + 1) as f32 * PI / lat_segments as f32;

        for lon in 0..lon_segments {
            let phi1 = lon as f32 * 2.0 * PI / lon_segments as f32;
            let phi2 = (lon + 1) as f32 * 2.0 * PI / lon_segments as f32;

            let p1 = point(theta1, phi1);
            let p2 = point(theta1, phi2);
            let p3 = point(theta2, phi2);
            let p4 = point(theta2, phi1);

            triangles.push(MeshTriangle { corners: [p1, p2, p3], tint });
            triangles.push(MeshTriangle { corners: [p1, p3, p4], tint });
        }
    }

    triangles
}

fn spherical(r: f32, theta: f32, phi: f32) -> Vec3 {
    Vec3::new(
        r * theta.sin() * phi.cos(),
        r * theta.cos(),
        r * theta.sin() * phi.sin(),
    )
}

/// Cratered sphere centered at the origin
pub fn moon(config: &MoonConfig) -> Mesh {
    let triangles = lat_lon_sphere(config.lat_segments, config.lon_segments, Color::WHITE, |theta, phi| {
        let r = config.radius + crater_displacement(theta, phi, &config.craters, config.roughness);
        let position = spherical(r, theta, phi);
        SurfacePoint::new(position, position.normalize())
    });

    Mesh {
        triangles,
        surface: Surface::Lit(config.material),
        band_len: config.lon_segments * 2,
    }
}

pub const LIGHT_MARKER_RADIUS: f32 = 0.15;
pub const LIGHT_MARKER_SEGMENTS: usize = 10;
pub const LIGHT_MARKER_COLOR: Color = Color::new(255, 255, 100);

/// Small self-lit sphere drawn where the light sits
pub fn light_marker(center: Vec3) -> Mesh {
    let triangles = lat_lon_sphere(
        LIGHT_MARKER_SEGMENTS,
        LIGHT_MARKER_SEGMENTS,
        LIGHT_MARKER_COLOR,
        |theta, phi| {
            let offset = spherical(LIGHT_MARKER_RADIUS, theta, phi);
            SurfacePoint::new(center + offset, offset.normalize())
        },
    );

    Mesh {
        triangles,
        surface: Surface::Emissive,
        band_len: LIGHT_MARKER_SEGMENTS * 2,
    }
}

/// Unit cube (side 2) with a distinct tint per face, wound counter-clockwise
/// seen from outside
pub fn cube() -> Mesh {
    let corners = [
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
    ];

    // (quad indices, outward normal, tint)
    let faces: [([usize; 4], Vec3, Color); 6] = [
        ([0, 1, 2, 3], Vec3::new(0.0, 0.0, 1.0), Color::new(200, 50, 50)),
        ([1, 5, 6, 2], Vec3::new(1.0, 0.0, 0.0), Color::new(50, 200, 50)),
        ([5, 4, 7, 6], Vec3::new(0.0, 0.0, -1.0), Color::new(50, 50, 200)),
        ([4, 0, 3, 7], Vec3::new(-1.0, 0.0, 0.0), Color::new(200, 200, 50)),
        ([3, 2, 6, 7], Vec3::new(0.0, 1.0, 0.0), Color::new(200, 50, 200)),
        ([4, 5, 1, 0], Vec3::new(0.0, -1.0, 0.0), Color::new(50, 200, 200)),
    ];

    let mut triangles = Vec::with_capacity(12);
    for (quad, normal, tint) in faces {
        let p = quad.map(|i| SurfacePoint::new(corners[i], normal));
        triangles.push(MeshTriangle { corners: [p[0], p[1], p[2]], tint });
        triangles.push(MeshTriangle { corners: [p[0], p[2], p[3]], tint });
    }

    Mesh {
        triangles,
        surface: Surface::Lit(Material::default()),
        band_len: 2,
    }
}
