//! Blinn-Phong lighting and color interpolation
//!
//! Everything here is stateless. Gouraud and Phong shading run the same
//! lighting equation; they differ only in when the caller evaluates it (once
//! per vertex, or per fragment with an interpolated normal). The rasterizer
//! never calls into this module.

use super::math::Vec3;
use super::types::{Color, Light, Material};

/// `light.ambient * material.ambient`
pub fn ambient_term(light: &Light, material: &Material) -> Vec3 {
    light.ambient.hadamard(material.ambient)
}

/// Lambertian term; zero when the surface faces away from the light
pub fn diffuse_term(light_dir: Vec3, normal: Vec3, light: &Light, material: &Material) -> Vec3 {
    let diff = normal.dot(light_dir).max(0.0);
    light.color.hadamard(material.diffuse) * diff
}

/// Blinn-Phong specular term using the halfway vector `normalize(L + V)`
pub fn specular_term(
    light_dir: Vec3,
    normal: Vec3,
    view_dir: Vec3,
    light: &Light,
    material: &Material,
) -> Vec3 {
    let halfway = (light_dir + view_dir).normalize();
    let spec = normal.dot(halfway).max(0.0).powf(material.shininess);
    light.color.hadamard(material.specular) * spec
}

/// Unclamped ambient + diffuse + specular at `pos`
pub fn blinn_phong(
    pos: Vec3,
    normal: Vec3,
    view_pos: Vec3,
    light: &Light,
    material: &Material,
) -> Vec3 {
    let n = normal.normalize();
    let l = (light.position - pos).normalize();
    let v = (view_pos - pos).normalize();

    ambient_term(light, material)
        + diffuse_term(l, n, light, material)
        + specular_term(l, n, v, light, material)
}

/// Per-vertex lighting; the resulting colors are interpolated by the fill
pub fn gouraud_shading(
    vertex_pos: Vec3,
    normal: Vec3,
    view_pos: Vec3,
    light: &Light,
    material: &Material,
) -> Color {
    Color::from_unit(blinn_phong(vertex_pos, normal, view_pos, light, material))
}

/// Per-fragment lighting from an interpolated normal
pub fn phong_shading(
    frag_pos: Vec3,
    normal: Vec3,
    view_pos: Vec3,
    light: &Light,
    material: &Material,
) -> Color {
    Color::from_unit(blinn_phong(frag_pos, normal, view_pos, light, material))
}

/// Linear blend of two colors, all four channels
pub fn lerp_color(c1: Color, c2: Color, t: f32) -> Color {
    let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t) as u8;
    Color::with_alpha(mix(c1.r, c2.r), mix(c1.g, c2.g), mix(c1.b, c2.b), mix(c1.a, c2.a))
}

/// Barycentric blend of three colors with weights (u, v, w)
pub fn blend_colors(c1: Color, c2: Color, c3: Color, u: f32, v: f32, w: f32) -> Color {
    let mix = |a: u8, b: u8, c: u8| (a as f32 * u + b as f32 * v + c as f32 * w) as u8;
    Color::with_alpha(
        mix(c1.r, c2.r, c3.r),
        mix(c1.g, c2.g, c3.g),
        mix(c1.b, c2.b, c3.b),
        mix(c1.a, c2.a, c3.a),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_at(position: Vec3) -> Light {
        Light {
            position,
            color: Vec3::ONE,
            ambient: Vec3::splat(0.2),
        }
    }

    #[test]
    fn test_ambient_is_componentwise_product() {
        let light = Light {
            ambient: Vec3::new(0.5, 0.25, 1.0),
            ..Default::default()
        };
        let material = Material {
            ambient: Vec3::new(0.5, 1.0, 0.1),
            ..Default::default()
        };
        assert_eq!(ambient_term(&light, &material), Vec3::new(0.25, 0.25, 0.1));
    }

    #[test]
    fn test_diffuse_zero_when_light_behind() {
        let material = Material::default();
        let light = light_at(Vec3::new(0.0, 0.0, -5.0));
        let n = Vec3::new(0.0, 0.0, 1.0);
        let l = (light.position - Vec3::ZERO).normalize();
        assert!(n.dot(l) <= 0.0);
        assert_eq!(diffuse_term(l, n, &light, &material), Vec3::ZERO);

        // Grazing light is also exactly zero
        let l = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(diffuse_term(l, n, &light, &material), Vec3::ZERO);
    }

    #[test]
    fn test_specular_zero_when_halfway_behind() {
        let material = Material::default();
        let light = Light::default();
        let n = Vec3::new(0.0, 0.0, 1.0);
        let l = Vec3::new(0.0, 0.0, -1.0);
        let v = Vec3::new(0.0, 1.0, -1.0).normalize();
        let h = (l + v).normalize();
        assert!(n.dot(h) <= 0.0);
        assert_eq!(specular_term(l, n, v, &light, &material), Vec3::ZERO);
    }

    #[test]
    fn test_ambient_always_present() {
        let material = Material::default();
        let light = light_at(Vec3::new(0.0, 0.0, -5.0));
        // Surface faces away from both light and viewer
        let c = gouraud_shading(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -5.0),
            &light,
            &material,
        );
        // 0.2 * 0.2 = 0.04 -> 10.2 -> 10
        assert_eq!(c, Color::new(10, 10, 10));
    }

    #[test]
    fn test_head_on_light_saturates() {
        // Light and viewer straight along the normal: ambient + full diffuse
        // + full specular exceeds 1 and clamps to white.
        let light = light_at(Vec3::new(0.0, 0.0, 5.0));
        let c = phong_shading(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 5.0),
            &light,
            &Material::default(),
        );
        assert_eq!(c, Color::WHITE);
    }

    #[test]
    fn test_normal_is_normalized_before_lighting() {
        let light = light_at(Vec3::new(0.0, 0.0, 5.0));
        let material = Material {
            specular: Vec3::ZERO,
            ..Default::default()
        };
        let view = Vec3::new(0.0, 0.0, 5.0);
        let unit = gouraud_shading(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), view, &light, &material);
        let long = gouraud_shading(Vec3::ZERO, Vec3::new(0.0, 0.0, 7.0), view, &light, &material);
        assert_eq!(unit, long);
        // 0.04 + 0.8 = 0.84 -> 214.2
        assert_eq!(unit, Color::new(214, 214, 214));
    }

    #[test]
    fn test_lerp_color_endpoints() {
        let a = Color::with_alpha(0, 100, 200, 0);
        let b = Color::with_alpha(200, 100, 0, 255);
        assert_eq!(lerp_color(a, b, 0.0), a);
        assert_eq!(lerp_color(a, b, 1.0), b);
        assert_eq!(lerp_color(a, b, 0.5), Color::with_alpha(100, 100, 100, 127));
    }

    #[test]
    fn test_blend_colors_pure_weights() {
        let (r, g, b) = (Color::RED, Color::GREEN, Color::BLUE);
        assert_eq!(blend_colors(r, g, b, 1.0, 0.0, 0.0), r);
        assert_eq!(blend_colors(r, g, b, 0.0, 1.0, 0.0), g);
        assert_eq!(blend_colors(r, g, b, 0.0, 0.0, 1.0), b);
    }
}
