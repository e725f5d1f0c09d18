//! Scene rendering: projects meshes through a `Transform`, lights them per
//! vertex and hands the results to the rasterizer

use crate::rasterizer::{gouraud_shading, Mat3, Mat4, Rasterizer, Transform, Vec3, Vec4, Vertex};
use super::config::{RenderMode, SceneConfig, Subject};
use super::mesh::{cube, light_marker, moon, Mesh, MeshTriangle, Surface};

/// Discrete inputs the hosts translate key presses into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    RotateUp,
    RotateDown,
    RotateLeft,
    RotateRight,
    ScaleUp,
    ScaleDown,
    Reset,
    ToggleWireframe,
    ToggleLightMarker,
}

/// Interactive model state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    /// Euler angles in radians (x, y, z)
    pub rotation: Vec3,
    pub scale: f32,
    pub mode: RenderMode,
    pub show_light_marker: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            rotation: Vec3::ZERO,
            scale: 1.0,
            mode: RenderMode::Shaded,
            show_light_marker: false,
        }
    }
}

impl Controls {
    pub const ROTATE_STEP: f32 = 0.1;
    pub const SCALE_UP: f32 = 1.1;
    pub const SCALE_DOWN: f32 = 0.9;

    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            mode: config.mode,
            show_light_marker: config.show_light_marker,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, action: ControlAction) {
        match action {
            ControlAction::RotateUp => self.rotation.x += Self::ROTATE_STEP,
            ControlAction::RotateDown => self.rotation.x -= Self::ROTATE_STEP,
            ControlAction::RotateLeft => self.rotation.y -= Self::ROTATE_STEP,
            ControlAction::RotateRight => self.rotation.y += Self::ROTATE_STEP,
            ControlAction::ScaleUp => self.scale *= Self::SCALE_UP,
            ControlAction::ScaleDown => self.scale *= Self::SCALE_DOWN,
            // Display toggles survive a reset
            ControlAction::Reset => {
                self.rotation = Vec3::ZERO;
                self.scale = 1.0;
            }
            ControlAction::ToggleWireframe => {
                self.mode = match self.mode {
                    RenderMode::Shaded => RenderMode::Wireframe,
                    RenderMode::Wireframe => RenderMode::Shaded,
                };
            }
            ControlAction::ToggleLightMarker => self.show_light_marker = !self.show_light_marker,
        }
    }

    /// Rotation after uniform scale: `R(x, y, z) * S(s)`
    pub fn model_matrix(&self) -> Mat4 {
        let r = self.rotation;
        Transform::create_rotation(r.x, r.y, r.z) * Transform::create_scale(self.scale, self.scale, self.scale)
    }
}

/// Owns the scene meshes, built once from a `SceneConfig`
pub struct SceneRenderer {
    config: SceneConfig,
    subject: Mesh,
    marker: Mesh,
}

impl SceneRenderer {
    pub fn new(config: SceneConfig) -> Self {
        let subject = match config.subject {
            Subject::Moon => moon(&config.moon),
            Subject::Cube => cube(),
        };
        let marker = light_marker(config.light.position);
        log::info!(
            "scene ready: {:?} with {} triangles, {}x{} viewport",
            config.subject,
            subject.triangles.len(),
            config.viewport.width,
            config.viewport.height,
        );

        Self { config, subject, marker }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn subject_mesh(&self) -> &Mesh {
        &self.subject
    }

    /// Load the configured camera into `transform`'s view and projection
    pub fn setup_camera(&self, transform: &mut Transform) {
        let cam = &self.config.camera;
        let vp = self.config.viewport;
        let aspect = if vp.height == 0 {
            1.0
        } else {
            vp.width as f32 / vp.height as f32
        };

        transform.set_look_at(cam.eye, cam.target, cam.up);
        transform.set_perspective(cam.fov_y_degrees.to_radians(), aspect, cam.near, cam.far);
    }

    /// Number of progress ticks `render_with_progress` will report
    pub fn band_count(&self, controls: &Controls) -> usize {
        let marker = if controls.show_light_marker { self.marker.band_count() } else { 0 };
        self.subject.band_count() + marker
    }

    /// Clear and draw one frame
    pub fn render(&self, rasterizer: &mut Rasterizer, transform: &mut Transform, controls: &Controls) {
        self.render_with_progress(rasterizer, transform, controls, || {});
    }

    /// Like `render`, calling `on_band` after each latitude band (or cube face)
    pub fn render_with_progress<F>(
        &self,
        rasterizer: &mut Rasterizer,
        transform: &mut Transform,
        controls: &Controls,
        mut on_band: F,
    ) where
        F: FnMut(),
    {
        rasterizer.clear_buffers(self.config.clear_color);

        transform.set_model_matrix(controls.model_matrix());
        self.draw_mesh(rasterizer, transform, &self.subject, controls.mode, &mut on_band);

        if controls.show_light_marker {
            // The marker lives in world space, unaffected by the model controls
            transform.push_matrix();
            transform.set_model_matrix(Mat4::IDENTITY);
            self.draw_mesh(rasterizer, transform, &self.marker, controls.mode, &mut on_band);
            transform.pop_matrix();
        }
    }

    fn draw_mesh<F>(
        &self,
        rasterizer: &mut Rasterizer,
        transform: &Transform,
        mesh: &Mesh,
        mode: RenderMode,
        on_band: &mut F,
    ) where
        F: FnMut(),
    {
        let model = *transform.model_matrix();
        let normal_matrix = world_normal_matrix(&model);
        let mut skipped = 0usize;

        for band in mesh.triangles.chunks(mesh.band_len.max(1)) {
            for tri in band {
                let projected = self.project(tri, mesh.surface, transform, &model, &normal_matrix, rasterizer);
                let Some([a, b, c]) = projected else {
                    skipped += 1;
                    continue;
                };

                match mode {
                    RenderMode::Shaded => rasterizer.draw_triangle(&a, &b, &c, true),
                    RenderMode::Wireframe => {
                        rasterizer.draw_wireframe_triangle(&a, &b, &c, self.config.wire_color)
                    }
                }
            }
            on_band();
        }

        if skipped > 0 {
            log::trace!("skipped {} triangles behind the camera", skipped);
        }
    }

    /// Object space -> screen vertices with Gouraud colors. `None` when any
    /// corner is at or behind the camera plane.
    fn project(
        &self,
        tri: &MeshTriangle,
        surface: Surface,
        transform: &Transform,
        model: &Mat4,
        normal_matrix: &Mat3,
        rasterizer: &Rasterizer,
    ) -> Option<[Vertex; 3]> {
        let mut out = [Vertex::default(); 3];

        for (vertex, point) in out.iter_mut().zip(tri.corners.iter()) {
            let clip = transform.transform_vertex(point.position.extend(1.0));
            if clip.w <= 0.0 {
                return None;
            }

            let ndc = clip.perspective_divide();
            let screen = transform.viewport_transform(ndc, rasterizer.width(), rasterizer.height());
            let world_pos = model.transform_point(point.position);
            let normal = normal_matrix.mul_vec3(point.normal).normalize();

            let color = match surface {
                Surface::Lit(material) => gouraud_shading(
                    world_pos,
                    normal,
                    self.config.camera.eye,
                    &self.config.light,
                    &material,
                )
                .tint(tri.tint),
                Surface::Emissive => tri.tint,
            };

            *vertex = Vertex {
                position: Vec4::new(screen.x, screen.y, ndc.z, 1.0),
                world_pos,
                normal,
                color,
            };
        }

        Some(out)
    }
}

/// Inverse-transpose of the model's 3x3, for world-space lighting.
/// Falls back to the plain 3x3 when the model is singular.
fn world_normal_matrix(model: &Mat4) -> Mat3 {
    let m = model.upper_left_3x3();
    match m.inverse() {
        Some(inv) => inv.transpose(),
        None => {
            log::warn!("singular model matrix, lighting with untransformed normals");
            m
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{Color, FAR_DEPTH};
    use crate::scene::config::{MoonConfig, ViewportConfig};
    use crate::scene::mesh::LIGHT_MARKER_COLOR;

    fn small_scene(subject: Subject) -> SceneConfig {
        SceneConfig {
            viewport: ViewportConfig { width: 64, height: 72 },
            subject,
            moon: MoonConfig {
                lat_segments: 16,
                lon_segments: 16,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn render_scene(config: SceneConfig, controls: &Controls) -> (Rasterizer, Transform) {
        let renderer = SceneRenderer::new(config);
        let vp = renderer.config().viewport;
        let mut rasterizer = Rasterizer::new(vp.width, vp.height);
        let mut transform = Transform::new();
        renderer.setup_camera(&mut transform);
        renderer.render(&mut rasterizer, &mut transform, controls);
        (rasterizer, transform)
    }

    #[test]
    fn test_controls_actions() {
        let mut c = Controls::default();
        c.apply(ControlAction::RotateUp);
        c.apply(ControlAction::RotateUp);
        c.apply(ControlAction::RotateLeft);
        assert!((c.rotation.x - 0.2).abs() < 1e-6);
        assert!((c.rotation.y + 0.1).abs() < 1e-6);

        c.apply(ControlAction::RotateDown);
        c.apply(ControlAction::RotateRight);
        assert!((c.rotation.x - 0.1).abs() < 1e-6);
        assert!(c.rotation.y.abs() < 1e-6);

        c.apply(ControlAction::ScaleUp);
        assert!((c.scale - 1.1).abs() < 1e-6);
        c.apply(ControlAction::ScaleDown);
        assert!((c.scale - 0.99).abs() < 1e-6);

        c.apply(ControlAction::ToggleWireframe);
        c.apply(ControlAction::ToggleLightMarker);
        c.apply(ControlAction::Reset);
        assert_eq!(c.rotation, Vec3::ZERO);
        assert_eq!(c.scale, 1.0);
        assert_eq!(c.mode, RenderMode::Wireframe);
        assert!(c.show_light_marker);

        c.apply(ControlAction::ToggleWireframe);
        assert_eq!(c.mode, RenderMode::Shaded);
    }

    #[test]
    fn test_model_matrix_rotates_after_scaling() {
        let c = Controls {
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            scale: 2.0,
            ..Default::default()
        };
        // (1,0,0) scaled to (2,0,0), then rotated about Y to (0,0,-2)
        let p = c.model_matrix().transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-5);
        assert!((p.z + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_shaded_moon_covers_center_not_corners() {
        let (rast, _) = render_scene(small_scene(Subject::Moon), &Controls::default());
        assert_ne!(rast.pixel(32, 36), Some(Color::BLACK));
        assert!(rast.depth_at(32, 36).unwrap() < FAR_DEPTH);
        assert_eq!(rast.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(rast.depth_at(0, 0), Some(FAR_DEPTH));
    }

    #[test]
    fn test_lit_side_brighter_than_shadow_side() {
        // Light sits up and to the right of the camera
        let (rast, _) = render_scene(small_scene(Subject::Moon), &Controls::default());
        let lit = rast.pixel(44, 30).unwrap();
        let dark = rast.pixel(20, 42).unwrap();
        assert!(lit.r > dark.r);
    }

    #[test]
    fn test_wireframe_leaves_depth_untouched() {
        let mut config = small_scene(Subject::Cube);
        config.wire_color = Color::GREEN;
        let controls = Controls {
            mode: RenderMode::Wireframe,
            rotation: Vec3::new(0.4, 0.6, 0.0),
            ..Default::default()
        };
        let (rast, _) = render_scene(config, &controls);

        assert!(rast.depth_buffer().iter().all(|&d| d == FAR_DEPTH));
        let green = rast
            .frame_buffer()
            .chunks(3)
            .filter(|px| px == &[0u8, 255, 0].as_slice())
            .count();
        assert!(green > 0);
    }

    #[test]
    fn test_light_marker_ignores_model_controls() {
        let mut config = small_scene(Subject::Moon);
        config.light.position = Vec3::new(0.0, 0.0, 3.0);
        let controls = Controls {
            rotation: Vec3::new(0.0, 1.0, 0.0),
            show_light_marker: true,
            ..Default::default()
        };
        let (rast, transform) = render_scene(config, &controls);

        assert_eq!(rast.pixel(32, 36), Some(LIGHT_MARKER_COLOR));
        assert_eq!(transform.stack_depth(), 0);
        assert_eq!(*transform.model_matrix(), controls.model_matrix());
    }

    #[test]
    fn test_triangles_behind_camera_are_skipped() {
        // Camera inside the cube: only the far face is fully in front
        let mut config = small_scene(Subject::Cube);
        config.camera.eye = Vec3::ZERO;
        config.camera.target = Vec3::new(0.0, 0.0, -1.0);
        let (rast, _) = render_scene(config, &Controls::default());

        let px = rast.pixel(32, 36).unwrap();
        assert!(px.b > px.r);
        assert!(px.b > px.g);
    }

    #[test]
    fn test_progress_reports_every_band() {
        let renderer = SceneRenderer::new(small_scene(Subject::Moon));
        let mut rast = Rasterizer::new(64, 72);
        let mut transform = Transform::new();
        renderer.setup_camera(&mut transform);

        for show in [false, true] {
            let controls = Controls { show_light_marker: show, ..Default::default() };
            let mut ticks = 0;
            renderer.render_with_progress(&mut rast, &mut transform, &controls, || ticks += 1);
            assert_eq!(ticks, renderer.band_count(&controls));
        }
        assert_eq!(renderer.band_count(&Controls::default()), 16);
    }

    #[test]
    fn test_render_clears_previous_frame() {
        let renderer = SceneRenderer::new(small_scene(Subject::Cube));
        let mut rast = Rasterizer::new(64, 72);
        let mut transform = Transform::new();
        renderer.setup_camera(&mut transform);

        rast.set_pixel(0, 0, Color::RED);
        renderer.render(&mut rast, &mut transform, &Controls::default());
        assert_eq!(rast.pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_singular_model_falls_back() {
        let m = Transform::create_scale(0.0, 1.0, 1.0);
        assert_eq!(world_normal_matrix(&m), m.upper_left_3x3());
    }
}
