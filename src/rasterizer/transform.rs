//! Geometric transform pipeline
//!
//! Model -> World -> View -> Clip, plus the viewport mapping from NDC to
//! pixels and Cohen-Sutherland clipping of 2D segments.

use bitflags::bitflags;
use super::math::{Mat3, Mat4, Vec2, Vec3, Vec4};

/// Holds the model, view and projection matrices and a model-matrix stack
#[derive(Debug, Clone, Default)]
pub struct Transform {
    model: Mat4,
    view: Mat4,
    projection: Mat4,
    stack: Vec<Mat4>,
}

impl Transform {
    /// All three matrices start as identity
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_model_matrix(&mut self, model: Mat4) {
        self.model = model;
    }

    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.view = view;
    }

    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    pub fn model_matrix(&self) -> &Mat4 {
        &self.model
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    /// Projection * View * Model
    pub fn mvp_matrix(&self) -> Mat4 {
        self.projection * self.view * self.model
    }

    /// View * Model
    pub fn model_view_matrix(&self) -> Mat4 {
        self.view * self.model
    }

    /// Inverse-transpose of the upper-left 3x3 of View * Model
    ///
    /// A singular model-view (zero scale on some axis) has no inverse; the
    /// plain 3x3 is returned in that case.
    pub fn normal_matrix(&self) -> Mat3 {
        let mv = self.model_view_matrix().upper_left_3x3();
        match mv.inverse() {
            Some(inv) => inv.transpose(),
            None => mv,
        }
    }

    /// Translation matrix
    pub fn create_translation(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::from_rows([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation from euler angles in radians
    ///
    /// X is applied first, then Y, then Z: the result is `Rz * Ry * Rx`.
    /// Zero angles are skipped.
    pub fn create_rotation(angle_x: f32, angle_y: f32, angle_z: f32) -> Mat4 {
        let mut rotation = Mat4::IDENTITY;

        if angle_x != 0.0 {
            let (s, c) = angle_x.sin_cos();
            let rx = Mat4::from_rows([
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, -s, 0.0],
                [0.0, s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ]);
            rotation = rx * rotation;
        }

        if angle_y != 0.0 {
            let (s, c) = angle_y.sin_cos();
            let ry = Mat4::from_rows([
                [c, 0.0, s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [-s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ]);
            rotation = ry * rotation;
        }

        if angle_z != 0.0 {
            let (s, c) = angle_z.sin_cos();
            let rz = Mat4::from_rows([
                [c, -s, 0.0, 0.0],
                [s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ]);
            rotation = rz * rotation;
        }

        rotation
    }

    /// Scale matrix
    pub fn create_scale(sx: f32, sy: f32, sz: f32) -> Mat4 {
        Mat4::from_rows([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// View matrix for a camera at `eye` looking at `center`
    pub fn set_look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        let forward = (center - eye).normalize();
        let right = forward.cross(up).normalize();
        let true_up = right.cross(forward);

        // Inverse of the camera's world transform: transposed basis, negated
        // translation expressed in that basis.
        self.view = Mat4::from_rows([
            [right.x, right.y, right.z, -right.dot(eye)],
            [true_up.x, true_up.y, true_up.z, -true_up.dot(eye)],
            [-forward.x, -forward.y, -forward.z, forward.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ]);
    }

    /// Perspective frustum; `fov_y` in radians
    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        let f = 1.0 / (fov_y / 2.0).tan();
        let depth = far - near;

        self.projection = Mat4::from_rows([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, -(far + near) / depth, -(2.0 * far * near) / depth],
            [0.0, 0.0, -1.0, 0.0],
        ]);
    }

    /// Parallel projection of the box [left, right] x [bottom, top] x [-near, -far]
    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) {
        let w = right - left;
        let h = top - bottom;
        let d = far - near;

        self.projection = Mat4::from_rows([
            [2.0 / w, 0.0, 0.0, -(right + left) / w],
            [0.0, 2.0 / h, 0.0, -(top + bottom) / h],
            [0.0, 0.0, -2.0 / d, -(far + near) / d],
            [0.0, 0.0, 0.0, 1.0],
        ]);
    }

    /// Object space -> clip space. The perspective divide is left to the caller.
    pub fn transform_vertex(&self, v: Vec4) -> Vec4 {
        self.projection * (self.view * (self.model * v))
    }

    /// Transform a normal by the normal matrix and renormalize
    pub fn transform_normal(&self, n: Vec3) -> Vec3 {
        self.normal_matrix().mul_vec3(n).normalize()
    }

    /// NDC -> pixel coordinates, Y flipped so rows grow downward
    pub fn viewport_transform(&self, ndc: Vec4, width: usize, height: usize) -> Vec2 {
        let x = (ndc.x + 1.0) * 0.5 * width as f32;
        let y = (1.0 - ndc.y) * 0.5 * height as f32;
        Vec2::new(x, y)
    }

    /// Save the current model matrix
    pub fn push_matrix(&mut self) {
        self.stack.push(self.model);
    }

    /// Restore the most recently pushed model matrix. No-op when empty.
    pub fn pop_matrix(&mut self) {
        if let Some(m) = self.stack.pop() {
            self.model = m;
        }
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }
}

bitflags! {
    /// Cohen-Sutherland region code
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutCode: u8 {
        const LEFT = 0b0001;
        const RIGHT = 0b0010;
        const BOTTOM = 0b0100;
        const TOP = 0b1000;
    }
}

/// Axis-aligned clip rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl ClipRect {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self { x_min, y_min, x_max, y_max }
    }

    /// Region code of a point relative to this rectangle
    pub fn outcode(&self, p: Vec2) -> OutCode {
        let mut code = OutCode::empty();

        if p.x < self.x_min {
            code |= OutCode::LEFT;
        } else if p.x > self.x_max {
            code |= OutCode::RIGHT;
        }

        if p.y < self.y_min {
            code |= OutCode::BOTTOM;
        } else if p.y > self.y_max {
            code |= OutCode::TOP;
        }

        code
    }
}

/// At most two boundary clips per endpoint on a rectangle
const MAX_CLIP_PASSES: usize = 4;

/// Cohen-Sutherland line clipping
///
/// Endpoints outside `rect` are moved onto its boundary in place. Returns
/// `false` when no part of the segment is inside.
pub fn clip_line(p1: &mut Vec2, p2: &mut Vec2, rect: &ClipRect) -> bool {
    clip_line_counted(p1, p2, rect).0
}

/// `clip_line` plus the number of endpoint moves it took
fn clip_line_counted(p1: &mut Vec2, p2: &mut Vec2, rect: &ClipRect) -> (bool, usize) {
    let mut code1 = rect.outcode(*p1);
    let mut code2 = rect.outcode(*p2);

    for pass in 0..=MAX_CLIP_PASSES {
        if (code1 | code2).is_empty() {
            return (true, pass);
        }
        if code1.intersects(code2) {
            return (false, pass);
        }
        if pass == MAX_CLIP_PASSES {
            break;
        }

        let clip_first = !code1.is_empty();
        let out = if clip_first { code1 } else { code2 };
        let (a, b) = (*p1, *p2);

        // A TOP/BOTTOM bit on exactly one endpoint means the other endpoint is
        // on the far side of that boundary, so dy != 0 (and dx != 0 below).
        let clipped = if out.contains(OutCode::TOP) {
            debug_assert!(b.y != a.y);
            Vec2::new(a.x + (b.x - a.x) * (rect.y_max - a.y) / (b.y - a.y), rect.y_max)
        } else if out.contains(OutCode::BOTTOM) {
            debug_assert!(b.y != a.y);
            Vec2::new(a.x + (b.x - a.x) * (rect.y_min - a.y) / (b.y - a.y), rect.y_min)
        } else if out.contains(OutCode::RIGHT) {
            debug_assert!(b.x != a.x);
            Vec2::new(rect.x_max, a.y + (b.y - a.y) * (rect.x_max - a.x) / (b.x - a.x))
        } else {
            debug_assert!(b.x != a.x);
            Vec2::new(rect.x_min, a.y + (b.y - a.y) * (rect.x_min - a.x) / (b.x - a.x))
        };

        if clip_first {
            *p1 = clipped;
            code1 = rect.outcode(*p1);
        } else {
            *p2 = clipped;
            code2 = rect.outcode(*p2);
        }
    }

    log::trace!("clip_line gave up after {} passes", MAX_CLIP_PASSES);
    (false, MAX_CLIP_PASSES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-4;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    fn approx_vec3(a: Vec3, b: Vec3) -> bool {
        approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
    }

    fn rect10() -> ClipRect {
        ClipRect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn test_new_is_identity() {
        let t = Transform::new();
        assert_eq!(t.mvp_matrix(), Mat4::IDENTITY);
        let v = Vec4::point(1.0, 2.0, 3.0);
        assert_eq!(t.transform_vertex(v), v);
    }

    #[test]
    fn test_translation_moves_points_not_directions() {
        let m = Transform::create_translation(1.0, 2.0, 3.0);
        assert_eq!(m * Vec4::point(0.0, 0.0, 0.0), Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(m * Vec4::new(1.0, 0.0, 0.0, 0.0), Vec4::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation_zero_is_identity() {
        assert_eq!(Transform::create_rotation(0.0, 0.0, 0.0), Mat4::IDENTITY);
    }

    #[test]
    fn test_rotation_order_is_x_then_y_then_z() {
        // X then Z: +Y -> +Z (about X) -> +Z (about Z, unchanged)
        let m = Transform::create_rotation(FRAC_PI_2, 0.0, FRAC_PI_2);
        let v = m.transform_point(Vec3::new(0.0, 1.0, 0.0));
        assert!(approx_vec3(v, Vec3::new(0.0, 0.0, 1.0)));

        // +X -> +X (about X) -> -Z (about Y) -> -Z (about Z)
        let m = Transform::create_rotation(FRAC_PI_2, FRAC_PI_2, FRAC_PI_2);
        let v = m.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx_vec3(v, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_look_at_maps_eye_to_origin() {
        let mut t = Transform::new();
        let eye = Vec3::new(0.0, 0.0, 5.0);
        t.set_look_at(eye, Vec3::ZERO, Vec3::UP);

        let at_eye = t.view_matrix().transform_point(eye);
        assert!(approx_vec3(at_eye, Vec3::ZERO));

        // Target ends up straight ahead on -Z
        let target = t.view_matrix().transform_point(Vec3::ZERO);
        assert!(approx_vec3(target, Vec3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn test_perspective_near_far_map_to_ndc() {
        let mut t = Transform::new();
        t.set_perspective(FRAC_PI_2, 1.0, 0.1, 100.0);

        let near = t.transform_vertex(Vec4::point(0.0, 0.0, -0.1)).perspective_divide();
        let far = t.transform_vertex(Vec4::point(0.0, 0.0, -100.0)).perspective_divide();
        assert!(approx(near.z, -1.0));
        assert!((far.z - 1.0).abs() < 1e-3);

        // 90 degree fov: the frustum edge at depth 1 lands on x = 1
        let edge = t.transform_vertex(Vec4::point(1.0, 0.0, -1.0)).perspective_divide();
        assert!(approx(edge.x, 1.0));
    }

    #[test]
    fn test_orthographic_box_maps_to_unit_cube() {
        let mut t = Transform::new();
        t.set_orthographic(-4.0, 4.0, -2.0, 2.0, 1.0, 11.0);

        let lo = t.transform_vertex(Vec4::point(-4.0, -2.0, -1.0));
        let hi = t.transform_vertex(Vec4::point(4.0, 2.0, -11.0));
        assert!(approx(lo.x, -1.0) && approx(lo.y, -1.0) && approx(lo.z, -1.0));
        assert!(approx(hi.x, 1.0) && approx(hi.y, 1.0) && approx(hi.z, 1.0));
        assert!(approx(hi.w, 1.0));
    }

    #[test]
    fn test_normal_matrix_keeps_perpendicular_under_nonuniform_scale() {
        let mut t = Transform::new();
        t.set_model_matrix(Transform::create_scale(1.0, 4.0, 1.0));

        // Surface along the (1, 1) diagonal in XY, normal (1, -1)
        let tangent = t.model_matrix().mul_vec4(Vec4::new(1.0, 1.0, 0.0, 0.0)).xyz();
        let normal = t.transform_normal(Vec3::new(1.0, -1.0, 0.0));

        assert!(approx(normal.len(), 1.0));
        assert!(approx(tangent.dot(normal), 0.0));
    }

    #[test]
    fn test_viewport_round_trip() {
        let t = Transform::new();
        let (w, h) = (800, 900);

        let center = t.viewport_transform(Vec4::new(0.0, 0.0, 0.0, 1.0), w, h);
        assert_eq!(center, Vec2::new(400.0, 450.0));

        let bottom_left = t.viewport_transform(Vec4::new(-1.0, -1.0, 0.0, 1.0), w, h);
        assert_eq!(bottom_left, Vec2::new(0.0, 900.0));

        let top_right = t.viewport_transform(Vec4::new(1.0, 1.0, 0.0, 1.0), w, h);
        assert_eq!(top_right, Vec2::new(800.0, 0.0));
    }

    #[test]
    fn test_matrix_stack_lifo() {
        let mut t = Transform::new();
        let a = Transform::create_translation(1.0, 0.0, 0.0);
        let b = Transform::create_scale(2.0, 2.0, 2.0);

        t.set_model_matrix(a);
        t.push_matrix();
        t.set_model_matrix(b);
        t.push_matrix();
        t.set_model_matrix(Mat4::IDENTITY);
        assert_eq!(t.stack_depth(), 2);

        t.pop_matrix();
        assert_eq!(*t.model_matrix(), b);
        t.pop_matrix();
        assert_eq!(*t.model_matrix(), a);
        assert_eq!(t.stack_depth(), 0);
    }

    #[test]
    fn test_pop_on_empty_stack_is_noop() {
        let mut t = Transform::new();
        let m = Transform::create_translation(3.0, 2.0, 1.0);
        t.set_model_matrix(m);
        t.pop_matrix();
        assert_eq!(*t.model_matrix(), m);
    }

    #[test]
    fn test_outcode_bits() {
        let r = rect10();
        assert_eq!(r.outcode(Vec2::new(5.0, 5.0)), OutCode::empty());
        assert_eq!(r.outcode(Vec2::new(-1.0, 5.0)).bits(), 0b0001);
        assert_eq!(r.outcode(Vec2::new(11.0, 5.0)).bits(), 0b0010);
        assert_eq!(r.outcode(Vec2::new(5.0, -1.0)).bits(), 0b0100);
        assert_eq!(r.outcode(Vec2::new(5.0, 11.0)).bits(), 0b1000);
        assert_eq!(r.outcode(Vec2::new(-1.0, 11.0)), OutCode::LEFT | OutCode::TOP);
    }

    #[test]
    fn test_clip_inside_accepts_unchanged() {
        let mut a = Vec2::new(1.0, 2.0);
        let mut b = Vec2::new(8.0, 9.0);
        assert!(clip_line(&mut a, &mut b, &rect10()));
        assert_eq!(a, Vec2::new(1.0, 2.0));
        assert_eq!(b, Vec2::new(8.0, 9.0));
    }

    #[test]
    fn test_clip_fully_left_rejects() {
        let mut a = Vec2::new(-5.0, 5.0);
        let mut b = Vec2::new(-1.0, 5.0);
        assert!(!clip_line(&mut a, &mut b, &rect10()));
    }

    #[test]
    fn test_clip_crossing_both_sides() {
        let mut a = Vec2::new(-5.0, 5.0);
        let mut b = Vec2::new(15.0, 5.0);
        assert!(clip_line(&mut a, &mut b, &rect10()));
        assert_eq!(a, Vec2::new(0.0, 5.0));
        assert_eq!(b, Vec2::new(10.0, 5.0));
    }

    #[test]
    fn test_clip_diagonal_through_corners() {
        let mut a = Vec2::new(-5.0, -5.0);
        let mut b = Vec2::new(15.0, 15.0);
        assert!(clip_line(&mut a, &mut b, &rect10()));
        assert!(approx(a.x, 0.0) && approx(a.y, 0.0));
        assert!(approx(b.x, 10.0) && approx(b.y, 10.0));
    }

    #[test]
    fn test_clip_outside_on_two_sides_but_missing_rect() {
        // Both endpoints are outside on different sides; the segment passes
        // beyond the top-left corner.
        let mut a = Vec2::new(-6.0, 5.0);
        let mut b = Vec2::new(4.0, 16.0);
        assert!(!clip_line(&mut a, &mut b, &rect10()));
    }

    #[test]
    fn test_clip_axis_aligned_segments_never_divide_by_zero() {
        // Horizontal segment crossing left and right: only x bits are set,
        // so the y-formulas (dividing by dy = 0) are never reached.
        let mut a = Vec2::new(-3.0, 4.0);
        let mut b = Vec2::new(13.0, 4.0);
        assert!(clip_line(&mut a, &mut b, &rect10()));
        assert!(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite());
        assert_eq!((a, b), (Vec2::new(0.0, 4.0), Vec2::new(10.0, 4.0)));

        // Vertical segment crossing top and bottom: dx = 0, only y bits set.
        let mut a = Vec2::new(7.0, -20.0);
        let mut b = Vec2::new(7.0, 20.0);
        assert!(clip_line(&mut a, &mut b, &rect10()));
        assert_eq!((a, b), (Vec2::new(7.0, 0.0), Vec2::new(7.0, 10.0)));

        // Horizontal segment above the rect shares TOP and is rejected
        // before any intersection math.
        let mut a = Vec2::new(-3.0, 12.0);
        let mut b = Vec2::new(13.0, 12.0);
        assert!(!clip_line(&mut a, &mut b, &rect10()));

        // Vertical segment left of the rect shares LEFT.
        let mut a = Vec2::new(-1.0, -5.0);
        let mut b = Vec2::new(-1.0, 15.0);
        assert!(!clip_line(&mut a, &mut b, &rect10()));
    }

    #[test]
    fn test_clip_top_takes_priority_over_right() {
        // (20, 20) is TOP|RIGHT; clipping against TOP first lands at
        // (12.5, 10), which is still RIGHT, so a second pass clips to x = 10.
        let mut a = Vec2::new(5.0, 0.0);
        let mut b = Vec2::new(20.0, 20.0);
        assert!(clip_line(&mut a, &mut b, &rect10()));
        assert_eq!(a, Vec2::new(5.0, 0.0));
        assert!(approx(b.x, 10.0));
        assert!(approx(b.y, 20.0 / 3.0));
    }

    #[test]
    fn test_clip_finishes_within_four_moves() {
        let mut a = Vec2::new(5.0, 0.0);
        let mut b = Vec2::new(20.0, 20.0);
        assert_eq!(clip_line_counted(&mut a, &mut b, &rect10()), (true, 2));

        // Both endpoints outside on two sides each: every endpoint needs two
        // boundary moves, the worst case for a rectangle.
        let mut a = Vec2::new(-3.0, -1.0);
        let mut b = Vec2::new(13.0, 11.0);
        let (accepted, passes) = clip_line_counted(&mut a, &mut b, &rect10());
        assert!(accepted);
        assert_eq!(passes, MAX_CLIP_PASSES);
        assert!(approx(a.x, 0.0) && approx(a.y, 1.25));
        assert!(approx(b.x, 10.0) && approx(b.y, 8.75));

        // A miss past a corner is settled without using the whole budget
        let mut a = Vec2::new(-6.0, 5.0);
        let mut b = Vec2::new(4.0, 16.0);
        let (accepted, passes) = clip_line_counted(&mut a, &mut b, &rect10());
        assert!(!accepted);
        assert!(passes <= MAX_CLIP_PASSES);
    }
}
