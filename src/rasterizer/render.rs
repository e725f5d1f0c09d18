//! Rasterizer: owns the color and depth buffers and draws primitives into them
//!
//! Lines use Bresenham, circles the midpoint algorithm, and triangles a
//! scanline fill (split into flat-bottom and flat-top halves) with per-pixel
//! barycentric interpolation of depth and color.

use super::math::{barycentric, Vec2};
use super::transform::{clip_line, ClipRect};
use super::types::{Color, Vertex};

/// Depth value meaning "nothing drawn here yet" (the far plane in NDC)
pub const FAR_DEPTH: f32 = 1.0;

/// Software rasterizer with an RGB framebuffer and a Z-buffer
pub struct Rasterizer {
    width: usize,
    height: usize,
    frame: Vec<u8>,  // RGB, 3 bytes per pixel, row-major, origin top-left
    depth: Vec<f32>, // one value per pixel, smaller is closer
}

impl Rasterizer {
    /// Allocate both buffers and clear them to black / far
    pub fn new(width: usize, height: usize) -> Self {
        let mut r = Self {
            width,
            height,
            frame: vec![0; width * height * 3],
            depth: vec![FAR_DEPTH; width * height],
        };
        r.clear_buffers(Color::BLACK);
        log::debug!("rasterizer created: {}x{}", width, height);
        r
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGB bytes, `width * height * 3` long
    pub fn frame_buffer(&self) -> &[u8] {
        &self.frame
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth
    }

    /// Fill every pixel with `color` and reset every depth to the far plane
    pub fn clear_buffers(&mut self, color: Color) {
        let rgb = color.to_rgb();
        for px in self.frame.chunks_exact_mut(3) {
            px.copy_from_slice(&rgb);
        }
        self.depth.fill(FAR_DEPTH);
    }

    /// Pixel index, or `None` when (x, y) is off the buffer
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Color at (x, y), alpha always 255
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| {
            let p = &self.frame[i * 3..i * 3 + 3];
            Color::new(p[0], p[1], p[2])
        })
    }

    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Unconditional RGB write; out-of-range coordinates are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.frame[idx * 3..idx * 3 + 3].copy_from_slice(&color.to_rgb());
        }
    }

    /// Z-buffered write: only lands if `depth` is strictly closer than what is
    /// stored. Returns whether the pixel was written.
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, depth: f32, color: Color) -> bool {
        if let Some(idx) = self.index(x, y) {
            if depth < self.depth[idx] {
                self.depth[idx] = depth;
                self.frame[idx * 3..idx * 3 + 3].copy_from_slice(&color.to_rgb());
                return true;
            }
        }
        false
    }

    /// Draw a line from (x1, y1) to (x2, y2) using Bresenham's algorithm
    ///
    /// Endpoints are ordered before stepping, so swapping them touches the
    /// same pixels. Stepping runs in i64 so extreme endpoints cannot overflow.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        let (x1, y1, x2, y2) = (x1 as i64, y1 as i64, x2 as i64, y2 as i64);
        let (w, h) = (self.width as i64, self.height as i64);

        // Both ends past the same buffer edge: nothing can land
        if (x1 < 0 && x2 < 0) || (y1 < 0 && y2 < 0) || (x1 >= w && x2 >= w) || (y1 >= h && y2 >= h) {
            return;
        }

        if (y2 - y1).abs() < (x2 - x1).abs() {
            if x1 > x2 {
                self.draw_line_shallow(x2, y2, x1, y1, color);
            } else {
                self.draw_line_shallow(x1, y1, x2, y2, color);
            }
        } else if y1 > y2 {
            self.draw_line_steep(x2, y2, x1, y1, color);
        } else {
            self.draw_line_steep(x1, y1, x2, y2, color);
        }
    }

    /// |slope| < 1, x1 <= x2: step x, occasionally y
    fn draw_line_shallow(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, color: Color) {
        let dx = x2 - x1;
        let mut dy = y2 - y1;
        let mut yi = 1;
        if dy < 0 {
            yi = -1;
            dy = -dy;
        }

        let mut d = 2 * dy - dx;
        let mut y = y1;

        for x in x1..=x2 {
            self.set_pixel(x as i32, y as i32, color);
            if d > 0 {
                y += yi;
                d -= 2 * dx;
            }
            d += 2 * dy;
        }
    }

    /// |slope| >= 1, y1 <= y2: step y, occasionally x
    fn draw_line_steep(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, color: Color) {
        let mut dx = x2 - x1;
        let dy = y2 - y1;
        let mut xi = 1;
        if dx < 0 {
            xi = -1;
            dx = -dx;
        }

        let mut d = 2 * dx - dy;
        let mut x = x1;

        for y in y1..=y2 {
            self.set_pixel(x as i32, y as i32, color);
            if d > 0 {
                x += xi;
                d -= 2 * dy;
            }
            d += 2 * dx;
        }
    }

    /// Draw a circle outline with the midpoint algorithm
    pub fn draw_circle(&mut self, xc: i32, yc: i32, r: i32, color: Color) {
        let mut x = 0;
        let mut y = r;
        let mut d = 1 - r;

        self.plot_circle_octants(xc, yc, x, y, color);

        while x < y {
            x += 1;
            if d < 0 {
                // E
                d += 2 * x + 1;
            } else {
                // SE
                y -= 1;
                d += 2 * (x - y) + 1;
            }
            self.plot_circle_octants(xc, yc, x, y, color);
        }
    }

    /// The 8 symmetric reflections of (x, y) around the center
    fn plot_circle_octants(&mut self, xc: i32, yc: i32, x: i32, y: i32, color: Color) {
        self.set_pixel(xc + x, yc + y, color);
        self.set_pixel(xc - x, yc + y, color);
        self.set_pixel(xc + x, yc - y, color);
        self.set_pixel(xc - x, yc - y, color);
        self.set_pixel(xc + y, yc + x, color);
        self.set_pixel(xc - y, yc + x, color);
        self.set_pixel(xc + y, yc - x, color);
        self.set_pixel(xc - y, yc - x, color);
    }

    /// Fill a screen-space triangle with depth testing
    ///
    /// Vertex positions must already be in screen space (x/y pixels, z NDC
    /// depth). Depth and color are interpolated per pixel; whether that is
    /// Gouraud or Phong shading depends only on how the caller produced the
    /// vertex colors, so `_use_gouraud` does not alter the fill.
    pub fn draw_triangle(&mut self, v1: &Vertex, v2: &Vertex, v3: &Vertex, _use_gouraud: bool) {
        let mut verts = [*v1, *v2, *v3];
        verts.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
        let [top, mid, bot] = verts;

        if top.position.y == bot.position.y {
            log::trace!("skipping zero-height triangle at y = {}", top.position.y);
            return;
        }

        let src = Interpolant::new(&top, &mid, &bot);

        if mid.position.y == bot.position.y {
            self.fill_flat_bottom(&top, &mid, &bot, &src);
        } else if top.position.y == mid.position.y {
            self.fill_flat_top(&top, &mid, &bot, &src);
        } else {
            let t = (mid.position.y - top.position.y) / (bot.position.y - top.position.y);
            let split = split_vertex(&top, &bot, t);
            self.fill_flat_bottom(&top, &mid, &split, &src);
            self.fill_flat_top(&mid, &split, &bot, &src);
        }
    }

    /// Apex on top, `b1`/`b2` on the flat bottom edge (at `b1`'s y)
    ///
    /// Covers rows `ceil(apex.y) .. ceil(b1.y)` that fall on the buffer.
    /// Requires both base vertices strictly below the apex; anything else
    /// draws nothing.
    fn fill_flat_bottom(&mut self, apex: &Vertex, b1: &Vertex, b2: &Vertex, src: &Interpolant) {
        let a = apex.position;
        let (p1, p2) = (b1.position, b2.position);

        if !(p1.y > a.y && p2.y > a.y) {
            log::trace!("flat-bottom fill with apex not above base, skipped");
            return;
        }

        let inv_slope1 = (p1.x - a.x) / (p1.y - a.y);
        let inv_slope2 = (p2.x - a.x) / (p2.y - a.y);

        // Rows off the buffer are skipped without stepping through them
        let y_start = (a.y.ceil() as i32).max(0);
        let y_end = (p1.y.ceil() as i32).min(self.height as i32);

        let mut x1 = a.x + (y_start as f32 - a.y) * inv_slope1;
        let mut x2 = a.x + (y_start as f32 - a.y) * inv_slope2;

        for y in y_start..y_end {
            self.fill_span(y, x1, x2, src);
            x1 += inv_slope1;
            x2 += inv_slope2;
        }
    }

    /// `t1`/`t2` on the flat top edge (at `t1`'s y), apex at the bottom
    ///
    /// Walks upward from the apex over rows `ceil(t1.y) .. ceil(apex.y)`.
    /// Requires the apex strictly below both top vertices.
    fn fill_flat_top(&mut self, t1: &Vertex, t2: &Vertex, apex: &Vertex, src: &Interpolant) {
        let a = apex.position;
        let (p1, p2) = (t1.position, t2.position);

        if !(a.y > p1.y && a.y > p2.y) {
            log::trace!("flat-top fill with apex not below top edge, skipped");
            return;
        }

        let inv_slope1 = (a.x - p1.x) / (a.y - p1.y);
        let inv_slope2 = (a.x - p2.x) / (a.y - p2.y);

        let y_first = (a.y.ceil() as i32).saturating_sub(1).min(self.height as i32 - 1);
        let y_last = (p1.y.ceil() as i32).max(0);

        let mut x1 = a.x - (a.y - y_first as f32) * inv_slope1;
        let mut x2 = a.x - (a.y - y_first as f32) * inv_slope2;

        for y in (y_last..=y_first).rev() {
            self.fill_span(y, x1, x2, src);
            x1 -= inv_slope1;
            x2 -= inv_slope2;
        }
    }

    /// Pixels `ceil(left) .. ceil(right)` on row `y`
    fn fill_span(&mut self, y: i32, xa: f32, xb: f32, src: &Interpolant) {
        if y < 0 || y as usize >= self.height {
            return;
        }

        let (left, right) = if xa <= xb { (xa, xb) } else { (xb, xa) };
        // Columns outside the buffer would be dropped anyway
        let x_start = (left.ceil() as i32).max(0);
        let x_end = (right.ceil() as i32).min(self.width as i32);

        for x in x_start..x_end {
            let (depth, color) = src.sample(x as f32, y as f32);
            self.set_pixel_with_depth(x, y, depth, color);
        }
    }

    /// Outline a triangle with three Bresenham lines
    ///
    /// Each edge is clipped to the buffer first, then drawn on truncated
    /// coordinates, so far off-screen vertices cost nothing.
    pub fn draw_wireframe_triangle(&mut self, v1: &Vertex, v2: &Vertex, v3: &Vertex, color: Color) {
        let corner = |v: &Vertex| Vec2::new(v.position.x, v.position.y);
        let (a, b, c) = (corner(v1), corner(v2), corner(v3));

        for (p, q) in [(a, b), (b, c), (c, a)] {
            self.draw_clipped_edge(p, q, color);
        }
    }

    fn draw_clipped_edge(&mut self, mut p: Vec2, mut q: Vec2, color: Color) {
        let rect = ClipRect::new(0.0, 0.0, self.width as f32, self.height as f32);
        if clip_line(&mut p, &mut q, &rect) {
            self.draw_line(p.x as i32, p.y as i32, q.x as i32, q.y as i32, color);
        }
    }
}

/// Synthetic vertex on the top-bottom edge at the middle vertex's height
fn split_vertex(top: &Vertex, bot: &Vertex, t: f32) -> Vertex {
    let c = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t) as u8;
    Vertex {
        position: top.position.lerp(bot.position, t),
        world_pos: top.world_pos.lerp(bot.world_pos, t),
        normal: top.normal.lerp(bot.normal, t).normalize(),
        color: Color::new(
            c(top.color.r, bot.color.r),
            c(top.color.g, bot.color.g),
            c(top.color.b, bot.color.b),
        ),
    }
}

/// Screen-space corners of the whole (unsplit) triangle, with the depth and
/// color to interpolate across it
struct Interpolant {
    corners: [Vec2; 3],
    depths: [f32; 3],
    colors: [Color; 3],
}

impl Interpolant {
    fn new(a: &Vertex, b: &Vertex, c: &Vertex) -> Self {
        let corner = |v: &Vertex| Vec2::new(v.position.x, v.position.y);
        Self {
            corners: [corner(a), corner(b), corner(c)],
            depths: [a.position.z, b.position.z, c.position.z],
            colors: [a.color, b.color, c.color],
        }
    }

    /// Depth and color at pixel (x, y)
    fn sample(&self, x: f32, y: f32) -> (f32, Color) {
        let [a, b, c] = self.corners;
        let w = barycentric(x, y, a, b, c);
        let [ca, cb, cc] = self.colors;

        // Written relative to the third corner (w.z = 1 - w.x - w.y) so that a
        // constant attribute interpolates to exactly itself.
        let lerp3 = |p: f32, q: f32, r: f32| r + w.x * (p - r) + w.y * (q - r);
        let [za, zb, zc] = self.depths;
        let depth = lerp3(za, zb, zc);

        // `as u8` saturates, so slight overshoot at edges clamps to 0..=255
        let mix = |p: u8, q: u8, r: u8| lerp3(p as f32, q as f32, r as f32) as u8;
        let color = Color::new(mix(ca.r, cb.r, cc.r), mix(ca.g, cb.g, cc.g), mix(ca.b, cb.b, cc.b));

        (depth, color)
    }
}
