use crate::types::{Rect, Rgba};

/// Placement of a source image when drawing onto a [`Canvas`].
///
/// The source sub-rectangle is scaled first, then translated, matching the
/// usual "scale then translate" geometry matrix of 2D blitters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOptions {
    /// Sub-rectangle of the source to draw. `None` draws the whole source.
    pub src: Option<Rect>,
    pub scale: (f64, f64),
    pub translate: (f64, f64),
    /// Global alpha multiplier applied on top of per-pixel alpha.
    pub alpha: f32,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            src: None,
            scale: (1.0, 1.0),
            translate: (0.0, 0.0),
            alpha: 1.0,
        }
    }
}

impl DrawOptions {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            translate: (x, y),
            ..Self::default()
        }
    }

    pub fn scaled(mut self, sx: f64, sy: f64) -> Self {
        self.scale = (sx, sy);
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_source(mut self, src: Rect) -> Self {
        self.src = Some(src);
        self
    }
}

/// A screen-space vertex carrying texel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedVertex {
    pub x: f32,
    pub y: f32,
    /// Texel coordinates (not normalized).
    pub u: f32,
    pub v: f32,
}

/// Row-major RGBA8 drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    /// Transparent canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Wrap raw RGBA8 bytes. Returns `None` when the length does not match.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != width as usize * height as usize * 4 {
            return None;
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
            .collect();
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.fill(Rgba::TRANSPARENT);
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Texel fetch with coordinates clamped to the edges.
    pub fn get_clamped(&self, x: i32, y: i32) -> Rgba {
        if self.pixels.is_empty() {
            return Rgba::TRANSPARENT;
        }
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        self.pixels[y * self.width as usize + x]
    }

    /// Overwrite a pixel. Out-of-range writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Blit `src` onto this canvas with nearest-neighbour sampling and
    /// source-over blending.
    ///
    /// Destination pixels are sampled at their centres and mapped back into
    /// the source rectangle, so fractional translations round consistently
    /// and nothing outside either surface is ever touched.
    pub fn draw(&mut self, src: &Canvas, opts: &DrawOptions) {
        let src_rect = match opts.src {
            Some(r) => r.intersect(&src.bounds()),
            None => src.bounds(),
        };
        let (sx, sy) = opts.scale;
        if src_rect.is_empty() || opts.alpha <= 0.0 || sx <= 0.0 || sy <= 0.0 {
            return;
        }
        let (tx, ty) = opts.translate;
        let w = src_rect.width() as f64;
        let h = src_rect.height() as f64;

        let x_start = tx.floor().max(0.0) as i32;
        let x_end = (tx + w * sx).ceil().min(self.width as f64) as i32;
        let y_start = ty.floor().max(0.0) as i32;
        let y_end = (ty + h * sy).ceil().min(self.height as f64) as i32;

        for py in y_start..y_end {
            let fy = (py as f64 + 0.5 - ty) / sy;
            if fy < 0.0 || fy >= h {
                continue;
            }
            let src_y = src_rect.y0 + fy as i32;
            let dst_row = py as usize * self.width as usize;
            let src_row = src_y as usize * src.width as usize;
            for px in x_start..x_end {
                let fx = (px as f64 + 0.5 - tx) / sx;
                if fx < 0.0 || fx >= w {
                    continue;
                }
                let src_x = src_rect.x0 + fx as i32;
                let s = src.pixels[src_row + src_x as usize];
                let d = &mut self.pixels[dst_row + px as usize];
                *d = d.blend_over(s, opts.alpha);
            }
        }
    }

    /// Rasterize one affine-textured triangle.
    ///
    /// Either winding is accepted; degenerate triangles draw nothing.
    pub fn draw_textured_triangle(&mut self, texture: &Canvas, tri: [TexturedVertex; 3]) {
        let [a, b, c] = tri;
        let area = edge(a.x, a.y, b.x, b.y, c.x, c.y);
        if area.abs() < f32::EPSILON {
            return;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as i32;
        let max_x = a.x.max(b.x).max(c.x).ceil().min(self.width as f32) as i32;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as i32;
        let max_y = a.y.max(b.y).max(c.y).ceil().min(self.height as f32) as i32;

        for py in min_y..max_y {
            let cy = py as f32 + 0.5;
            for px in min_x..max_x {
                let cx = px as f32 + 0.5;
                let w0 = edge(b.x, b.y, c.x, c.y, cx, cy) / area;
                let w1 = edge(c.x, c.y, a.x, a.y, cx, cy) / area;
                let w2 = edge(a.x, a.y, b.x, b.y, cx, cy) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let u = w0 * a.u + w1 * b.u + w2 * c.u;
                let v = w0 * a.v + w1 * b.v + w2 * c.v;
                let texel = texture.get_clamped(u.floor() as i32, v.floor() as i32);
                let i = py as usize * self.width as usize + px as usize;
                self.pixels[i] = self.pixels[i].blend_over(texel, 1.0);
            }
        }
    }
}

/// Signed doubled area of `(a, b, p)`.
fn edge(ax: f32, ay: f32, bx: f32, by: f32, px: f32, py: f32) -> f32 {
    (bx - ax) * (py - ay) - (by - ay) * (px - ax)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: u32, h: u32) -> Canvas {
        let mut c = Canvas::new(w, h);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                c.set(x, y, Rgba::opaque(v, x as u8, y as u8));
            }
        }
        c
    }

    #[test]
    fn new_canvas_is_transparent() {
        let c = Canvas::new(4, 3);
        assert_eq!(c.pixels().len(), 12);
        assert!(c.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
        assert_eq!(c.as_bytes().len(), 48);
    }

    #[test]
    fn from_rgba8_checks_length() {
        assert!(Canvas::from_rgba8(2, 2, &[0; 15]).is_none());
        let c = Canvas::from_rgba8(1, 1, &[1, 2, 3, 4]).unwrap();
        assert_eq!(c.get(0, 0), Some(Rgba::new(1, 2, 3, 4)));
    }

    #[test]
    fn set_out_of_range_is_ignored() {
        let mut c = Canvas::new(2, 2);
        c.set(-1, 0, Rgba::WHITE);
        c.set(2, 0, Rgba::WHITE);
        c.set(0, 5, Rgba::WHITE);
        assert!(c.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
        assert_eq!(c.get(3, 3), None);
    }

    #[test]
    fn get_clamped_stays_on_edges() {
        let c = checker(4, 4);
        assert_eq!(c.get_clamped(-5, -5), c.get(0, 0).unwrap());
        assert_eq!(c.get_clamped(10, 2), c.get(3, 2).unwrap());
    }

    #[test]
    fn draw_identity_copies_pixels() {
        let src = checker(4, 4);
        let mut dst = Canvas::new(4, 4);
        dst.draw(&src, &DrawOptions::default());
        assert_eq!(dst, src);
    }

    #[test]
    fn draw_scaled_two_x_duplicates_pixels() {
        let src = checker(2, 2);
        let mut dst = Canvas::new(4, 4);
        dst.draw(&src, &DrawOptions::default().scaled(2.0, 2.0));
        assert_eq!(dst.get(0, 0), src.get(0, 0));
        assert_eq!(dst.get(1, 1), src.get(0, 0));
        assert_eq!(dst.get(2, 0), src.get(1, 0));
        assert_eq!(dst.get(3, 3), src.get(1, 1));
    }

    #[test]
    fn draw_translated_partially_offscreen() {
        let src = Canvas::filled(4, 1, Rgba::WHITE);
        let mut dst = Canvas::new(4, 1);
        dst.draw(&src, &DrawOptions::at(-2.0, 0.0));
        assert_eq!(dst.get(0, 0), Some(Rgba::WHITE));
        assert_eq!(dst.get(1, 0), Some(Rgba::WHITE));
        assert_eq!(dst.get(2, 0), Some(Rgba::TRANSPARENT));

        let mut dst = Canvas::new(4, 1);
        dst.draw(&src, &DrawOptions::at(100.0, 0.0));
        assert!(dst.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
    }

    #[test]
    fn draw_source_rect_is_clamped() {
        let src = checker(4, 4);
        let mut dst = Canvas::new(4, 4);
        dst.draw(
            &src,
            &DrawOptions::default().with_source(Rect::new(2, 1, 10, 2)),
        );
        assert_eq!(dst.get(0, 0), src.get(2, 1));
        assert_eq!(dst.get(1, 0), src.get(3, 1));
        assert_eq!(dst.get(2, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(dst.get(0, 1), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn draw_with_alpha_blends() {
        let src = Canvas::filled(1, 1, Rgba::WHITE);
        let mut dst = Canvas::filled(1, 1, Rgba::BLACK);
        dst.draw(&src, &DrawOptions::default().with_alpha(0.8));
        let p = dst.get(0, 0).unwrap();
        assert_eq!(p.r, 204);
        assert_eq!(p.a, 255);
    }

    #[test]
    fn triangle_covers_interior_either_winding() {
        let tex = Canvas::filled(8, 8, Rgba::CYAN);
        for tri in [
            [(0.0, 0.0), (8.0, 0.0), (0.0, 8.0)],
            [(0.0, 0.0), (0.0, 8.0), (8.0, 0.0)],
        ] {
            let mut dst = Canvas::new(8, 8);
            let verts = tri.map(|(x, y)| TexturedVertex { x, y, u: x, v: y });
            dst.draw_textured_triangle(&tex, verts);
            assert_eq!(dst.get(1, 1), Some(Rgba::CYAN));
            assert_eq!(dst.get(7, 7), Some(Rgba::TRANSPARENT));
        }
    }

    #[test]
    fn triangle_samples_texture_coordinates() {
        let mut tex = Canvas::filled(2, 1, Rgba::BLACK);
        tex.set(1, 0, Rgba::WHITE);
        let mut dst = Canvas::new(10, 10);
        let v = |x: f32, y: f32, u: f32| TexturedVertex { x, y, u, v: 0.0 };
        dst.draw_textured_triangle(&tex, [v(0.0, 0.0, 0.0), v(10.0, 0.0, 2.0), v(0.0, 10.0, 0.0)]);
        assert_eq!(dst.get(1, 1), Some(Rgba::BLACK));
        assert_eq!(dst.get(7, 1), Some(Rgba::WHITE));
    }

    #[test]
    fn degenerate_triangle_draws_nothing() {
        let tex = Canvas::filled(2, 2, Rgba::WHITE);
        let mut dst = Canvas::new(4, 4);
        let v = |x: f32, y: f32| TexturedVertex { x, y, u: 0.0, v: 0.0 };
        dst.draw_textured_triangle(&tex, [v(0.0, 0.0), v(2.0, 2.0), v(4.0, 4.0)]);
        assert!(dst.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
    }
}
