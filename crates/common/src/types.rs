use bytemuck::{Pod, Zeroable};

/// A straight-alpha RGBA8 pixel.
///
/// `#[repr(C)]` so a pixel slice can be reinterpreted as the raw byte stream
/// a texture upload or PNG encoder expects.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const MAGENTA: Self = Self::opaque(255, 0, 255);
    pub const CYAN: Self = Self::opaque(0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Source-over composite of `src` onto `self`, with `src`'s alpha
    /// further multiplied by `alpha`.
    pub fn blend_over(self, src: Rgba, alpha: f32) -> Rgba {
        let sa = src.a as f32 / 255.0 * alpha;
        if sa <= 0.0 {
            return self;
        }
        if sa >= 1.0 {
            return src;
        }
        let da = self.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return Rgba::TRANSPARENT;
        }
        let mix = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgba {
            r: mix(src.r, self.r),
            g: mix(src.g, self.g),
            b: mix(src.b, self.b),
            a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        }
    }
}

/// Half-open integer rectangle `[x0, x1) × [y0, y1)`.
///
/// Bounds may be negative or inverted while being computed; `is_empty` and
/// `intersect` make such rectangles harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    pub fn width(&self) -> i32 {
        (self.x1 - self.x0).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.y1 - self.y0).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_is_four_bytes() {
        assert_eq!(std::mem::size_of::<Rgba>(), 4);
        let px = [Rgba::opaque(1, 2, 3)];
        let bytes: &[u8] = bytemuck::cast_slice(&px);
        assert_eq!(bytes, &[1, 2, 3, 255]);
    }

    #[test]
    fn blend_opaque_replaces() {
        let dst = Rgba::opaque(10, 20, 30);
        assert_eq!(dst.blend_over(Rgba::WHITE, 1.0), Rgba::WHITE);
    }

    #[test]
    fn blend_zero_alpha_keeps_destination() {
        let dst = Rgba::opaque(10, 20, 30);
        assert_eq!(dst.blend_over(Rgba::WHITE, 0.0), dst);
        assert_eq!(dst.blend_over(Rgba::TRANSPARENT, 1.0), dst);
    }

    #[test]
    fn blend_half_alpha_over_opaque() {
        let out = Rgba::BLACK.blend_over(Rgba::WHITE, 0.5);
        assert_eq!(out.a, 255);
        assert!((127..=128).contains(&out.r));
    }

    #[test]
    fn blend_onto_transparent_keeps_source_colour() {
        let out = Rgba::TRANSPARENT.blend_over(Rgba::opaque(200, 100, 50), 0.8);
        assert_eq!((out.r, out.g, out.b), (200, 100, 50));
        assert_eq!(out.a, 204);
    }

    #[test]
    fn rect_intersection_and_empty() {
        let a = Rect::new(-10, 0, 50, 2);
        let b = Rect::from_size(40, 10);
        let c = a.intersect(&b);
        assert_eq!(c, Rect::new(0, 0, 40, 2));
        assert_eq!(c.width(), 40);
        assert!(Rect::new(5, 0, 5, 2).is_empty());
        assert!(Rect::new(60, 0, 50, 2).is_empty());
        assert_eq!(Rect::new(60, 0, 50, 2).width(), 0);
    }
}
