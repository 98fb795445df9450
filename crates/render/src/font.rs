//! Fixed-height bitmap font backed by a glyph atlas image.

use oldskool_common::consts::{GLYPH_HEIGHT, MISSING_GLYPH_WIDTH};
use oldskool_common::{Canvas, DrawOptions, Rect};

/// One glyph cell in the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub x: u32,
    pub y: u32,
    pub width: u32,
}

impl Glyph {
    pub fn source(&self) -> Rect {
        Rect::new(
            self.x as i32,
            self.y as i32,
            (self.x + self.width) as i32,
            (self.y + GLYPH_HEIGHT) as i32,
        )
    }
}

const fn g(x: u32, y: u32, width: u32) -> Glyph {
    Glyph { x, y, width }
}

/// Atlas layout: six rows of 36 px, cells on a 48 px grid. The font only
/// carries upper case.
const GLYPHS: [(char, Glyph); 53] = [
    (' ', g(0, 0, 32)),
    ('!', g(48, 0, 16)),
    ('"', g(96, 0, 32)),
    ('\'', g(336, 0, 16)),
    ('(', g(384, 0, 32)),
    (')', g(432, 0, 32)),
    ('+', g(48, 36, 48)),
    (',', g(96, 36, 16)),
    ('-', g(144, 36, 32)),
    ('.', g(192, 36, 16)),
    ('0', g(288, 36, 48)),
    ('1', g(336, 36, 48)),
    ('2', g(384, 36, 48)),
    ('3', g(432, 36, 48)),
    ('4', g(0, 72, 48)),
    ('5', g(48, 72, 48)),
    ('6', g(96, 72, 48)),
    ('7', g(144, 72, 48)),
    ('8', g(192, 72, 48)),
    ('9', g(240, 72, 48)),
    (':', g(288, 72, 16)),
    (';', g(336, 72, 16)),
    ('<', g(384, 72, 32)),
    ('=', g(432, 72, 32)),
    ('>', g(0, 108, 32)),
    ('?', g(48, 108, 48)),
    ('A', g(144, 108, 48)),
    ('B', g(192, 108, 48)),
    ('C', g(240, 108, 48)),
    ('D', g(288, 108, 48)),
    ('E', g(336, 108, 48)),
    ('F', g(384, 108, 48)),
    ('G', g(432, 108, 48)),
    ('H', g(0, 144, 48)),
    ('I', g(48, 144, 16)),
    ('J', g(96, 144, 48)),
    ('K', g(144, 144, 48)),
    ('L', g(192, 144, 48)),
    ('M', g(240, 144, 48)),
    ('N', g(288, 144, 48)),
    ('O', g(336, 144, 48)),
    ('P', g(384, 144, 48)),
    ('Q', g(432, 144, 48)),
    ('R', g(0, 180, 48)),
    ('S', g(48, 180, 48)),
    ('T', g(96, 180, 48)),
    ('U', g(144, 180, 48)),
    ('V', g(192, 180, 48)),
    ('W', g(240, 180, 48)),
    ('X', g(288, 180, 48)),
    ('Y', g(336, 180, 48)),
    ('Z', g(384, 180, 48)),
    ('#', g(432, 180, 48)),
];

#[derive(Debug, Clone)]
pub struct BitmapFont {
    atlas: Canvas,
}

impl BitmapFont {
    pub fn new(atlas: Canvas) -> Self {
        Self { atlas }
    }

    pub fn atlas(&self) -> &Canvas {
        &self.atlas
    }

    /// Exact lookup, no case folding.
    pub fn glyph(&self, c: char) -> Option<Glyph> {
        lookup(c)
    }

    /// Lookup with lower case folded to upper case.
    pub fn glyph_folded(&self, c: char) -> Option<Glyph> {
        lookup(c.to_ascii_uppercase())
    }

    /// Horizontal advance of `c` at `scale`; unknown characters advance by
    /// the fallback width.
    pub fn advance(&self, c: char, scale: f64) -> f64 {
        let w = self.glyph(c).map_or(MISSING_GLYPH_WIDTH, |g| g.width);
        w as f64 * scale
    }

    /// Total width of `text` at `scale`.
    pub fn text_width(&self, text: &str, scale: f64) -> f64 {
        text.chars().map(|c| self.advance(c, scale)).sum()
    }

    /// Stamp one glyph with its top-left corner at `(x, y)`.
    pub fn draw_glyph(&self, target: &mut Canvas, glyph: Glyph, x: f64, y: f64, scale: f64) {
        let opts = DrawOptions::at(x, y)
            .scaled(scale, scale)
            .with_source(glyph.source());
        target.draw(&self.atlas, &opts);
    }
}

fn lookup(c: char) -> Option<Glyph> {
    GLYPHS.iter().find(|(k, _)| *k == c).map(|(_, g)| *g)
}

/// Number of characters the font can render.
pub fn glyph_count() -> usize {
    GLYPHS.len()
}
