//! Wave-distorted scroll text.
//!
//! The text is first laid out into an off-canvas strip wider than the
//! visible canvas, then copied onto the canvas two scanlines at a time with
//! a horizontal offset read from [`DistortionTable::scroll_wave`].

use oldskool_common::consts::{
    DEMO_FONT_SCALE, GLYPH_HEIGHT, SCROLL_STEP, SCROLL_STRIP_EXTRA, SCROLL_WAVE_STEP,
};
use oldskool_common::{Canvas, DrawOptions, Rect};

use crate::Layer;
use crate::distortion::DistortionTable;
use crate::font::BitmapFont;

/// Glyphs further than this outside the strip are not stamped.
const GLYPH_CULL_MARGIN: f64 = 200.0;
/// Distance of the text band from the bottom of the canvas.
const BAND_BOTTOM_MARGIN: u32 = 100;
/// Rows copied per distortion step.
const ROWS_PER_STEP: u32 = 2;
/// Left edge of the canvas inside the text layout.
const VIEW_LEFT: i32 = 64;

#[derive(Debug, Clone)]
pub struct WaveScroller {
    text: Vec<char>,
    total_width: f64,
    scroll_x: f64,
    wave: DistortionTable,
    wave_offset: f64,
    strip: Canvas,
    canvas_width: u32,
    band_top: f64,
}

impl WaveScroller {
    pub fn new(text: &str, font: &BitmapFont, canvas_width: u32, canvas_height: u32) -> Self {
        let strip_height = (GLYPH_HEIGHT as f64 * DEMO_FONT_SCALE) as u32;
        Self {
            text: text.chars().collect(),
            total_width: font.text_width(text, DEMO_FONT_SCALE),
            scroll_x: 0.0,
            wave: DistortionTable::scroll_wave(),
            wave_offset: 0.0,
            strip: Canvas::new(canvas_width + SCROLL_STRIP_EXTRA, strip_height),
            canvas_width,
            band_top: canvas_height.saturating_sub(BAND_BOTTOM_MARGIN) as f64,
        }
    }

    /// Replace the horizontal wave table.
    pub fn with_wave(mut self, wave: DistortionTable) -> Self {
        self.wave = wave;
        self
    }

    pub fn total_width(&self) -> f64 {
        self.total_width
    }

    pub fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    pub fn wave_offset(&self) -> f64 {
        self.wave_offset
    }

    pub fn strip(&self) -> &Canvas {
        &self.strip
    }

    /// Move the text and the wave one tick. The scroll cursor resets to 0
    /// as soon as it reaches the text width.
    pub fn advance(&mut self) {
        self.scroll_x += SCROLL_STEP;
        if self.scroll_x >= self.total_width {
            self.scroll_x = 0.0;
        }
        self.wave_offset += SCROLL_WAVE_STEP;
    }

    /// Lay the text out into the strip for the current scroll position.
    pub fn render_strip(&mut self, font: &BitmapFont) {
        self.strip.clear();
        let strip_w = self.strip.width() as f64;
        let mut x = strip_w - self.scroll_x;
        for &c in &self.text {
            if let Some(glyph) = font.glyph(c) {
                if x > -GLYPH_CULL_MARGIN && x < strip_w + GLYPH_CULL_MARGIN {
                    font.draw_glyph(&mut self.strip, glyph, x, 0.0, DEMO_FONT_SCALE);
                }
            }
            x += font.advance(c, DEMO_FONT_SCALE);
        }
    }

    /// Number of two-row bands in the strip.
    pub fn band_count(&self) -> u32 {
        self.strip.height() / ROWS_PER_STEP
    }

    /// Strip rectangle copied for band `band`, clamped horizontally to the
    /// strip. `None` when nothing is left after clamping.
    pub fn source_rect(&self, band: u32) -> Option<Rect> {
        let idx = self.wave_offset as i64 + band as i64;
        let offset = self.wave.get(idx);
        let strip_w = self.strip.width() as i32;
        let cw = self.canvas_width as i32;
        let src_x = offset as i32 + VIEW_LEFT + (strip_w - cw) / 2;
        let y0 = (band * ROWS_PER_STEP) as i32;
        let rect = Rect::new(
            src_x.max(0),
            y0,
            (src_x + cw).min(strip_w),
            y0 + ROWS_PER_STEP as i32,
        );
        (!rect.is_empty()).then_some(rect)
    }
}

impl Layer for WaveScroller {
    fn draw(&self, target: &mut Canvas) {
        for band in 0..self.band_count() {
            if let Some(src) = self.source_rect(band) {
                let y = self.band_top + (band * ROWS_PER_STEP) as f64;
                target.draw(&self.strip, &DrawOptions::at(0.0, y).with_source(src));
            }
        }
    }
}
