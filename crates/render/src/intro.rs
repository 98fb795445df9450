//! Single-line intro scroller shown before the main scene.
//!
//! Each tick the strip is shifted left through a second buffer and the
//! current glyph is stamped near the right edge. The next glyph is fetched
//! once the stamp position has moved past its anchor.

use oldskool_common::consts::{GLYPH_HEIGHT, INTRO_FONT_SCALE, INTRO_SCROLL_STEP, INTRO_SHADER_STEP};
use oldskool_common::{Canvas, DrawOptions, Rect};

use crate::font::BitmapFont;

#[derive(Debug, Clone)]
pub struct IntroScroller {
    text: Vec<char>,
    /// Stamp position relative to `anchor_x`.
    intro_x: i32,
    letter: i64,
    anchor_x: i32,
    complete: bool,
    shader_time: f64,
    strip: Canvas,
    back: Canvas,
}

impl IntroScroller {
    /// `width` is the strip width; glyphs are stamped at `anchor_x + intro_x`.
    pub fn new(text: &str, width: u32, anchor_x: i32) -> Self {
        let height = (GLYPH_HEIGHT as f64 * INTRO_FONT_SCALE) as u32;
        Self {
            text: text.chars().collect(),
            intro_x: -1,
            letter: -1,
            anchor_x,
            complete: false,
            shader_time: 0.0,
            strip: Canvas::new(width, height),
            back: Canvas::new(width, height),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn letter_index(&self) -> i64 {
        self.letter
    }

    pub fn intro_x(&self) -> i32 {
        self.intro_x
    }

    /// Clock fed to the CRT post-process.
    pub fn shader_time(&self) -> f64 {
        self.shader_time
    }

    pub fn strip(&self) -> &Canvas {
        &self.strip
    }

    /// Character at `pos`, cycling through the text and folded to upper case.
    pub fn letter_at(&self, pos: i64) -> char {
        if self.text.is_empty() {
            return ' ';
        }
        let i = pos.rem_euclid(self.text.len() as i64) as usize;
        self.text[i].to_ascii_uppercase()
    }

    /// Run one intro tick. Does nothing once the text has been exhausted.
    pub fn advance(&mut self, font: &BitmapFont) {
        if self.complete {
            return;
        }
        if self.intro_x < 0 {
            if self.letter >= 0 {
                if let Some(glyph) = font.glyph_folded(self.letter_at(self.letter)) {
                    self.intro_x += (glyph.width as f64 * INTRO_FONT_SCALE) as i32;
                }
            }
            self.letter += 1;
            if self.letter >= self.text.len() as i64 {
                self.complete = true;
                tracing::debug!(letters = self.text.len(), "intro complete");
                return;
            }
        }
        self.intro_x -= INTRO_SCROLL_STEP;
        self.shift_left();

        if let Some(glyph) = font.glyph_folded(self.letter_at(self.letter)) {
            let x = (self.anchor_x + self.intro_x) as f64;
            font.draw_glyph(&mut self.strip, glyph, x, 0.0, INTRO_FONT_SCALE);
        }
        self.shader_time += INTRO_SHADER_STEP;
    }

    fn shift_left(&mut self) {
        let w = self.strip.width() as i32;
        let h = self.strip.height() as i32;
        self.back.clear();
        self.back.draw(
            &self.strip,
            &DrawOptions::default().with_source(Rect::new(INTRO_SCROLL_STEP, 0, w, h)),
        );
        self.strip.clear();
        self.strip.draw(&self.back, &DrawOptions::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oldskool_common::Rgba;

    fn font() -> BitmapFont {
        BitmapFont::new(Canvas::filled(480, 216, Rgba::WHITE))
    }

    #[test]
    fn strip_is_double_height() {
        let intro = IntroScroller::new("AB", 768, 640);
        assert_eq!(intro.strip().height(), 72);
        assert_eq!(intro.intro_x(), -1);
        assert_eq!(intro.letter_index(), -1);
    }

    #[test]
    fn first_tick_fetches_letter_zero() {
        let f = font();
        let mut intro = IntroScroller::new("I", 768, 640);
        intro.advance(&f);
        assert_eq!(intro.letter_index(), 0);
        assert_eq!(intro.intro_x(), -7);
        // 'I' is 16 px wide, doubled, stamped at 633
        assert_eq!(intro.strip().get(633, 0), Some(Rgba::WHITE));
        assert_eq!(intro.strip().get(664, 71), Some(Rgba::WHITE));
        assert_eq!(intro.strip().get(665, 0), Some(Rgba::TRANSPARENT));
        assert!((intro.shader_time() - 0.016).abs() < 1e-12);
    }

    #[test]
    fn strip_shifts_left_without_trails() {
        let f = font();
        let mut intro = IntroScroller::new("I", 768, 640);
        intro.advance(&f);
        let before = intro.strip().clone();
        intro.shift_left();
        assert_eq!(intro.strip().get(627, 0), before.get(633, 0));
        assert_eq!(intro.strip().get(659, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(intro.strip().get(767, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn completes_after_last_letter() {
        let f = font();
        let mut intro = IntroScroller::new("ab", 768, 640);
        let mut ticks = 0;
        while !intro.is_complete() {
            intro.advance(&f);
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert_eq!(intro.letter_index(), 2);
        let clock = intro.shader_time();
        intro.advance(&f);
        assert_eq!(intro.shader_time(), clock);
    }

    #[test]
    fn letter_at_cycles_and_folds() {
        let intro = IntroScroller::new("ab", 768, 640);
        assert_eq!(intro.letter_at(0), 'A');
        assert_eq!(intro.letter_at(3), 'B');
        assert_eq!(IntroScroller::new("", 768, 640).letter_at(5), ' ');
    }
}
