//! Logo with per-scanline sine distortion and horizontal toroidal wrap.

use oldskool_common::{Canvas, DrawOptions, Rect};

use crate::Layer;
use crate::distortion::DistortionTable;

/// Cursor increment per tick.
pub const LOGO_CURSOR_STEP: i64 = 2;
/// Damping applied to the per-line table value.
pub const LINE_DAMPING: f64 = 0.15;
/// Frequency of the global horizontal sweep.
pub const SWEEP_FREQUENCY: f64 = 0.01;
/// Top of the logo on the canvas.
pub const LOGO_TOP: f64 = 60.0;

/// Where one logo row lands: the main copy when it overlaps the canvas, and
/// a wrapped copy on the opposite edge when the row sticks out of either side.
pub fn row_placements(final_x: f64, logo_width: f64, canvas_width: f64) -> [Option<f64>; 2] {
    let main = (final_x > -logo_width && final_x < canvas_width).then_some(final_x);
    let wrapped = if final_x < 0.0 {
        Some(canvas_width + final_x)
    } else if final_x + logo_width > canvas_width {
        Some(final_x - canvas_width)
    } else {
        None
    };
    [main, wrapped]
}

#[derive(Debug, Clone)]
pub struct DistortedLogo {
    image: Canvas,
    table: DistortionTable,
    cursor: i64,
    canvas_width: u32,
}

impl DistortedLogo {
    pub fn new(image: Canvas, canvas_width: u32) -> Self {
        Self {
            image,
            table: DistortionTable::logo(),
            cursor: 0,
            canvas_width,
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn advance(&mut self) {
        self.cursor += LOGO_CURSOR_STEP;
    }

    /// Sweep of the whole logo, `±canvas_width/2`.
    pub fn global_offset(&self) -> f64 {
        (self.cursor as f64 * SWEEP_FREQUENCY).sin() * (self.canvas_width / 2) as f64
    }

    /// Damped table offset for logo row `row`.
    pub fn line_offset(&self, row: u32) -> f64 {
        self.table.get(self.cursor + 2 * row as i64) * LINE_DAMPING
    }

    /// Left edge of logo row `row` before wrapping.
    pub fn row_x(&self, row: u32) -> f64 {
        let base = (self.canvas_width / 2) as f64;
        base + self.global_offset() + self.line_offset(row) - self.image.width() as f64 / 2.0
    }
}

impl Layer for DistortedLogo {
    fn draw(&self, target: &mut Canvas) {
        let w = self.image.width();
        let cw = self.canvas_width as f64;
        for row in 0..self.image.height() {
            let src = Rect::new(0, row as i32, w as i32, row as i32 + 1);
            let y = LOGO_TOP + row as f64;
            for x in row_placements(self.row_x(row), w as f64, cw).into_iter().flatten() {
                target.draw(&self.image, &DrawOptions::at(x, y).with_source(src));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oldskool_common::Rgba;

    #[test]
    fn inside_row_draws_once() {
        assert_eq!(row_placements(100.0, 256.0, 640.0), [Some(100.0), None]);
    }

    #[test]
    fn row_off_left_wraps_right() {
        assert_eq!(row_placements(-50.0, 256.0, 640.0), [Some(-50.0), Some(590.0)]);
    }

    #[test]
    fn row_off_right_wraps_left() {
        assert_eq!(row_placements(500.0, 256.0, 640.0), [Some(500.0), Some(-140.0)]);
    }

    #[test]
    fn row_fully_outside_still_wraps() {
        let [main, wrapped] = row_placements(-300.0, 256.0, 640.0);
        assert_eq!(main, None);
        assert_eq!(wrapped, Some(340.0));
    }

    #[test]
    fn cursor_and_offsets() {
        let mut logo = DistortedLogo::new(Canvas::filled(256, 64, Rgba::MAGENTA), 640);
        assert_eq!(logo.global_offset(), 0.0);
        // table[0] = 0, so row 0 starts centred
        assert_eq!(logo.row_x(0), 320.0 - 128.0);
        logo.advance();
        logo.advance();
        assert_eq!(logo.cursor(), 4);
        let expected = 50.0 * (6.0f64 * 0.05).sin() * LINE_DAMPING;
        assert!((logo.line_offset(1) - expected).abs() < 1e-12);
        assert!((logo.global_offset() - 0.04f64.sin() * 320.0).abs() < 1e-12);
    }

    #[test]
    fn centred_logo_draws_rows_from_top() {
        let logo = DistortedLogo::new(Canvas::filled(256, 64, Rgba::MAGENTA), 640);
        let mut target = Canvas::new(640, 400);
        logo.draw(&mut target);
        assert_eq!(target.get(320, 60), Some(Rgba::MAGENTA));
        assert_eq!(target.get(320, 59), Some(Rgba::TRANSPARENT));
        assert_eq!(target.get(320, 124), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn swept_logo_wraps_across_edge() {
        let mut logo = DistortedLogo::new(Canvas::filled(256, 4, Rgba::MAGENTA), 640);
        // sin(cursor·0.01) ≈ 1 puts the logo at x ≈ 512 so it sticks out right
        while (logo.cursor() as f64 * SWEEP_FREQUENCY).sin() < 0.999 {
            logo.advance();
        }
        let mut target = Canvas::new(640, 400);
        logo.draw(&mut target);
        assert_eq!(target.get(639, 60), Some(Rgba::MAGENTA));
        assert_eq!(target.get(0, 60), Some(Rgba::MAGENTA));
        assert_eq!(target.get(300, 60), Some(Rgba::TRANSPARENT));
    }
}
