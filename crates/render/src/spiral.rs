use std::f64::consts::TAU;

use oldskool_common::consts::SPIRAL_SPEED;
use oldskool_common::{Canvas, DrawOptions};

pub const SPIRAL_COUNT: usize = 12;
pub const SPIRAL_RADIUS: f64 = 150.0;
const WOBBLE: f64 = 20.0;

/// Centre offset and scale of one logo copy, relative to the layer centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralSprite {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

/// Sprite `i` of the ring at time `t`.
pub fn sprite(i: usize, t: f64) -> SpiralSprite {
    let fi = i as f64;
    let angle = t + fi * TAU / SPIRAL_COUNT as f64;
    let phase = t * 2.0 + fi;
    SpiralSprite {
        x: angle.cos() * SPIRAL_RADIUS + phase.sin() * WOBBLE,
        y: angle.sin() * SPIRAL_RADIUS + phase.cos() * WOBBLE,
        scale: 0.5 + 0.5 * (t + fi * 0.5).sin(),
    }
}

/// Ring of rotating, pulsing logo copies on its own layer.
#[derive(Debug, Clone)]
pub struct LogoSpiral {
    logo: Canvas,
    time: f64,
    canvas: Canvas,
}

impl LogoSpiral {
    pub fn new(logo: Canvas, width: u32, height: u32) -> Self {
        Self {
            logo,
            time: 0.0,
            canvas: Canvas::new(width, height),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn advance(&mut self) {
        self.time += SPIRAL_SPEED;
    }

    pub fn render(&mut self) -> &Canvas {
        self.canvas.clear();
        let cx = self.canvas.width() as f64 / 2.0;
        let cy = self.canvas.height() as f64 / 2.0;
        let half_w = self.logo.width() as f64 / 2.0;
        let half_h = self.logo.height() as f64 / 2.0;
        for i in 0..SPIRAL_COUNT {
            let s = sprite(i, self.time);
            // centre the logo on its origin, scale, then move into place
            let opts = DrawOptions::at(s.x + cx - half_w * s.scale, s.y + cy - half_h * s.scale)
                .scaled(s.scale, s.scale);
            self.canvas.draw(&self.logo, &opts);
        }
        &self.canvas
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oldskool_common::Rgba;

    #[test]
    fn first_sprite_at_time_zero() {
        let s = sprite(0, 0.0);
        assert!((s.x - 150.0).abs() < 1e-12);
        assert!((s.y - 20.0).abs() < 1e-12);
        assert!((s.scale - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sprites_are_evenly_spaced() {
        let a = sprite(3, 0.0);
        // angle π/2, wobble phase 3
        assert!((a.x - (3.0f64.sin() * 20.0)).abs() < 1e-9);
        assert!((a.y - (150.0 + 3.0f64.cos() * 20.0)).abs() < 1e-9);
    }

    #[test]
    fn scale_stays_in_unit_range() {
        for step in 0..500 {
            let t = step as f64 * 0.02;
            for i in 0..SPIRAL_COUNT {
                let s = sprite(i, t);
                assert!((0.0..=1.0).contains(&s.scale));
            }
        }
    }

    #[test]
    fn render_clears_and_draws_sprite_zero() {
        let mut spiral = LogoSpiral::new(Canvas::filled(64, 64, Rgba::CYAN), 640, 400);
        spiral.advance();
        assert!((spiral.time() - 0.02).abs() < 1e-12);
        let s = sprite(0, spiral.time());
        let canvas = spiral.render();
        let px = (320.0 + s.x) as i32;
        let py = (200.0 + s.y) as i32;
        assert_eq!(canvas.get(px, py), Some(Rgba::CYAN));
        assert_eq!(canvas.get(320, 200), Some(Rgba::TRANSPARENT));
    }
}
