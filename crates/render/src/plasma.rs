use std::f64::consts::PI;

use oldskool_common::{Canvas, Rgba};

/// An RGB triple produced by the plasma generator.
pub type Rgb = [u8; 3];

const KX: f64 = 0.02;
const KY: f64 = 0.03;
const KR: f64 = 0.01;
const KD: f64 = 0.01;

/// Plasma value at pixel `(x, y)` for time `t`, in `[-1, 1]`.
///
/// Average of four independent ripples: horizontal, vertical, radial from
/// the top-left corner and diagonal, each with its own time multiplier.
#[inline]
pub fn plasma_value(x: u32, y: u32, t: f64) -> f64 {
    let (fx, fy) = (x as f64, y as f64);
    let v1 = (fx * KX + t).sin();
    let v2 = (fy * KY + t * 1.5).sin();
    let v3 = ((fx * fx + fy * fy).sqrt() * KR + t * 0.5).sin();
    let v4 = ((fx + fy) * KD + t * 2.0).sin();
    (v1 + v2 + v3 + v4) / 4.0
}

/// Map a plasma value to a colour with three sine waves 120° apart.
#[inline]
pub fn plasma_color(v: f64) -> Rgb {
    let channel = |phase: f64| ((v * PI + phase).sin() + 1.0) * 127.0;
    [
        channel(0.0) as u8,
        channel(2.0 * PI / 3.0) as u8,
        channel(4.0 * PI / 3.0) as u8,
    ]
}

/// Generate a full `width × height` plasma grid, row-major.
///
/// Pure: the same `(width, height, t)` always yields the same grid.
pub fn generate(width: u32, height: u32, t: f64) -> Vec<Rgb> {
    let mut out = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            out.push(plasma_color(plasma_value(x, y, t)));
        }
    }
    out
}

/// Plasma background layer: a time accumulator plus the canvas it paints.
///
/// The canvas carries no state between frames; it is fully overwritten by
/// every [`PlasmaField::render`].
#[derive(Debug, Clone)]
pub struct PlasmaField {
    time: f64,
    canvas: Canvas,
}

impl PlasmaField {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            time: 0.0,
            canvas: Canvas::new(width, height),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advance the time accumulator.
    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
    }

    /// Regenerate the field for the current time.
    pub fn render(&mut self) -> &Canvas {
        let (w, h) = (self.canvas.width(), self.canvas.height());
        self.canvas.clear();
        for (i, [r, g, b]) in generate(w, h, self.time).into_iter().enumerate() {
            let x = (i % w as usize) as i32;
            let y = (i / w as usize) as i32;
            self.canvas.set(x, y, Rgba::opaque(r, g, b));
        }
        &self.canvas
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}
