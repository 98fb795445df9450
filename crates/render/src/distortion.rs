//! Chained finite offset tables for scanline distortion.
//!
//! Tables are built once by concatenating sine/cosine segments and are
//! read-only afterwards. Lookups are cyclic: any cursor, including a
//! negative one, maps into `0..len`.

use std::f64::consts::PI;

/// Cyclic index of `cursor` into a table of `len` entries.
///
/// `len` must be non-zero.
#[inline]
pub fn cyclic_index(cursor: i64, len: usize) -> usize {
    cursor.rem_euclid(len as i64) as usize
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistortionTable {
    values: Vec<f64>,
}

impl DistortionTable {
    pub fn builder() -> DistortionTableBuilder {
        DistortionTableBuilder { values: Vec::new() }
    }

    /// Line-wobble table for the logo: 600 entries in five segments.
    pub fn logo() -> Self {
        Self::builder()
            // gentle
            .segment(200, |i| 50.0 * (i * 0.05).sin())
            // variation
            .segment(100, |i| 30.0 * (i * 0.1).sin() + 20.0 * (i * 0.07).cos())
            .segment(150, |i| 40.0 * (i * 0.03).sin())
            // calm
            .segment(100, |i| 20.0 * (i * 0.08).sin())
            // near zero
            .segment(50, |i| 10.0 * (i * 0.1).sin())
            .build()
    }

    /// Horizontal wave table for the scroll text: 577 entries in three
    /// segments with steps given in degrees.
    pub fn scroll_wave() -> Self {
        let deg = |d: f64| d / 180.0 * PI;
        Self::builder()
            .segment(389, move |i| 20.0 * (i * deg(7.0)).sin() + 30.0 * (i * deg(3.0)).cos())
            .segment(120, move |i| 4.0 * (i * deg(72.0)).sin())
            .segment(68, move |i| 40.0 * (i * deg(8.0)).sin())
            .build()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Offset at `cursor`, wrapping cyclically. An empty table reads as 0.
    pub fn get(&self, cursor: i64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values[cyclic_index(cursor, self.values.len())]
    }
}

/// Appends segments in order; each segment closure receives the index
/// within its own segment as `f64`.
#[derive(Debug, Default)]
pub struct DistortionTableBuilder {
    values: Vec<f64>,
}

impl DistortionTableBuilder {
    pub fn segment(mut self, len: usize, wave: impl Fn(f64) -> f64) -> Self {
        self.values.extend((0..len).map(|i| wave(i as f64)));
        self
    }

    pub fn build(self) -> DistortionTable {
        DistortionTable {
            values: self.values,
        }
    }
}
