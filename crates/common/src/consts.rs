//! Fixed configuration constants.
//!
//! These are part of the look of the demo and are deliberately not
//! runtime-configurable. Rates are per Update tick (the host ticks at
//! [`TICK_RATE_HZ`]).

/// Logical output frame delivered to the host.
pub const SCREEN_WIDTH: u32 = 768;
pub const SCREEN_HEIGHT: u32 = 540;

/// Main effect canvas, centred inside the output frame.
pub const CANVAS_WIDTH: u32 = 640;
pub const CANVAS_HEIGHT: u32 = 400;
pub const CANVAS_OFFSET_X: i32 = 64;
pub const CANVAS_OFFSET_Y: i32 = 70;

/// Host tick frequency.
pub const TICK_RATE_HZ: f64 = 60.0;

pub const FADE_SPEED: f64 = 0.03;
pub const PLASMA_SPEED: f64 = 0.02;
pub const SPIRAL_SPEED: f64 = 0.02;
/// Per-axis cube rotation increments (radians per tick).
pub const CUBE_ROTATION_SPEED: [f64; 3] = [0.02, 0.03, 0.01];

/// Bitmap font glyph height in atlas pixels.
pub const GLYPH_HEIGHT: u32 = 36;
/// Advance used for characters missing from the font atlas.
pub const MISSING_GLYPH_WIDTH: u32 = 32;
pub const INTRO_FONT_SCALE: f64 = 2.0;
pub const DEMO_FONT_SCALE: f64 = 1.5;

/// Intro strip shift per tick, in output pixels.
pub const INTRO_SCROLL_STEP: i32 = 6;
/// Intro CRT shader clock increment per intro tick.
pub const INTRO_SHADER_STEP: f64 = 0.016;

/// Main scroller: strip is this much wider than the canvas.
pub const SCROLL_STRIP_EXTRA: u32 = 512;
pub const SCROLL_STEP: f64 = 2.0;
pub const SCROLL_WAVE_STEP: f64 = 0.5;

/// Audio output sample rate.
pub const SAMPLE_RATE: u32 = 44_100;
/// Mono samples decoded from the chip engine per chunk.
pub const DECODE_CHUNK: usize = 4096;
/// Playback gain the host applies on top of the decoder volume.
pub const HOST_PLAYBACK_VOLUME: f32 = 0.7;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_fits_inside_screen() {
        assert!(CANVAS_OFFSET_X as u32 + CANVAS_WIDTH <= SCREEN_WIDTH);
        assert!(CANVAS_OFFSET_Y as u32 + CANVAS_HEIGHT <= SCREEN_HEIGHT);
    }
}
