//! CPU effect layers and the frame compositor.
//!
//! # Invariants
//! - Layer state only changes in `advance`; drawing reads it.
//! - Plasma and cube canvases are cleared before every redraw.
//! - Distortion tables are built once and never mutated.
//! - All cyclic lookups wrap with euclidean remainder.
//! - Composition order is fixed: clear, plasma, cube, logo, scroller, spiral.

pub mod compositor;
pub mod cube;
pub mod distortion;
pub mod font;
pub mod intro;
pub mod logo;
pub mod plasma;
pub mod scene;
pub mod scroller;
pub mod spiral;

use oldskool_common::Canvas;

pub use compositor::{CompositeStep, Compositor, SceneLayers};
pub use cube::{CubeRenderer, Face, Projection, RotationState, Vector3};
pub use distortion::{DistortionTable, cyclic_index};
pub use font::{BitmapFont, Glyph};
pub use intro::IntroScroller;
pub use logo::DistortedLogo;
pub use plasma::PlasmaField;
pub use scene::{MainScene, SceneImages};
pub use scroller::WaveScroller;
pub use spiral::LogoSpiral;

/// A layer that paints itself directly onto a target canvas.
pub trait Layer {
    fn draw(&self, target: &mut Canvas);
}

pub fn crate_info() -> &'static str {
    "oldskool-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
