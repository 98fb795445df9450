//! wgpu presentation backend for the demo.
//!
//! Takes the CPU-composited 768x540 frame, uploads it to a texture and draws
//! it letterboxed to the surface. While the intro runs, the marked band is
//! redrawn through the CRT post-process.
//!
//! # Invariants
//! - The presenter never mutates demo state.
//! - A missing CRT pipeline falls back to the plain blit, never to an error.

mod present;
mod shaders;

pub use present::{FramePresenter, PresentError, Viewport, fit_viewport};

pub fn crate_info() -> &'static str {
    "oldskool-render-wgpu v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render-wgpu"));
    }
}
