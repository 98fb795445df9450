//! Shared types for the oldskool engine: RGBA canvases, blits, textured
//! triangle rasterization and the fixed configuration constants.
//!
//! # Invariants
//! - Canvases are plain row-major RGBA8 buffers; nothing here touches a GPU.
//! - Every drawing operation clips against the destination and never panics
//!   on out-of-range geometry.

pub mod canvas;
pub mod consts;
pub mod types;

pub use canvas::{Canvas, DrawOptions, TexturedVertex};
pub use types::{Rect, Rgba};

pub fn crate_info() -> &'static str {
    "oldskool-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
