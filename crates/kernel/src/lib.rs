//! Demo kernel: sequencing of the intro and main scene, and the
//! Update/Draw calling contract hosts drive.
//!
//! # Invariants
//! - Exactly one `update` per tick; `draw` never advances state.
//! - Effect rates are per tick; `dt` only feeds the demo clock.
//! - Asset and audio failures degrade; nothing here returns a fatal error.
//! - Teardown is idempotent and safe after partial initialization.

pub mod demo;
pub mod error;
pub mod timing;

pub use demo::{CrtBand, Demo, DemoEvent, DemoOptions, DemoStatus, Frame, Phase};
pub use error::EngineError;
pub use timing::FrameTimer;

pub fn crate_info() -> &'static str {
    "oldskool-kernel v0.1.0"
}
