//! YM chiptune playback: the YM2149 replayer behind a chip engine seam and a
//! pull-based stereo PCM stream for host audio output.
//!
//! # Invariants
//! - Every engine access goes through the decoder's single lock.
//! - Volume scaling happens after synthesis and never touches engine state.
//! - A non-looping stream ends by zero-filling, never by an error.
//! - Closing is idempotent; pulling a closed stream is `AudioError::Closed`.

pub mod decoder;
pub mod engine;
pub mod error;
pub mod output;
pub mod reader;

pub use decoder::{AudioStreamDecoder, Pulled};
pub use engine::{ChipEngine, TrackInfo, YmEngine};
pub use error::{AudioError, TrackError};
pub use output::AudioOutput;
pub use reader::PcmReader;

pub fn crate_info() -> &'static str {
    "oldskool-audio v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("audio"));
    }

    #[test]
    fn track_info_serializes() {
        let data = crate::engine::tests::tone_track(10);
        let engine = YmEngine::load(&data, 44_100).unwrap();
        let json = serde_json::to_value(engine.info()).unwrap();
        assert_eq!(json["frames"], 10);
        assert_eq!(json["player_rate"], 50);
        assert_eq!(json["duration_ms"], 200);
    }
}
