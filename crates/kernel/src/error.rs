use oldskool_assets::AssetError;
use oldskool_audio::AudioError;

/// Errors surfaced by the demo kernel.
///
/// Only [`EngineError::Fatal`] should ever stop a host; everything else is
/// reported and degraded around.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("fatal engine error: {0}")]
    Fatal(String),
}

impl EngineError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}
