/// Failures while loading a YM track.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TrackError {
    #[error("track data is empty")]
    Empty,
    #[error("bad LHA archive: {0}")]
    Archive(String),
    #[error("track load failed: {0}")]
    Parse(String),
    #[error("unsupported sample rate {requested} Hz (replayer renders at {native} Hz)")]
    SampleRate { requested: u32, native: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to load track: {0}")]
    Load(#[from] TrackError),
    #[error("audio stream is closed")]
    Closed,
    #[error("audio output error: {0}")]
    Output(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_wraps_track_error() {
        let err: AudioError = TrackError::Empty.into();
        assert!(matches!(err, AudioError::Load(TrackError::Empty)));
        assert_eq!(err.to_string(), "failed to load track: track data is empty");
    }
}
