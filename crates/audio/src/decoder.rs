//! Chunked stereo PCM stream over a [`ChipEngine`].

use std::sync::{Mutex, MutexGuard};

use oldskool_common::consts::DECODE_CHUNK;

use crate::engine::{ChipEngine, TrackInfo, YmEngine};
use crate::error::AudioError;

/// Result of one [`AudioStreamDecoder::pull`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pulled {
    /// Interleaved stereo samples, two per frame.
    pub samples: Vec<i16>,
    pub end_of_stream: bool,
}

struct DecoderState {
    engine: Option<Box<dyn ChipEngine>>,
    scratch: Vec<i16>,
    position: u64,
    volume: f64,
}

/// Serializes every engine access behind one lock so the audio callback
/// thread and the frame thread can share it.
pub struct AudioStreamDecoder {
    state: Mutex<DecoderState>,
    info: TrackInfo,
    sample_rate: u32,
    total_samples: u64,
    looping: bool,
}

impl std::fmt::Debug for AudioStreamDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStreamDecoder")
            .field("title", &self.info.title)
            .field("sample_rate", &self.sample_rate)
            .field("total_samples", &self.total_samples)
            .field("looping", &self.looping)
            .finish_non_exhaustive()
    }
}

impl AudioStreamDecoder {
    /// Parse a YM track and prepare it for streaming.
    pub fn new(data: &[u8], sample_rate: u32, looping: bool) -> Result<Self, AudioError> {
        let engine = YmEngine::load(data, sample_rate)?;
        Ok(Self::with_engine(Box::new(engine), sample_rate, looping))
    }

    pub fn with_engine(mut engine: Box<dyn ChipEngine>, sample_rate: u32, looping: bool) -> Self {
        engine.set_loop(looping);
        let info = engine.info();
        let total_samples = info.duration_ms * sample_rate as u64 / 1000;
        tracing::info!(
            title = %info.title,
            author = %info.author,
            duration_ms = info.duration_ms,
            looping,
            "audio stream ready"
        );
        Self {
            state: Mutex::new(DecoderState {
                engine: Some(engine),
                scratch: vec![0; DECODE_CHUNK],
                position: 0,
                volume: 1.0,
            }),
            info,
            sample_rate,
            total_samples,
            looping,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DecoderState> {
        // a panic inside the engine leaves plain data behind; keep streaming
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn info(&self) -> &TrackInfo {
        &self.info
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Mono samples produced so far.
    pub fn position(&self) -> u64 {
        self.lock().position
    }

    pub fn volume(&self) -> f64 {
        self.lock().volume
    }

    /// Set the output gain, clamped to `[0, 1]`. Engine state is untouched.
    pub fn set_volume(&self, volume: f64) {
        self.lock().volume = volume.clamp(0.0, 1.0);
    }

    /// Return exactly `frames` stereo frames.
    pub fn pull(&self, frames: usize) -> Result<Pulled, AudioError> {
        let mut samples = vec![0; frames * 2];
        let end_of_stream = self.pull_into(&mut samples)?;
        Ok(Pulled {
            samples,
            end_of_stream,
        })
    }

    /// Fill an interleaved stereo buffer. Returns `true` when the track ended
    /// without looping; everything after the end is zero.
    pub fn pull_into(&self, out: &mut [i16]) -> Result<bool, AudioError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let Some(engine) = state.engine.as_mut() else {
            return Err(AudioError::Closed);
        };
        let frames = out.len() / 2;
        let volume = state.volume;
        let mut processed = 0;
        let mut end_of_stream = false;

        while processed < frames {
            let chunk = (frames - processed).min(state.scratch.len());
            let buf = &mut state.scratch[..chunk];
            let more = engine.compute(buf);
            for (i, &s) in buf.iter().enumerate() {
                let v = (s as f64 * volume) as i16;
                out[(processed + i) * 2] = v;
                out[(processed + i) * 2 + 1] = v;
            }
            processed += chunk;
            state.position += chunk as u64;
            if !more && !self.looping {
                end_of_stream = true;
                break;
            }
        }
        out[processed * 2..].fill(0);
        if end_of_stream {
            tracing::debug!(position = state.position, "audio end of stream");
        }
        Ok(end_of_stream)
    }

    /// The engine cannot seek; reports the current position unchanged.
    pub fn seek(&self) -> Result<u64, AudioError> {
        let state = self.lock();
        if state.engine.is_none() {
            return Err(AudioError::Closed);
        }
        Ok(state.position)
    }

    /// Release the engine. Safe to call more than once.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.engine.take().is_some() {
            tracing::debug!(title = %self.info.title, "audio stream closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().engine.is_none()
    }
}
