//! Host audio output using cpal, pulling straight from the shared decoder.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error, info};

use crate::decoder::AudioStreamDecoder;
use crate::error::AudioError;

/// Plays an [`AudioStreamDecoder`] on the default output device.
pub struct AudioOutput {
    decoder: Arc<AudioStreamDecoder>,
    playing: Arc<AtomicBool>,
    /// Keeps the device stream alive.
    stream: cpal::Stream,
    channels: u16,
}

impl AudioOutput {
    /// Open the default device at the decoder's sample rate. The stream
    /// starts paused.
    pub fn open(decoder: Arc<AudioStreamDecoder>, gain: f32) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Output("no audio output device available".into()))?;
        let default = device
            .default_output_config()
            .map_err(|e| AudioError::Output(format!("failed to get default output config: {e}")))?;

        let channels = default.channels().max(1);
        let config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(decoder.sample_rate()),
            buffer_size: cpal::BufferSize::Default,
        };
        let playing = Arc::new(AtomicBool::new(false));
        let mut feed = Feed {
            decoder: Arc::clone(&decoder),
            playing: Arc::clone(&playing),
            stereo: Vec::new(),
            mixed: Vec::new(),
            channels: channels as usize,
            gain,
            drained: false,
        };

        let stream = match default.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    data.copy_from_slice(feed.render(data.len()));
                },
                |err| error!("Audio stream error: {}", err),
                None,
            ),
            cpal::SampleFormat::I16 => device.build_output_stream(
                &config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    let len = data.len();
                    for (out, &f) in data.iter_mut().zip(feed.render(len)) {
                        *out = (f * 32767.0).clamp(-32768.0, 32767.0) as i16;
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            ),
            cpal::SampleFormat::U16 => device.build_output_stream(
                &config,
                move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                    let len = data.len();
                    for (out, &f) in data.iter_mut().zip(feed.render(len)) {
                        *out = (f * 32767.0 + 32768.0).clamp(0.0, 65535.0) as u16;
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            ),
            other => {
                return Err(AudioError::Output(format!(
                    "unsupported sample format: {other:?}"
                )));
            }
        }
        .map_err(|e| AudioError::Output(format!("failed to build audio stream: {e}")))?;

        // some backends start immediately
        stream
            .pause()
            .map_err(|e| AudioError::Output(format!("failed to pause audio stream: {e}")))?;

        info!(
            channels,
            sample_rate = decoder.sample_rate(),
            format = ?default.sample_format(),
            "audio output opened"
        );
        Ok(Self {
            decoder,
            playing,
            stream,
            channels,
        })
    }

    pub fn play(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::Output(format!("failed to play audio stream: {e}")))?;
        self.playing.store(true, Ordering::Release);
        debug!("Audio stream started");
        Ok(())
    }

    pub fn pause(&self) -> Result<(), AudioError> {
        self.playing.store(false, Ordering::Release);
        self.stream
            .pause()
            .map_err(|e| AudioError::Output(format!("failed to pause audio stream: {e}")))?;
        debug!("Audio stream paused");
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn decoder(&self) -> &Arc<AudioStreamDecoder> {
        &self.decoder
    }
}

/// State owned by the device callback.
struct Feed {
    decoder: Arc<AudioStreamDecoder>,
    playing: Arc<AtomicBool>,
    stereo: Vec<i16>,
    mixed: Vec<f32>,
    channels: usize,
    gain: f32,
    drained: bool,
}

impl Feed {
    /// Produce `len` interleaved device samples in `[-1, 1]`.
    fn render(&mut self, len: usize) -> &[f32] {
        self.mixed.clear();
        self.mixed.resize(len, 0.0);
        if !self.playing.load(Ordering::Acquire) || self.drained {
            return &self.mixed;
        }
        let frames = len / self.channels;
        self.stereo.clear();
        self.stereo.resize(frames * 2, 0);
        match self.decoder.pull_into(&mut self.stereo) {
            Ok(end) => self.drained = end,
            Err(_) => {
                // closed from the frame thread; play silence from now on
                self.drained = true;
                return &self.mixed;
            }
        }
        map_channels(&self.stereo, &mut self.mixed, self.channels, self.gain);
        &self.mixed
    }
}

/// Spread stereo frames over `channels` device channels: mono takes the
/// left sample, extra channels repeat left/right.
fn map_channels(stereo: &[i16], out: &mut [f32], channels: usize, gain: f32) {
    for (frame, dst) in stereo.chunks_exact(2).zip(out.chunks_exact_mut(channels)) {
        for (c, sample) in dst.iter_mut().enumerate() {
            *sample = frame[c % 2] as f32 / 32768.0 * gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_passes_through_with_gain() {
        let stereo = [16384i16, -16384, 0, 32767];
        let mut out = [9.0f32; 4];
        map_channels(&stereo, &mut out, 2, 1.0);
        assert_eq!(out[0], 0.5);
        assert_eq!(out[1], -0.5);
        assert_eq!(out[2], 0.0);
        let mut out = [0.0f32; 4];
        map_channels(&stereo, &mut out, 2, 0.5);
        assert_eq!(out[0], 0.25);
    }

    #[test]
    fn mono_device_takes_left() {
        let stereo = [100i16, 200, 300, 400];
        let mut out = [0.0f32; 2];
        map_channels(&stereo, &mut out, 1, 1.0);
        assert_eq!(out, [100.0 / 32768.0, 300.0 / 32768.0]);
    }

    #[test]
    fn surround_device_repeats_pair() {
        let stereo = [100i16, 200];
        let mut out = [0.0f32; 4];
        map_channels(&stereo, &mut out, 4, 1.0);
        let l = 100.0 / 32768.0;
        let r = 200.0 / 32768.0;
        assert_eq!(out, [l, r, l, r]);
    }

    #[test]
    fn feed_is_silent_until_playing_and_after_close() {
        use crate::decoder::tests::ConstEngine;
        let decoder = Arc::new(AudioStreamDecoder::with_engine(
            Box::new(ConstEngine::new(16384, usize::MAX)),
            44_100,
            true,
        ));
        let mut feed = Feed {
            decoder: Arc::clone(&decoder),
            playing: Arc::new(AtomicBool::new(false)),
            stereo: Vec::new(),
            mixed: Vec::new(),
            channels: 2,
            gain: 1.0,
            drained: false,
        };
        assert!(feed.render(8).iter().all(|&s| s == 0.0));
        assert_eq!(decoder.position(), 0);

        feed.playing.store(true, Ordering::Release);
        assert!(feed.render(8).iter().all(|&s| s == 0.5));
        assert_eq!(decoder.position(), 4);

        decoder.close();
        assert!(feed.render(8).iter().all(|&s| s == 0.0));
    }
}
