use serde::Serialize;
use ym2149_common::{ChiptunePlayer, ChiptunePlayerBase, MetadataFields};
use ym2149_ym_replayer::{Ym6Player, load_song};

use crate::error::TrackError;

/// Output rate of the YM replayer.
pub const REPLAYER_SAMPLE_RATE: u32 = 44_100;
/// Largest depacked track accepted from an LHA header.
pub const MAX_TRACK_BYTES: u32 = 16 * 1024 * 1024;

/// A synthesis engine rendering PCM from authored register data.
///
/// Engines are driven from one thread at a time; callers serialize access.
pub trait ChipEngine: Send {
    /// Fill `buf` with signed mono samples. Returns `false` once the track
    /// has ended without looping; the unfilled tail is zeroed.
    fn compute(&mut self, buf: &mut [i16]) -> bool;

    fn info(&self) -> TrackInfo;

    /// With looping on, the engine restarts at the loop point by itself.
    fn set_loop(&mut self, looping: bool);
}

/// Track metadata as reported to hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackInfo {
    pub title: String,
    pub author: String,
    pub comment: String,
    pub frames: usize,
    pub player_rate: u32,
    pub duration_ms: u64,
}

/// A YM track (YM2 through YM6, raw or LHA-packed) played through the
/// `ym2149` replayer.
pub struct YmEngine {
    player: Ym6Player,
    info: TrackInfo,
    total_samples: u64,
    produced: u64,
    scratch: Vec<f32>,
    looping: bool,
}

impl std::fmt::Debug for YmEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YmEngine")
            .field("info", &self.info)
            .field("produced", &self.produced)
            .field("looping", &self.looping)
            .finish_non_exhaustive()
    }
}

impl YmEngine {
    pub fn load(data: &[u8], sample_rate: u32) -> Result<Self, TrackError> {
        if sample_rate != REPLAYER_SAMPLE_RATE {
            return Err(TrackError::SampleRate {
                requested: sample_rate,
                native: REPLAYER_SAMPLE_RATE,
            });
        }
        if data.is_empty() {
            return Err(TrackError::Empty);
        }
        check_archive_header(data)?;

        let (mut player, summary) =
            load_song(data).map_err(|e| TrackError::Parse(e.to_string()))?;
        let samples_per_frame = summary.samples_per_frame.max(1);
        let frames = summary.frame_count;
        let total_samples = frames as u64 * samples_per_frame as u64;

        let meta = player.metadata();
        let info = TrackInfo {
            title: meta.title().to_string(),
            author: meta.author().to_string(),
            comment: meta.comments().to_string(),
            frames,
            player_rate: REPLAYER_SAMPLE_RATE / samples_per_frame,
            duration_ms: total_samples * 1000 / REPLAYER_SAMPLE_RATE as u64,
        };
        player.play();
        tracing::debug!(title = %info.title, frames, samples_per_frame, "YM track loaded");

        Ok(Self {
            player,
            info,
            total_samples,
            produced: 0,
            scratch: Vec::new(),
            looping: false,
        })
    }

    /// Mono samples rendered so far.
    pub fn produced(&self) -> u64 {
        self.produced
    }

    pub fn has_ended(&self) -> bool {
        !self.looping && self.produced >= self.total_samples
    }
}

impl ChipEngine for YmEngine {
    fn compute(&mut self, buf: &mut [i16]) -> bool {
        let live = if self.looping {
            buf.len()
        } else {
            let left = self.total_samples.saturating_sub(self.produced);
            buf.len().min(usize::try_from(left).unwrap_or(usize::MAX))
        };

        self.scratch.resize(live, 0.0);
        // the replayer wraps to the track's loop frame on its own
        self.player.generate_samples_into(&mut self.scratch);
        for (out, &s) in buf.iter_mut().zip(&self.scratch) {
            *out = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        }
        buf[live..].fill(0);
        self.produced += live as u64;

        if live < buf.len() || self.has_ended() {
            tracing::debug!(frames = self.info.frames, "track ended");
            return false;
        }
        true
    }

    fn info(&self) -> TrackInfo {
        self.info.clone()
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }
}

/// Sanity-check an LHA level-0 wrapper before depacking: the packed body must
/// be present in full and the declared size must stay within
/// [`MAX_TRACK_BYTES`]. Unwrapped tracks pass through.
pub fn check_archive_header(data: &[u8]) -> Result<(), TrackError> {
    if data.len() < 22 || &data[2..5] != b"-lh" || data[6] != b'-' {
        return Ok(());
    }
    let field = |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);
    let packed = field(7);
    let original = field(11);
    let body = data.len().saturating_sub(data[0] as usize + 2);

    if packed as usize > body {
        return Err(TrackError::Archive(format!(
            "packed size {packed} exceeds the {body} bytes present"
        )));
    }
    if original > MAX_TRACK_BYTES {
        return Err(TrackError::Archive(format!(
            "declared size {original} exceeds {MAX_TRACK_BYTES}"
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A YM3 file: 14 registers per frame, stored register by register.
    pub(crate) fn ym3_file(frames: &[[u8; 14]]) -> Vec<u8> {
        let mut data = b"YM3!".to_vec();
        for r in 0..14 {
            data.extend(frames.iter().map(|f| f[r]));
        }
        data
    }

    /// Channel A tone at full level.
    pub(crate) fn tone_track(frames: usize) -> Vec<u8> {
        let mut f = [0u8; 14];
        f[0] = 0x1c;
        f[1] = 0x01;
        f[7] = 0b0011_1110;
        f[8] = 0x0f;
        ym3_file(&vec![f; frames])
    }

    fn lha_header(packed: u32, original: u32, body: usize) -> Vec<u8> {
        let name = b"song.ym";
        let header_len = 22 + name.len();
        let mut data = vec![header_len as u8, 0];
        data.extend_from_slice(b"-lh5-");
        data.extend_from_slice(&packed.to_le_bytes());
        data.extend_from_slice(&original.to_le_bytes());
        data.extend_from_slice(&[0; 4]);
        data.extend_from_slice(&[0x20, 0x00]);
        data.push(name.len() as u8);
        data.extend_from_slice(name);
        data.extend_from_slice(&[0; 2]);
        data.resize(header_len + 2 + body, 0);
        data
    }

    #[test]
    fn info_from_summary() {
        let e = YmEngine::load(&tone_track(100), 44_100).unwrap();
        assert_eq!(e.info().frames, 100);
        assert_eq!(e.info().player_rate, 50);
        assert_eq!(e.info().duration_ms, 2000);
    }

    #[test]
    fn non_looping_track_ends_and_zero_fills() {
        let mut e = YmEngine::load(&tone_track(2), 44_100).unwrap();
        let mut buf = vec![1i16; 882 * 3];
        assert!(!e.compute(&mut buf));
        assert!(e.has_ended());
        assert!(buf[882 * 2..].iter().all(|&s| s == 0));
        assert!(buf[..882 * 2].iter().any(|&s| s != 0));

        let mut more = vec![1i16; 16];
        assert!(!e.compute(&mut more));
        assert!(more.iter().all(|&s| s == 0));
    }

    #[test]
    fn exact_length_pull_reports_end() {
        let mut e = YmEngine::load(&tone_track(1), 44_100).unwrap();
        let mut buf = vec![0i16; 882];
        assert!(!e.compute(&mut buf));
        assert_eq!(e.produced(), 882);
    }

    #[test]
    fn looping_track_keeps_playing() {
        let mut e = YmEngine::load(&tone_track(2), 44_100).unwrap();
        e.set_loop(true);
        let mut buf = vec![0i16; 882 * 5];
        assert!(e.compute(&mut buf));
        assert!(!e.has_ended());
        assert_eq!(e.produced(), 882 * 5);
    }

    #[test]
    fn rejects_foreign_sample_rate() {
        assert!(matches!(
            YmEngine::load(&tone_track(1), 48_000),
            Err(TrackError::SampleRate { requested: 48_000, .. })
        ));
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert_eq!(YmEngine::load(&[], 44_100).err(), Some(TrackError::Empty));
        assert!(matches!(
            YmEngine::load(b"not a track", 44_100),
            Err(TrackError::Parse(_))
        ));
    }

    #[test]
    fn oversized_archive_is_rejected_before_depacking() {
        let data = lha_header(3, 200_000_000, 3);
        assert!(matches!(check_archive_header(&data), Err(TrackError::Archive(_))));
        assert!(matches!(YmEngine::load(&data, 44_100), Err(TrackError::Archive(_))));
    }

    #[test]
    fn truncated_archive_is_rejected() {
        let data = lha_header(4096, 8192, 10);
        assert!(matches!(check_archive_header(&data), Err(TrackError::Archive(_))));
    }

    #[test]
    fn plausible_archive_header_passes() {
        assert!(check_archive_header(&lha_header(10, 5000, 10)).is_ok());
        assert!(check_archive_header(&tone_track(3)).is_ok());
    }
}
