use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;

use oldskool_common::consts::DECODE_CHUNK;

use crate::decoder::AudioStreamDecoder;

/// Byte view of an [`AudioStreamDecoder`]: interleaved stereo, signed
/// 16-bit little-endian.
#[derive(Debug)]
pub struct PcmReader {
    decoder: Arc<AudioStreamDecoder>,
    pending: Vec<u8>,
    offset: usize,
    consumed: u64,
    finished: bool,
}

impl PcmReader {
    pub fn new(decoder: Arc<AudioStreamDecoder>) -> Self {
        Self {
            decoder,
            pending: Vec::with_capacity(DECODE_CHUNK * 4),
            offset: 0,
            consumed: 0,
            finished: false,
        }
    }

    pub fn decoder(&self) -> &Arc<AudioStreamDecoder> {
        &self.decoder
    }

    /// Bytes handed out so far.
    pub fn byte_position(&self) -> u64 {
        self.consumed
    }

    fn refill(&mut self) -> io::Result<()> {
        let pulled = self.decoder.pull(DECODE_CHUNK).map_err(io::Error::other)?;
        self.pending.clear();
        for s in &pulled.samples {
            self.pending.extend_from_slice(&s.to_le_bytes());
        }
        self.offset = 0;
        self.finished = pulled.end_of_stream;
        Ok(())
    }
}

impl Read for PcmReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.offset >= self.pending.len() {
            if self.finished {
                return Ok(0);
            }
            self.refill()?;
        }
        let n = buf.len().min(self.pending.len() - self.offset);
        buf[..n].copy_from_slice(&self.pending[self.offset..self.offset + n]);
        self.offset += n;
        self.consumed += n as u64;
        Ok(n)
    }
}

impl Seek for PcmReader {
    /// The stream cannot move; every request reports the current position.
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        self.decoder.seek().map_err(io::Error::other)?;
        Ok(self.consumed)
    }
}
