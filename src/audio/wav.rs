//! Canonical RIFF/WAVE (16-bit integer PCM) serialization
//!
//! The layout is fixed: a 44-byte header followed by frame-major,
//! channel-minor little-endian `i16` samples.

use super::SampleBuffer;
use crate::{Error, Result};

/// Size of the canonical PCM header
pub const WAV_HEADER_LEN: usize = 44;

/// Only bit depth this container writes
pub const BITS_PER_SAMPLE: u16 = 16;

const FORMAT_PCM: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

/// Decoded fields of a canonical WAV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub riff_len: u32,
    pub format_tag: u16,
    pub channel_count: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

impl WavHeader {
    /// Number of frames described by the data chunk
    pub fn frame_count(&self) -> usize {
        if self.block_align == 0 {
            return 0;
        }
        self.data_len as usize / self.block_align as usize
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

/// Quantize one normalized sample to `i16`
///
/// Clamps to [-1, 1] first; negatives scale by 32768 and non-negatives by
/// 32767, truncating toward zero. NaN maps to 0.
pub fn quantize_sample(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    let s = sample.clamp(-1.0, 1.0);
    let scaled = if s < 0.0 { s * 32768.0 } else { s * 32767.0 };
    scaled as i16
}

/// Serialize a buffer into WAV container bytes
pub fn encode_wav(buffer: &SampleBuffer) -> Result<Vec<u8>> {
    let channel_count = buffer.channel_count();
    let frame_count = buffer.frame_count();

    let channels_u16 = u16::try_from(channel_count)
        .map_err(|_| Error::Encode(format!("{} channels exceed the WAV limit", channel_count)))?;
    let block_align = channels_u16
        .checked_mul(2)
        .ok_or_else(|| Error::Encode("block align overflows u16".into()))?;
    let byte_rate = buffer
        .sample_rate()
        .checked_mul(u32::from(block_align))
        .ok_or_else(|| Error::Encode("byte rate overflows u32".into()))?;

    let data_len = frame_count
        .checked_mul(block_align as usize)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| n.checked_add(WAV_HEADER_LEN as u32).is_some())
        .ok_or_else(|| Error::Encode(format!("{} frames exceed the RIFF size limit", frame_count)))?;
    let total_len = WAV_HEADER_LEN + data_len as usize;

    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&((total_len - 8) as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channels_u16.to_le_bytes());
    out.extend_from_slice(&buffer.sample_rate().to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    let channels = buffer.channels();
    for i in 0..frame_count {
        for channel in channels {
            out.extend_from_slice(&quantize_sample(channel[i]).to_le_bytes());
        }
    }

    debug_assert_eq!(out.len(), total_len);
    log::debug!(
        "Encoded {} frames x {} channel(s) into {} bytes",
        frame_count,
        channel_count,
        out.len()
    );

    Ok(out)
}

fn read_u16(bytes: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([bytes[pos], bytes[pos + 1]])
}

fn read_u32(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
}

/// Parse the canonical 44-byte header written by [`encode_wav`]
pub fn read_wav_header(bytes: &[u8]) -> Result<WavHeader> {
    if bytes.len() < WAV_HEADER_LEN {
        return Err(Error::InvalidFormat(format!(
            "WAV needs at least {} bytes, got {}",
            WAV_HEADER_LEN,
            bytes.len()
        )));
    }

    for (pos, magic) in [(0, b"RIFF"), (8, b"WAVE"), (12, b"fmt "), (36, b"data")] {
        if &bytes[pos..pos + 4] != magic {
            return Err(Error::InvalidFormat(format!(
                "expected {:?} at offset {}",
                String::from_utf8_lossy(magic),
                pos
            )));
        }
    }

    Ok(WavHeader {
        riff_len: read_u32(bytes, 4),
        format_tag: read_u16(bytes, 20),
        channel_count: read_u16(bytes, 22),
        sample_rate: read_u32(bytes, 24),
        byte_rate: read_u32(bytes, 28),
        block_align: read_u16(bytes, 32),
        bits_per_sample: read_u16(bytes, 34),
        data_len: read_u32(bytes, 40),
    })
}
