//! Audio module for recap-audio
//!
//! Provides the planar sample buffer, base64 PCM decoding, the canonical WAV
//! container, file I/O, and small DSP helpers shared by the effects chain.

mod buffer;
pub mod dsp;
mod io;
pub mod pcm;
pub mod wav;

pub use buffer::SampleBuffer;
pub use dsp::{compute_peak, compute_rms, db_to_linear, linear_to_db};
pub use io::{load_wav, read_blob, save_wav};
pub use pcm::{decode, decode_blob, decode_to_sample_buffer};
pub use wav::{encode_wav, quantize_sample, read_wav_header, WavHeader};

use serde::{Deserialize, Serialize};

/// Shape of the PCM stream delivered by the narration collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Interleaved channel count
    pub channels: usize,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: crate::SAMPLE_RATE,
            channels: crate::CHANNELS,
        }
    }
}

impl PcmFormat {
    /// Decode a base64 blob in this format
    pub fn decode_blob(&self, blob: &str) -> crate::Result<SampleBuffer> {
        decode_blob(blob, self.sample_rate, self.channels)
    }
}
