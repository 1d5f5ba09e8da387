//! Multi-channel sample buffer shared by every pipeline stage

use crate::{Error, Result};

/// Planar floating-point audio, samples nominally in [-1, 1]
///
/// Every channel holds exactly `frame_count` samples. Buffers are never
/// mutated after construction; each stage builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    frame_count: usize,
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Build a buffer from planar channel data
    ///
    /// # Panics
    /// If `sample_rate` is zero, `channels` is empty, or the channels differ
    /// in length. These are programming errors; use [`Self::try_from_channels`]
    /// for data of unknown shape.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        assert!(sample_rate > 0, "sample rate must be positive");
        assert!(!channels.is_empty(), "buffer needs at least one channel");
        let frame_count = channels[0].len();
        assert!(
            channels.iter().all(|c| c.len() == frame_count),
            "all channels must have the same frame count"
        );

        Self {
            sample_rate,
            frame_count,
            channels,
        }
    }

    /// Fallible variant of [`Self::from_channels`]
    pub fn try_from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidFormat("sample rate must be > 0".into()));
        }
        let Some(first) = channels.first() else {
            return Err(Error::InvalidFormat("buffer needs at least one channel".into()));
        };
        let frame_count = first.len();
        if let Some((idx, c)) = channels
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != frame_count)
        {
            return Err(Error::InvalidFormat(format!(
                "channel {} has {} frames, expected {}",
                idx,
                c.len(),
                frame_count
            )));
        }

        Ok(Self::from_channels(channels, sample_rate))
    }

    /// Mono buffer from a single sample vector
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::from_channels(vec![samples], sample_rate)
    }

    /// All-zero buffer
    pub fn silence(channel_count: usize, frame_count: usize, sample_rate: u32) -> Self {
        Self::from_channels(vec![vec![0.0; frame_count]; channel_count], sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels, in order
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.frame_count as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// Largest absolute sample value across all channels
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .map(|c| super::dsp::compute_peak(c))
            .fold(0.0f32, f32::max)
    }

    /// Loudest per-channel RMS level
    pub fn rms(&self) -> f32 {
        self.channels
            .iter()
            .map(|c| super::dsp::compute_rms(c))
            .fold(0.0f32, f32::max)
    }

    /// Interleave into frame-major order (frame 0 ch 0, frame 0 ch 1, ...)
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frame_count * self.channel_count());
        for i in 0..self.frame_count {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }
}
