//! Playback-rate time stretch
//!
//! Reads the source at `speed` input frames per output frame with linear
//! interpolation. Pitch moves with the rate; there is no correction.

use super::{RenderContext, Stage};
use crate::{audio::SampleBuffer, Result};

/// Varispeed source feeding the rest of the chain
#[derive(Debug, Clone, Copy)]
pub struct PlaybackRate {
    speed: f64,
}

impl PlaybackRate {
    pub fn new(speed: f64) -> Self {
        Self { speed }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
}

/// Resample one channel at a fixed playback rate into `out_len` frames
///
/// Positions past the last source frame render as silence.
pub fn stretch_channel(input: &[f32], speed: f64, out_len: usize) -> Vec<f32> {
    let n = input.len();
    let mut output = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 * speed;
        let idx = pos.floor() as usize;
        if idx >= n {
            output.push(0.0);
            continue;
        }

        let frac = (pos - idx as f64) as f32;
        let current = input[idx];
        if frac == 0.0 {
            output.push(current);
            continue;
        }

        let next = if idx + 1 < n { input[idx + 1] } else { current };
        output.push(current + (next - current) * frac);
    }

    output
}

impl Stage for PlaybackRate {
    fn name(&self) -> &'static str {
        "playback-rate"
    }

    fn process(&self, ctx: &RenderContext, input: &SampleBuffer) -> Result<SampleBuffer> {
        use rayon::prelude::*;

        let channels: Vec<Vec<f32>> = input
            .channels()
            .par_iter()
            .map(|c| stretch_channel(c, self.speed, ctx.frame_count))
            .collect();

        Ok(SampleBuffer::from_channels(channels, ctx.sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_speed_is_identity() {
        let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin()).collect();
        assert_eq!(stretch_channel(&input, 1.0, input.len()), input);
    }

    #[test]
    fn test_double_speed_skips_frames() {
        let input = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(stretch_channel(&input, 2.0, 3), vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_half_speed_interpolates() {
        let input = vec![0.0, 1.0, 0.0];
        let out = stretch_channel(&input, 0.5, 6);
        assert_eq!(out, vec![0.0, 0.5, 1.0, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_past_end_is_silence() {
        let input = vec![0.5; 4];
        let out = stretch_channel(&input, 1.0, 8);
        assert_eq!(&out[..4], &[0.5; 4]);
        assert_eq!(&out[4..], &[0.0; 4]);
    }
}
