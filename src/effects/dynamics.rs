//! Feed-forward dynamics processing (compressor / limiter)

use super::{RenderContext, Stage};
use crate::audio::dsp::{db_to_linear, linear_to_db, time_constant_coef};
use crate::{audio::SampleBuffer, Result};

/// Static and temporal parameters of a dynamics stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsParams {
    /// Level (dBFS) where gain reduction starts
    pub threshold_db: f32,
    /// Width of the soft knee above the threshold (dB)
    pub knee_db: f32,
    /// Input/output slope above the knee
    pub ratio: f32,
    /// Attack time constant (seconds)
    pub attack: f32,
    /// Release time constant (seconds)
    pub release: f32,
}

impl DynamicsParams {
    /// Output level (dB) for a steady input level (dB)
    ///
    /// Quadratic knee over `[threshold, threshold + knee]`, straight line of
    /// slope `1 / ratio` above it.
    pub fn static_curve(&self, level_db: f32) -> f32 {
        let t = self.threshold_db;
        let w = self.knee_db.max(0.0);
        let slope = 1.0 / self.ratio;

        if level_db <= t {
            level_db
        } else if level_db < t + w {
            let over = level_db - t;
            level_db + (slope - 1.0) * over * over / (2.0 * w)
        } else {
            t + 0.5 * w * (1.0 + slope) + (level_db - t - w) * slope
        }
    }

    /// Gain change (dB, never positive) applied at a given detector level
    pub fn gain_db(&self, level_db: f32) -> f32 {
        (self.static_curve(level_db) - level_db).min(0.0)
    }
}

/// Channel-linked peak compressor
///
/// With `ceiling` set the stage also hard-clips its output to that
/// amplitude, which turns a high-ratio zero-attack setting into a limiter.
#[derive(Debug, Clone, Copy)]
pub struct Dynamics {
    name: &'static str,
    params: DynamicsParams,
    ceiling: Option<f32>,
}

impl Dynamics {
    pub fn compressor(params: DynamicsParams) -> Self {
        Self {
            name: "compressor",
            params,
            ceiling: None,
        }
    }

    pub fn limiter(params: DynamicsParams, ceiling: f32) -> Self {
        Self {
            name: "limiter",
            params,
            ceiling: Some(ceiling),
        }
    }

    pub fn params(&self) -> &DynamicsParams {
        &self.params
    }
}

impl Stage for Dynamics {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, ctx: &RenderContext, input: &SampleBuffer) -> Result<SampleBuffer> {
        let attack = time_constant_coef(self.params.attack, ctx.sample_rate);
        let release = time_constant_coef(self.params.release, ctx.sample_rate);
        let frames = input.frame_count();
        let source = input.channels();

        let mut output = vec![Vec::with_capacity(frames); source.len()];
        let mut envelope = 0.0f32;

        for i in 0..frames {
            let level = source.iter().map(|c| c[i].abs()).fold(0.0f32, f32::max);
            let coef = if level > envelope { attack } else { release };
            envelope = coef * envelope + (1.0 - coef) * level;

            let gain = db_to_linear(self.params.gain_db(linear_to_db(envelope)));

            for (c, channel) in source.iter().enumerate() {
                let mut y = channel[i] * gain;
                if let Some(ceiling) = self.ceiling {
                    y = y.clamp(-ceiling, ceiling);
                }
                output[c].push(y);
            }
        }

        Ok(SampleBuffer::from_channels(output, input.sample_rate()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITER: DynamicsParams = DynamicsParams {
        threshold_db: -1.0,
        knee_db: 0.0,
        ratio: 20.0,
        attack: 0.0,
        release: 0.1,
    };

    fn ctx_for(buf: &SampleBuffer) -> RenderContext {
        RenderContext {
            sample_rate: buf.sample_rate(),
            channel_count: buf.channel_count(),
            frame_count: buf.frame_count(),
        }
    }

    #[test]
    fn test_static_curve_hard_knee() {
        assert_eq!(LIMITER.static_curve(-6.0), -6.0);
        assert!((LIMITER.static_curve(0.0) - (-0.95)).abs() < 1e-5);
        assert!((LIMITER.static_curve(19.0) - 0.0).abs() < 1e-5);
    }

    #[test]
    fn test_static_curve_soft_knee_is_continuous() {
        let p = DynamicsParams {
            threshold_db: -18.0,
            knee_db: 30.0,
            ratio: 4.0,
            attack: 0.003,
            release: 0.25,
        };
        let eps = 1e-3;
        for edge in [-18.0f32, 12.0] {
            let below = p.static_curve(edge - eps);
            let above = p.static_curve(edge + eps);
            assert!((below - above).abs() < 1e-2, "discontinuity at {}", edge);
        }
        // Above the knee the slope is 1/ratio
        let slope = p.static_curve(30.0) - p.static_curve(29.0);
        assert!((slope - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_gain_is_never_positive() {
        for db in [-100.0f32, -30.0, -18.0, -5.0, 0.0, 6.0] {
            assert!(LIMITER.gain_db(db) <= 0.0);
        }
    }

    #[test]
    fn test_limiter_caps_full_scale() {
        let buf = SampleBuffer::mono(vec![1.0, -1.0, 1.0, -1.0, 1.0], 24000);
        let out = Dynamics::limiter(LIMITER, 1.0).process(&ctx_for(&buf), &buf).unwrap();
        let expected = db_to_linear(-0.95);
        for &s in out.channel(0) {
            assert!(s.abs() <= expected + 1e-5, "{} over ceiling", s);
        }
    }

    #[test]
    fn test_limiter_hard_clips_extreme_input() {
        let buf = SampleBuffer::mono(vec![50.0, -50.0], 24000);
        let out = Dynamics::limiter(LIMITER, 1.0).process(&ctx_for(&buf), &buf).unwrap();
        assert!(out.peak() <= 1.0);
    }

    #[test]
    fn test_quiet_signal_passes_unchanged() {
        let samples: Vec<f32> = (0..480).map(|i| 0.3 * (i as f32 * 0.05).sin()).collect();
        let buf = SampleBuffer::mono(samples.clone(), 24000);
        let out = Dynamics::limiter(LIMITER, 1.0).process(&ctx_for(&buf), &buf).unwrap();
        for (a, b) in samples.iter().zip(out.channel(0)) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_linked_detection_applies_same_gain() {
        let buf = SampleBuffer::from_channels(vec![vec![1.0; 8], vec![0.1; 8]], 24000);
        let out = Dynamics::limiter(LIMITER, 1.0).process(&ctx_for(&buf), &buf).unwrap();
        let ratio = out.channel(1)[7] / out.channel(0)[7];
        assert!((ratio - 0.1).abs() < 1e-5);
    }
}
