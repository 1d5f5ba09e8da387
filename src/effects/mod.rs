//! Effects / mastering engine
//!
//! A render is an explicit, ordered list of buffer-to-buffer stages:
//!
//! ```text
//! playback-rate -> [compressor -> clarity shelf -> body peak] -> limiter
//! ```
//!
//! The bracketed stages only run when mastering is enabled. The limiter
//! always runs. Every call builds its own [`RenderContext`] and stage list,
//! so concurrent renders share nothing.

pub mod biquad;
pub mod dynamics;
pub mod stretch;

pub use biquad::{Biquad, BiquadCoefficients, FilterKind};
pub use dynamics::{Dynamics, DynamicsParams};
pub use stretch::PlaybackRate;

use crate::{
    audio::{wav::WAV_HEADER_LEN, SampleBuffer},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Fixed mastering chain settings
pub struct MasteringPreset;

impl MasteringPreset {
    pub const COMPRESSOR: DynamicsParams = DynamicsParams {
        threshold_db: -18.0,
        knee_db: 30.0,
        ratio: 4.0,
        attack: 0.003,
        release: 0.25,
    };

    pub const CLARITY_SHELF: FilterKind = FilterKind::HighShelf {
        frequency: 5000.0,
        gain_db: 4.0,
    };

    pub const BODY_PEAK: FilterKind = FilterKind::Peaking {
        frequency: 200.0,
        q: 0.5,
        gain_db: 2.0,
    };

    pub const LIMITER: DynamicsParams = DynamicsParams {
        threshold_db: -1.0,
        knee_db: 0.0,
        ratio: 20.0,
        attack: 0.0,
        release: 0.1,
    };

    /// Absolute peak the limiter lets through (0 dBFS)
    pub const LIMITER_CEILING: f32 = 1.0;
}

/// Per-render effect settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectsConfig {
    /// Playback-rate ratio (>1 is faster and shorter)
    pub speed: f64,
    /// Run compressor + EQ before the limiter
    pub mastering_enabled: bool,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            speed: 1.05,
            mastering_enabled: true,
        }
    }
}

impl EffectsConfig {
    pub fn new(speed: f64, mastering_enabled: bool) -> Self {
        Self {
            speed,
            mastering_enabled,
        }
    }

    /// Speed 1.0 with mastering off
    pub fn transparent() -> Self {
        Self::new(1.0, false)
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_mastering(mut self, enable: bool) -> Self {
        self.mastering_enabled = enable;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(Error::Render(format!(
                "speed must be a positive finite number, got {}",
                self.speed
            )));
        }
        Ok(())
    }

    /// Frames produced when rendering `input_frames` at this speed
    ///
    /// Fails when the stretched length would not fit a WAV container of
    /// `channel_count` channels (data plus header above `u32::MAX` bytes).
    pub fn output_frame_count(&self, input_frames: usize, channel_count: usize) -> Result<usize> {
        let frames = (input_frames as f64 / self.speed).ceil();
        let bytes_per_frame = channel_count.max(1) * 2;
        let max_frames = (u32::MAX as usize - WAV_HEADER_LEN) / bytes_per_frame;

        if !frames.is_finite() || frames > max_frames as f64 {
            return Err(Error::Render(format!(
                "speed {} stretches {} frames beyond the {}-frame container limit",
                self.speed, input_frames, max_frames
            )));
        }
        Ok(frames as usize)
    }
}

/// Shape of the buffer a render produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub sample_rate: u32,
    pub channel_count: usize,
    /// Output length in frames
    pub frame_count: usize,
}

impl RenderContext {
    pub fn new(input: &SampleBuffer, config: &EffectsConfig) -> Result<Self> {
        Ok(Self {
            sample_rate: input.sample_rate(),
            channel_count: input.channel_count(),
            frame_count: config.output_frame_count(input.frame_count(), input.channel_count())?,
        })
    }
}

/// One pure step of the render chain
pub trait Stage: Send + Sync {
    /// Stage name for logging
    fn name(&self) -> &'static str;

    /// Produce a new buffer from `input`
    fn process(&self, ctx: &RenderContext, input: &SampleBuffer) -> Result<SampleBuffer>;
}

/// Assemble the ordered stage list for a configuration
pub fn build_chain(config: &EffectsConfig) -> Vec<Box<dyn Stage>> {
    let mut chain: Vec<Box<dyn Stage>> = vec![Box::new(PlaybackRate::new(config.speed))];

    if config.mastering_enabled {
        chain.push(Box::new(Dynamics::compressor(MasteringPreset::COMPRESSOR)));
        chain.push(Box::new(Biquad::new("clarity-shelf", MasteringPreset::CLARITY_SHELF)));
        chain.push(Box::new(Biquad::new("body-peak", MasteringPreset::BODY_PEAK)));
    }

    chain.push(Box::new(Dynamics::limiter(
        MasteringPreset::LIMITER,
        MasteringPreset::LIMITER_CEILING,
    )));

    chain
}

/// Render `input` through speed change and mastering
///
/// Either returns a complete buffer of `ceil(frames / speed)` frames or a
/// [`Error::Render`]; nothing partial escapes.
pub fn render(input: &SampleBuffer, config: &EffectsConfig) -> Result<SampleBuffer> {
    config.validate()?;

    let start = Instant::now();
    let ctx = RenderContext::new(input, config)?;
    let chain = build_chain(config);

    log::debug!(
        "Rendering {} -> {} frames at speed {:.3} (mastering: {})",
        input.frame_count(),
        ctx.frame_count,
        config.speed,
        config.mastering_enabled
    );

    let mut current = chain[0].process(&ctx, input)?;
    for stage in &chain[1..] {
        current = stage.process(&ctx, &current)?;
        log::trace!("Stage {} done", stage.name());
    }

    verify_output(&ctx, &current)?;

    log::debug!("Render finished in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    Ok(current)
}

fn verify_output(ctx: &RenderContext, output: &SampleBuffer) -> Result<()> {
    if output.frame_count() != ctx.frame_count || output.channel_count() != ctx.channel_count {
        return Err(Error::Render(format!(
            "rendered {}x{} frames, expected {}x{}",
            output.channel_count(),
            output.frame_count(),
            ctx.channel_count,
            ctx.frame_count
        )));
    }

    for (c, channel) in output.channels().iter().enumerate() {
        if let Some(i) = channel.iter().position(|s| !s.is_finite()) {
            return Err(Error::Render(format!(
                "non-finite sample at frame {} of channel {}",
                i, c
            )));
        }
    }

    Ok(())
}

/// Awaitable render; runs on the blocking pool
pub async fn render_async(input: SampleBuffer, config: EffectsConfig) -> Result<SampleBuffer> {
    tokio::task::spawn_blocking(move || render(&input, &config))
        .await
        .map_err(|e| Error::Render(format!("render task failed: {}", e)))?
}

/// Render several independent clips in parallel
pub fn render_batch(inputs: &[SampleBuffer], config: &EffectsConfig) -> Vec<Result<SampleBuffer>> {
    use rayon::prelude::*;

    inputs.par_iter().map(|input| render(input, config)).collect()
}
