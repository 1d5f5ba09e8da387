//! recap-audio - narration post-production in Rust
//!
//! Takes synthesized speech delivered as base64 16-bit PCM, changes its
//! playback speed (or fits it to a target duration), runs a fixed mastering
//! chain, writes a canonical WAV container, and times SRT captions against
//! the rendered length.
//!
//! # Pipeline
//! 1. [`audio::pcm`] - base64 -> bytes -> planar [`audio::SampleBuffer`]
//! 2. [`effects`] - playback-rate stretch, compressor, EQ, limiter
//! 3. [`audio::wav`] - 44-byte header + little-endian `i16` samples
//! 4. [`text`] - script cleanup, sentence split, proportional timing
//!
//! # Example
//! ```no_run
//! use recap_audio::{Config, RecapPipeline};
//!
//! let pipeline = RecapPipeline::new(Config::default()).unwrap();
//! let blob = std::fs::read_to_string("narration.b64").unwrap();
//! let out = pipeline.process(&blob, "Hello. World!").unwrap();
//! out.audio.save_to(".").unwrap();
//! ```

// Traditional index loops read better for per-frame DSP
#![allow(clippy::needless_range_loop)]

pub mod audio;
pub mod config;
pub mod effects;
pub mod error;
pub mod pipeline;
pub mod text;

pub use audio::SampleBuffer;
pub use config::Config;
pub use effects::{render, render_async, EffectsConfig, MasteringPreset};
pub use error::{Error, Result};
pub use pipeline::{Artifact, RecapOutput, RecapPipeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sample rate of the narration collaborator's PCM
pub const SAMPLE_RATE: u32 = 24000;

/// Channel count of the narration collaborator's PCM
pub const CHANNELS: usize = 1;
