//! Narration post-production pipeline
//!
//! Sequences decode -> render -> (encode, subtitles) and packages the
//! results as downloadable artifacts.

mod recap;

pub use recap::{RecapOutput, RecapPipeline};

use crate::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Filename stem used when no title is set
pub const DEFAULT_TITLE: &str = "recap";

/// MIME type of the audio artifact
pub const WAV_MIME: &str = "audio/wav";

/// MIME type of the subtitle artifact
pub const SRT_MIME: &str = "text/plain";

/// Speeds outside this range are accepted but logged
const COMFORTABLE_SPEED: (f64, f64) = (0.5, 2.0);

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Pipeline stage enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Decode,
    Render,
    Encode,
    Subtitles,
}

impl PipelineStage {
    /// Get stage name
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Decode => "Decode",
            PipelineStage::Render => "Render",
            PipelineStage::Encode => "Encode",
            PipelineStage::Subtitles => "Subtitles",
        }
    }

    /// Get all stages in order
    pub fn all() -> Vec<PipelineStage> {
        vec![
            PipelineStage::Decode,
            PipelineStage::Render,
            PipelineStage::Encode,
            PipelineStage::Subtitles,
        ]
    }
}

/// A finished, downloadable output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn wav(title: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: artifact_filename(title, "wav"),
            mime_type: WAV_MIME,
            bytes,
        }
    }

    pub fn srt(title: &str, text: String) -> Self {
        Self {
            filename: artifact_filename(title, "srt"),
            mime_type: SRT_MIME,
            bytes: text.into_bytes(),
        }
    }

    /// Write the artifact into `dir` under its own filename
    pub fn save_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Derive a download filename from a user title
///
/// Whitespace runs become a single `_`; only an empty title falls back to
/// [`DEFAULT_TITLE`], so an all-whitespace title yields `_`.
pub fn artifact_filename(title: &str, extension: &str) -> String {
    let stem = if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        WHITESPACE_RUN.replace_all(title, "_").into_owned()
    };
    format!("{}.{}", stem, extension)
}

/// Pick the playback speed for a render
///
/// With a sync target the narration is stretched to last exactly that long
/// (`source / target`), overriding the configured speed.
pub fn resolve_speed(configured: f64, source_duration: f64, target_duration: Option<f64>) -> f64 {
    let speed = match target_duration {
        Some(target) if target > 0.0 && source_duration > 0.0 => {
            let speed = source_duration / target;
            log::info!(
                "Syncing {:.2}s of narration to {:.2}s (speed {:.3})",
                source_duration,
                target,
                speed
            );
            speed
        }
        _ => configured,
    };

    if speed < COMFORTABLE_SPEED.0 || speed > COMFORTABLE_SPEED.1 {
        log::warn!("Speed {:.3} is outside the usual narration range", speed);
    }

    speed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_filename() {
        assert_eq!(artifact_filename("My  Movie\tRecap", "wav"), "My_Movie_Recap.wav");
        assert_eq!(artifact_filename("", "srt"), "recap.srt");
        assert_eq!(artifact_filename(" \t ", "wav"), "_.wav");
        assert_eq!(artifact_filename("ဇာတ်လမ်း အကျဉ်း", "srt"), "ဇာတ်လမ်း_အကျဉ်း.srt");
    }

    #[test]
    fn test_artifact_mime_types() {
        assert_eq!(Artifact::wav("a", vec![]).mime_type, "audio/wav");
        let srt = Artifact::srt("a b", "1\n".into());
        assert_eq!(srt.mime_type, "text/plain");
        assert_eq!(srt.filename, "a_b.srt");
        assert_eq!(srt.bytes, b"1\n");
    }

    #[test]
    fn test_resolve_speed() {
        assert_eq!(resolve_speed(1.05, 10.0, None), 1.05);
        assert!((resolve_speed(1.05, 12.0, Some(10.0)) - 1.2).abs() < 1e-12);
        // Unusable targets keep the configured speed
        assert_eq!(resolve_speed(0.9, 10.0, Some(0.0)), 0.9);
        assert_eq!(resolve_speed(0.9, 0.0, Some(5.0)), 0.9);
    }

    #[test]
    fn test_stage_order() {
        let names: Vec<_> = PipelineStage::all().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Decode", "Render", "Encode", "Subtitles"]);
    }
}
