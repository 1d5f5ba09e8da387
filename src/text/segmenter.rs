//! Sentence segmentation and proportional subtitle timing

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// A run of non-terminators followed by any terminators (incl. Burmese `။`)
    static ref SEGMENT_REGEX: Regex = Regex::new(r"[^.!?\n။]+[.!?\n။]*").unwrap();
}

/// One caption cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSegment {
    /// 1-based cue number
    pub index: usize,
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds
    pub end_time: f64,
    pub text: String,
}

impl SubtitleSegment {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Split cleaned text into trimmed, non-empty sentence chunks
///
/// Terminators stay attached to the sentence they end. Text without any
/// sentence body is kept whole as a single chunk.
pub fn split_segments(text: &str) -> Vec<String> {
    let matches: Vec<&str> = SEGMENT_REGEX.find_iter(text).map(|m| m.as_str()).collect();
    let candidates = if matches.is_empty() { vec![text] } else { matches };

    candidates
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Spread `total_duration` over chunks in proportion to their length
///
/// Length is measured in UTF-16 code units, so a character outside the
/// Basic Multilingual Plane (most emoji) weighs two. Starts accumulate from zero and the last cue ends exactly at
/// `total_duration`, so the cues tile the clip with no gaps or overlap.
pub fn allocate(chunks: &[String], total_duration: f64) -> Vec<SubtitleSegment> {
    if chunks.is_empty() {
        return Vec::new();
    }

    let total_duration = if total_duration.is_finite() {
        total_duration.max(0.0)
    } else {
        0.0
    };
    let lengths: Vec<usize> = chunks.iter().map(|c| c.encode_utf16().count()).collect();
    let total_len: usize = lengths.iter().sum();

    let mut segments = Vec::with_capacity(chunks.len());
    let mut current = 0.0f64;
    let last = chunks.len() - 1;

    for (i, (chunk, &len)) in chunks.iter().zip(&lengths).enumerate() {
        let duration = len as f64 / total_len as f64 * total_duration;
        let end_time = if i == last { total_duration } else { current + duration };

        segments.push(SubtitleSegment {
            index: i + 1,
            start_time: current,
            end_time,
            text: chunk.clone(),
        });

        current += duration;
    }

    segments
}

/// Segment cleaned text and time it against the rendered duration
pub fn segment(cleaned_text: &str, total_duration: f64) -> Vec<SubtitleSegment> {
    let chunks = split_segments(cleaned_text);
    log::debug!(
        "Split narration into {} segment(s) over {:.3}s",
        chunks.len(),
        total_duration
    );
    allocate(&chunks, total_duration)
}
