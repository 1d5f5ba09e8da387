//! SubRip (SRT) caption formatting

use super::segmenter::{segment, SubtitleSegment};
use std::fmt::Write;

/// Format seconds as an SRT timecode `HH:MM:SS,mmm`
///
/// The value is rounded to whole milliseconds first; hours are not wrapped.
/// Negative and non-finite inputs print as zero.
pub fn format_time(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Render cues as SRT text
pub fn to_srt(segments: &[SubtitleSegment]) -> String {
    let mut out = String::new();
    for seg in segments {
        // Writing into a String cannot fail
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            seg.index,
            format_time(seg.start_time),
            format_time(seg.end_time),
            seg.text
        );
    }
    out
}

/// Segment cleaned text and emit SRT for a clip of `total_duration` seconds
pub fn generate_srt(cleaned_text: &str, total_duration: f64) -> String {
    to_srt(&segment(cleaned_text, total_duration))
}
