//! Text processing module
//!
//! Script cleanup, sentence segmentation, proportional cue timing and SRT
//! output.

mod cleaner;
pub mod segmenter;
pub mod srt;

pub use cleaner::{clean_script, normalize_whitespace};
pub use segmenter::{allocate, segment, split_segments, SubtitleSegment};
pub use srt::{format_time, generate_srt, to_srt};
