//! Narration script cleanup

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BULLET_REGEX: Regex = Regex::new(r"(?m)^- ").unwrap();
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Inline decoration markers removed before narration, longest first
const MARKERS: [&str; 4] = ["**", "*", "~~", "`"];

/// Strip editor decoration so the text can be narrated and subtitled
///
/// Removes `**bold**`, `*italic*`, `~~strike~~` and `` `code` `` markers
/// (keeping the wrapped text) and a leading `- ` bullet on any line.
pub fn clean_script(text: &str) -> String {
    let mut cleaned = text.to_string();
    for marker in MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    BULLET_REGEX.replace_all(&cleaned, "").into_owned()
}

/// Collapse whitespace runs into single spaces
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_string()
}
