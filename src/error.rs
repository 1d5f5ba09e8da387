//! Error types for recap-audio

use thiserror::Error;

/// Main error type for the narration pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// The encoded blob could not be turned into PCM at all
    #[error("Decode error: {0}")]
    Decode(String),

    /// The effects render could not produce an output buffer
    #[error("Render error: {0}")]
    Render(String),

    /// Container serialization failed (invariant violation for valid buffers)
    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio file error: {0}")]
    Audio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Result type for recap-audio operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<hound::Error> for Error {
    fn from(err: hound::Error) -> Self {
        Error::Audio(err.to_string())
    }
}

impl Error {
    /// Whether this error aborts the pipeline before any artifact exists
    pub fn is_fatal_stage_error(&self) -> bool {
        matches!(self, Error::Decode(_) | Error::Render(_) | Error::Encode(_))
    }
}
