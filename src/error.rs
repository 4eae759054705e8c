use std::path::Path;

use thiserror::Error;

/// Main error type for subtitle conversion and selection
///
/// Cloneable so that every caller coalesced onto one conversion
/// observes the same terminal outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubtitleError {
    /// The file extension does not map to a known subtitle format
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),

    /// A timestamp inside an otherwise valid block could not be parsed
    #[error("Malformed time code: {0}")]
    MalformedTimeCode(String),

    /// The document as a whole could not be parsed (TTML/DFXP XML)
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The subtitle file or its directory could not be read
    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    /// A selection named a track that is not loaded for the current media
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// The persistence store rejected a write
    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SubtitleError {
    /// Wrap an I/O failure together with the path it happened on
    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        SubtitleError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SubtitleError>;
