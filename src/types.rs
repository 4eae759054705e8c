use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::language::LanguageDetector;
use crate::subtitle::FormatKind;

/// A subtitle file associated with the current media
///
/// Derived from the path alone; immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleSource {
    pub path: String,
    pub format: FormatKind,
    pub language_code: String,
    pub label: String,
}

impl SubtitleSource {
    /// Describe a subtitle file: format from the extension, language and
    /// label from the file name.
    pub fn from_path(path: &str, detector: &LanguageDetector) -> Result<Self> {
        let format = FormatKind::from_path(path)?;
        let file_name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path);

        Ok(Self {
            path: path.to_string(),
            format,
            language_code: detector.detect(file_name),
            label: detector.label(file_name),
        })
    }
}

/// One row of the track list handed to the display layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackListing {
    pub path: String,
    pub label: String,
    pub language_code: String,
    /// Whether this track is the one currently showing
    pub showing: bool,
}
