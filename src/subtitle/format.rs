//! Subtitle format detection by file extension

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubtitleError};

/// Subtitle format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatKind {
    Srt,  // SubRip
    Ass,  // ASS/SSA
    Ttml, // TTML/DFXP
    WebVtt,
}

impl FormatKind {
    /// Map a file extension (without the dot, any case) to a format
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "srt" => Ok(FormatKind::Srt),
            "ass" | "ssa" => Ok(FormatKind::Ass),
            "ttml" | "dfxp" | "xml" => Ok(FormatKind::Ttml),
            "vtt" => Ok(FormatKind::WebVtt),
            other => Err(SubtitleError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Detect the format of a subtitle file from its path
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| SubtitleError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(ext)
    }

    /// Whether the path carries one of the supported subtitle extensions
    pub fn is_subtitle_path(path: impl AsRef<Path>) -> bool {
        Self::from_path(path).is_ok()
    }

    /// Human-readable format name for logging and listings
    pub fn name(&self) -> &'static str {
        match self {
            FormatKind::Srt => "SubRip (SRT)",
            FormatKind::Ass => "ASS/SSA",
            FormatKind::Ttml => "TTML/DFXP",
            FormatKind::WebVtt => "WebVTT",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
