//! Engine configuration

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::language::LanguageDetector;
use crate::matcher::{LanguagePriority, SubtitleMatcher, DEFAULT_QUALIFIERS};

/// Cache configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory for spilled canonical files; in memory only when unset
    pub spill_dir: Option<PathBuf>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Language assumed for untagged files, and the last resolution step
    pub default_language: String,

    /// Ranking order of matched subtitles
    pub preferred_languages: Vec<String>,

    /// Activate a track automatically after a media load
    pub auto_load: bool,

    /// Tokens accepted after the media name (`movie.forced.srt`)
    pub qualifiers: Vec<String>,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_language: "eng".to_string(),
            preferred_languages: vec!["eng".to_string()],
            auto_load: true,
            qualifiers: DEFAULT_QUALIFIERS.iter().map(|q| q.to_string()).collect(),
            cache: CacheConfig::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl EngineConfig {
    /// Build the matcher described by this configuration
    pub fn matcher(&self) -> SubtitleMatcher {
        SubtitleMatcher::new(
            LanguageDetector::new(self.default_language.as_str()),
            self.qualifiers.clone(),
            Arc::new(LanguagePriority::new(&self.preferred_languages)),
        )
    }
}
