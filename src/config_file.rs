//! Configuration file support
//!
//! Loads engine configuration from TOML files. Every section is optional;
//! missing values take the defaults of [`EngineConfig`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{CacheConfig, EngineConfig, LogFormat};
use crate::error::{Result, SubtitleError};

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Subtitle selection settings
    pub engine: Option<EngineSettings>,
    /// Cache settings
    pub cache: Option<CacheSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Language code for untagged files
    pub default_language: Option<String>,
    /// Ranking order of matched subtitles
    pub preferred_languages: Option<Vec<String>>,
    /// Activate a track automatically on load
    pub auto_load: Option<bool>,
    /// Name qualifiers such as `forced`
    pub qualifiers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Directory for spilled canonical files
    pub spill_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<LogFormat>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtitleError::io(path.display().to_string(), e))?;
        toml::from_str(&content)
            .map_err(|e| SubtitleError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).map_err(|e| SubtitleError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| SubtitleError::io(path.display().to_string(), e))
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let defaults = EngineConfig::default();
        Self {
            engine: Some(EngineSettings {
                default_language: Some(defaults.default_language),
                preferred_languages: Some(defaults.preferred_languages),
                auto_load: Some(defaults.auto_load),
                qualifiers: Some(defaults.qualifiers),
            }),
            cache: Some(CacheSettings { spill_dir: None }),
            logging: Some(LoggingSettings {
                level: defaults.log_level,
                format: Some(defaults.log_format),
            }),
        }
    }

    /// Convert to EngineConfig
    pub fn into_engine_config(self) -> EngineConfig {
        let defaults = EngineConfig::default();
        let engine = self.engine.unwrap_or_default();

        EngineConfig {
            default_language: engine.default_language.unwrap_or(defaults.default_language),
            preferred_languages: engine
                .preferred_languages
                .unwrap_or(defaults.preferred_languages),
            auto_load: engine.auto_load.unwrap_or(defaults.auto_load),
            qualifiers: engine.qualifiers.unwrap_or(defaults.qualifiers),
            cache: CacheConfig {
                spill_dir: self.cache.and_then(|c| c.spill_dir),
            },
            log_level: self
                .logging
                .as_ref()
                .map(|l| l.level.clone())
                .unwrap_or(defaults.log_level),
            log_format: self
                .logging
                .and_then(|l| l.format)
                .unwrap_or(defaults.log_format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default_config();
        let engine = config.engine.unwrap();
        assert_eq!(engine.default_language.as_deref(), Some("eng"));
        assert_eq!(engine.auto_load, Some(true));
    }

    #[test]
    fn test_config_file_roundtrip() {
        let config = ConfigFile::default_config();

        let temp_file = NamedTempFile::new().unwrap();
        config.to_file(temp_file.path()).unwrap();

        let loaded = ConfigFile::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.into_engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            r#"
[engine]
default_language = "fr"
preferred_languages = ["fre", "eng"]

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = ConfigFile::from_file(temp_file.path())
            .unwrap()
            .into_engine_config();
        assert_eq!(config.default_language, "fr");
        assert_eq!(config.preferred_languages, vec!["fre", "eng"]);
        assert!(config.auto_load);
        assert_eq!(config.qualifiers, vec!["forced", "default", "sub"]);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_broken_file_is_config_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[engine\nauto_load = ").unwrap();

        assert!(matches!(
            ConfigFile::from_file(temp_file.path()),
            Err(SubtitleError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            ConfigFile::from_file("/nonexistent/engine.toml"),
            Err(SubtitleError::Io { .. })
        ));
    }
}
