//! Subtitle normalization and selection engine
//!
//! Converts SRT, ASS/SSA, TTML/DFXP and WebVTT files into one canonical
//! WebVTT form, matches subtitle files to a media file by name, and keeps
//! track of which subtitle is showing across media loads.

pub mod cache;
pub mod config;
pub mod config_file;
pub mod cue;
pub mod display;
pub mod engine;
pub mod error;
pub mod io;
pub mod language;
pub mod matcher;
pub mod selection;
pub mod store;
pub mod subtitle;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use cache::{CanonicalContent, ContentHandle, ConversionCache, EntryState};
pub use config::{CacheConfig, EngineConfig, LogFormat};
pub use cue::{Cue, CueTrack};
pub use display::{ConsoleDisplay, DisplaySink};
pub use engine::SubtitleEngine;
pub use error::{Result, SubtitleError};
pub use io::{FileSource, TokioFs};
pub use language::LanguageDetector;
pub use matcher::{LanguagePriority, RankingPolicy, SubtitleMatcher};
pub use selection::{SelectionMachine, SelectionState};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use subtitle::FormatKind;
pub use types::{SubtitleSource, TrackListing};
