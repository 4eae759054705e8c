//! Track selection state machine
//!
//! Two states, `Off` and `Active(track)`. Every media load starts from
//! `Off` and takes a fresh generation number; the outcome of a load is only
//! applied while its generation is still current.
//!
//! Resolution order after a load:
//! 1. the persisted choice for this media, if that track converted
//! 2. the first track in the last used language
//! 3. the first track in the default language
//! 4. `Off`

use serde::Serialize;

use crate::error::{Result, SubtitleError};
use crate::types::{SubtitleSource, TrackListing};

/// The part of the machine visible to the rest of the engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub active_track: Option<SubtitleSource>,
    pub last_used_language: Option<String>,
}

/// Inputs for resolving a load
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Persisted subtitle path for the media being loaded
    pub record: Option<&'a str>,
    pub default_language: &'a str,
    pub auto_load: bool,
}

/// Why a load ended on the track it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    Record,
    LastUsedLanguage,
    DefaultLanguage,
    Off,
    /// Auto-load disabled; tracks listed only
    Disabled,
    /// The user chose while the load was running; their choice stands
    UserSelected,
}

/// Result of a user selection, for the caller to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub media_path: Option<String>,
    pub selected: Option<SubtitleSource>,
}

#[derive(Debug, Default)]
pub struct SelectionMachine {
    generation: u64,
    media_path: Option<String>,
    tracks: Vec<SubtitleSource>,
    state: SelectionState,
    /// Set by `select` and cleared by `begin_load`
    user_selected: bool,
}

impl SelectionMachine {
    pub fn new(last_used_language: Option<String>) -> Self {
        Self {
            state: SelectionState {
                active_track: None,
                last_used_language,
            },
            ..Default::default()
        }
    }

    /// Start a media load: deactivate, forget old tracks, bump generation
    pub fn begin_load(&mut self, media_path: &str) -> u64 {
        self.generation += 1;
        self.media_path = Some(media_path.to_string());
        self.tracks.clear();
        self.state.active_track = None;
        self.user_selected = false;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn media_path(&self) -> Option<&str> {
        self.media_path.as_deref()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn tracks(&self) -> &[SubtitleSource] {
        &self.tracks
    }

    /// Apply a finished load. Returns `None` if the load is stale.
    ///
    /// A selection the user made during the load is kept, and tracks they
    /// added are listed after the loaded ones.
    pub fn resolve(
        &mut self,
        generation: u64,
        tracks: Vec<SubtitleSource>,
        ctx: ResolveContext<'_>,
    ) -> Option<Resolution> {
        if !self.is_current(generation) {
            return None;
        }

        if self.user_selected {
            let added: Vec<SubtitleSource> = self
                .tracks
                .drain(..)
                .filter(|t| !tracks.iter().any(|loaded| loaded.path == t.path))
                .collect();
            self.tracks = tracks;
            self.tracks.extend(added);
            return Some(Resolution::UserSelected);
        }

        let (chosen, resolution) = if ctx.auto_load {
            pick(&tracks, &self.state, ctx)
        } else {
            (None, Resolution::Disabled)
        };

        self.tracks = tracks;
        // Single assignment: never two tracks showing
        self.state.active_track = chosen;
        Some(resolution)
    }

    /// User picks a track (`Some(path)`) or turns subtitles off (`None`)
    pub fn select(&mut self, path: Option<&str>) -> Result<SelectionChange> {
        let selected = match path {
            Some(path) => {
                let track = self
                    .tracks
                    .iter()
                    .find(|t| t.path == path)
                    .cloned()
                    .ok_or_else(|| SubtitleError::TrackNotFound(path.to_string()))?;
                self.state.last_used_language = Some(track.language_code.clone());
                Some(track)
            }
            None => None,
        };

        self.state.active_track = selected.clone();
        self.user_selected = true;
        Ok(SelectionChange {
            media_path: self.media_path.clone(),
            selected,
        })
    }

    /// Add a track outside of a load, replacing one with the same path
    pub fn add_track(&mut self, source: SubtitleSource) {
        match self.tracks.iter_mut().find(|t| t.path == source.path) {
            Some(existing) => *existing = source,
            None => self.tracks.push(source),
        }
    }

    /// Snapshot for the display
    pub fn listing(&self) -> Vec<TrackListing> {
        let active = self.state.active_track.as_ref().map(|t| t.path.as_str());
        self.tracks
            .iter()
            .map(|t| TrackListing {
                path: t.path.clone(),
                label: t.label.clone(),
                language_code: t.language_code.clone(),
                showing: Some(t.path.as_str()) == active,
            })
            .collect()
    }
}

fn pick(
    tracks: &[SubtitleSource],
    state: &SelectionState,
    ctx: ResolveContext<'_>,
) -> (Option<SubtitleSource>, Resolution) {
    if let Some(record) = ctx.record {
        if let Some(t) = tracks.iter().find(|t| t.path == record) {
            return (Some(t.clone()), Resolution::Record);
        }
    }
    if let Some(lang) = &state.last_used_language {
        if let Some(t) = tracks.iter().find(|t| &t.language_code == lang) {
            return (Some(t.clone()), Resolution::LastUsedLanguage);
        }
    }
    if let Some(t) = tracks.iter().find(|t| t.language_code == ctx.default_language) {
        return (Some(t.clone()), Resolution::DefaultLanguage);
    }
    (None, Resolution::Off)
}
