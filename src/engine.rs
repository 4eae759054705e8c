//! Subtitle engine
//!
//! Ties the pieces together for one player:
//! media load -> directory scan -> match -> convert (cached) -> resolve.
//!
//! Each media load takes a new generation from the selection machine. The
//! load suspends while reading the directory and converting files; when it
//! resumes, its outcome is applied only if no newer load has started.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::join_all;
use parking_lot::Mutex;

use crate::cache::{CanonicalContent, ConversionCache, Converted};
use crate::config::EngineConfig;
use crate::display::DisplaySink;
use crate::error::{Result, SubtitleError};
use crate::io::FileSource;
use crate::matcher::{normalize_language, SubtitleMatcher};
use crate::selection::{ResolveContext, SelectionChange, SelectionMachine, SelectionState};
use crate::store::{
    KeyValueStore, SelectionRecord, KEY_AUTO_LOAD, KEY_DEFAULT_LANGUAGE, KEY_LAST_USED_LANGUAGE,
    KEY_SELECTIONS,
};
use crate::subtitle;
use crate::types::{SubtitleSource, TrackListing};

pub struct SubtitleEngine<F, S, D> {
    files: F,
    store: S,
    display: D,
    config: EngineConfig,
    matcher: SubtitleMatcher,
    cache: ConversionCache,
    machine: Mutex<SelectionMachine>,
}

impl<F, S, D> SubtitleEngine<F, S, D>
where
    F: FileSource,
    S: KeyValueStore,
    D: DisplaySink,
{
    pub fn new(config: EngineConfig, files: F, store: S, display: D) -> Self {
        let last_used: Option<String> = store.get(KEY_LAST_USED_LANGUAGE, None);
        Self {
            matcher: config.matcher(),
            cache: ConversionCache::new(config.cache.clone()),
            machine: Mutex::new(SelectionMachine::new(last_used)),
            files,
            store,
            display,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ConversionCache {
        &self.cache
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Default language: the stored preference, else the configured one
    pub fn default_language(&self) -> String {
        let code: String = self
            .store
            .get(KEY_DEFAULT_LANGUAGE, self.config.default_language.clone());
        normalize_language(&code)
    }

    /// Auto-load flag: the stored preference, else the configured one
    pub fn auto_load(&self) -> bool {
        self.store.get(KEY_AUTO_LOAD, self.config.auto_load)
    }

    pub fn state(&self) -> SelectionState {
        self.machine.lock().state().clone()
    }

    pub fn tracks(&self) -> Vec<TrackListing> {
        self.machine.lock().listing()
    }

    /// Find, convert and list the subtitles of a newly loaded media file,
    /// then pick the track to show.
    ///
    /// Returns the subtitles that converted successfully. A load that was
    /// overtaken by a newer one returns an empty list and changes nothing.
    pub async fn detect_and_apply(&self, media_path: &str) -> Vec<SubtitleSource> {
        let generation = {
            let mut machine = self.machine.lock();
            let generation = machine.begin_load(media_path);
            self.display.render(&machine.listing());
            generation
        };
        self.cache.clear();

        let dir = Path::new(media_path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let candidates = match self.files.read_dir(dir).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), "cannot list media directory: {}", e);
                Vec::new()
            }
        };

        if !self.machine.lock().is_current(generation) {
            tracing::debug!(generation, media_path, "dropping stale subtitle load");
            return Vec::new();
        }

        let matched = self.matcher.match_candidates(media_path, &candidates);
        let results = join_all(matched.into_iter().map(|source| async move {
            let result = self.convert(&source).await;
            (source, result)
        }))
        .await;

        let record: SelectionRecord = self.store.get(KEY_SELECTIONS, SelectionRecord::new());
        let default_language = self.default_language();
        let auto_load = self.auto_load();

        let mut machine = self.machine.lock();
        if !machine.is_current(generation) {
            tracing::debug!(generation, media_path, "dropping stale subtitle load");
            return Vec::new();
        }

        let mut converted = Vec::with_capacity(results.len());
        for (source, result) in results {
            match result {
                Ok(_) => converted.push(source),
                Err(e) => {
                    tracing::warn!(path = source.path.as_str(), "subtitle conversion failed: {}", e);
                    self.display
                        .notice(&format!("Could not load subtitle {}: {}", source.label, e));
                }
            }
        }

        let ctx = ResolveContext {
            record: record.get(media_path).map(String::as_str),
            default_language: &default_language,
            auto_load,
        };
        if let Some(resolution) = machine.resolve(generation, converted.clone(), ctx) {
            match &machine.state().active_track {
                Some(track) => tracing::info!(
                    media_path,
                    track = track.path.as_str(),
                    ?resolution,
                    "subtitle activated"
                ),
                None => tracing::info!(media_path, tracks = converted.len(), ?resolution, "subtitles off"),
            }
        }
        self.display.render(&machine.listing());

        converted
    }

    /// User selection: a track path, or `None` for off
    pub fn select_track(&self, path: Option<&str>) -> Result<()> {
        let mut machine = self.machine.lock();
        self.apply_selection(&mut machine, path)
    }

    /// Convert a user-chosen file, add it to the track list and show it
    pub async fn load_external(&self, path: &str) -> Result<SubtitleSource> {
        let source = SubtitleSource::from_path(path, self.matcher.detector())?;
        let generation = self.machine.lock().generation();

        if let Err(e) = self.convert(&source).await {
            tracing::warn!(path, "external subtitle conversion failed: {}", e);
            self.display
                .notice(&format!("Could not load subtitle {}: {}", source.label, e));
            return Err(e);
        }

        let mut machine = self.machine.lock();
        if !machine.is_current(generation) {
            tracing::debug!(generation, path, "media changed, external subtitle not applied");
            return Ok(source);
        }
        machine.add_track(source.clone());
        self.apply_selection(&mut machine, Some(path))?;

        Ok(source)
    }

    /// Canonical content of the track currently showing
    pub fn active_content(&self) -> Option<Bytes> {
        let path = self.machine.lock().state().active_track.as_ref()?.path.clone();
        self.cache.get(&path).map(|content| content.handle.bytes())
    }

    async fn convert(&self, source: &SubtitleSource) -> Result<Arc<CanonicalContent>> {
        self.cache
            .get_or_convert(&source.path, || async {
                let bytes = self
                    .files
                    .read_file(Path::new(&source.path))
                    .await
                    .map_err(|e| SubtitleError::io(&source.path, e))?;
                let (track, canonical) = subtitle::convert_bytes(&bytes, source.format)?;
                tracing::debug!(
                    path = source.path.as_str(),
                    format = %source.format,
                    cues = track.len(),
                    "subtitle converted"
                );
                Ok(Converted {
                    format: source.format,
                    cue_count: track.len(),
                    canonical,
                })
            })
            .await
    }

    fn apply_selection(&self, machine: &mut SelectionMachine, path: Option<&str>) -> Result<()> {
        let change = machine.select(path)?;
        match &change.selected {
            Some(track) => tracing::info!(track = track.path.as_str(), "subtitle selected"),
            None => tracing::info!("subtitles turned off"),
        }
        self.display.render(&machine.listing());
        self.persist(&change)
    }

    fn persist(&self, change: &SelectionChange) -> Result<()> {
        let result = self.write_selection(change);
        if let Err(e) = &result {
            tracing::warn!("failed to persist subtitle selection: {}", e);
        }
        result
    }

    fn write_selection(&self, change: &SelectionChange) -> Result<()> {
        if let Some(media_path) = &change.media_path {
            let mut record: SelectionRecord =
                self.store.get(KEY_SELECTIONS, SelectionRecord::new());
            match &change.selected {
                Some(track) => {
                    record.insert(media_path.clone(), track.path.clone());
                }
                None => {
                    record.remove(media_path);
                }
            }
            self.store.set(KEY_SELECTIONS, &record)?;
        }
        if let Some(track) = &change.selected {
            self.store
                .set(KEY_LAST_USED_LANGUAGE, &Some(track.language_code.as_str()))?;
        }
        Ok(())
    }
}
