//! Conversion cache
//!
//! Maps a subtitle path to its canonical content. Concurrent requests for
//! the same path share one conversion: the first caller runs it, the others
//! wait on the same cell and observe the same outcome, success or failure.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::error::{Result, SubtitleError};
use crate::subtitle::FormatKind;

/// Canonical bytes of one converted subtitle
///
/// When spilled to disk the file is removed as soon as the handle is
/// dropped.
#[derive(Debug)]
pub struct ContentHandle {
    data: Bytes,
    spill_path: Option<PathBuf>,
}

impl ContentHandle {
    /// Wrap canonical text, writing `<spill_dir>/<id>.vtt` if a spill
    /// directory is given.
    pub async fn create(canonical: String, spill_dir: Option<&Path>) -> Result<Self> {
        let id = Uuid::new_v4();
        let data = Bytes::from(canonical);

        let spill_path = match spill_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.vtt", id));
                tokio::fs::write(&path, &data)
                    .await
                    .map_err(|e| SubtitleError::io(path.display().to_string(), e))?;
                Some(path)
            }
            None => None,
        };

        Ok(Self {
            data,
            spill_path,
        })
    }

    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    pub fn spill_path(&self) -> Option<&Path> {
        self.spill_path.as_deref()
    }
}

impl Drop for ContentHandle {
    fn drop(&mut self) {
        if let Some(path) = self.spill_path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::debug!(path = %path.display(), "failed to remove spill file: {}", e);
            }
        }
    }
}

/// Output of a converter, before it is stored
#[derive(Debug, Clone)]
pub struct Converted {
    pub format: FormatKind,
    pub cue_count: usize,
    pub canonical: String,
}

/// A ready cache entry
#[derive(Debug)]
pub struct CanonicalContent {
    pub source_path: String,
    pub format: FormatKind,
    pub cue_count: usize,
    pub handle: ContentHandle,
}

/// Lifecycle of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryState {
    Pending,
    Ready,
    Failed,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub pending: usize,
    pub ready: usize,
    pub failed: usize,
}

type Outcome = std::result::Result<Arc<CanonicalContent>, SubtitleError>;

/// Coalescing conversion cache
pub struct ConversionCache {
    entries: DashMap<String, Arc<OnceCell<Outcome>>>,
    config: CacheConfig,
}

impl ConversionCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
        }
    }

    /// Get the canonical content for `path`, converting it at most once.
    pub async fn get_or_convert<F, Fut>(&self, path: &str, converter: F) -> Result<Arc<CanonicalContent>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Converted>>,
    {
        // Clone the cell out so the map shard is not held across the await
        let cell = self
            .entries
            .entry(path.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let spill_dir = self.config.spill_dir.as_deref();
        cell.get_or_init(|| async move {
            let converted = converter().await?;
            let handle = ContentHandle::create(converted.canonical, spill_dir).await?;
            Ok(Arc::new(CanonicalContent {
                source_path: path.to_string(),
                format: converted.format,
                cue_count: converted.cue_count,
                handle,
            }))
        })
        .await
        .clone()
    }

    /// Ready content for `path`, if any
    pub fn get(&self, path: &str) -> Option<Arc<CanonicalContent>> {
        let cell = self.entries.get(path)?.clone();
        match cell.get() {
            Some(Ok(content)) => Some(content.clone()),
            _ => None,
        }
    }

    pub fn state(&self, path: &str) -> Option<EntryState> {
        let cell = self.entries.get(path)?.clone();
        Some(cell_state(&cell))
    }

    /// Release every entry. Conversions still in flight complete for their
    /// own callers but are not kept.
    pub fn clear(&self) {
        let released = self.entries.len();
        self.entries.clear();
        if released > 0 {
            tracing::debug!(released, "conversion cache cleared");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for entry in self.entries.iter() {
            stats.entries += 1;
            match cell_state(entry.value()) {
                EntryState::Pending => stats.pending += 1,
                EntryState::Ready => stats.ready += 1,
                EntryState::Failed => stats.failed += 1,
            }
        }
        stats
    }
}

fn cell_state(cell: &OnceCell<Outcome>) -> EntryState {
    match cell.get() {
        None => EntryState::Pending,
        Some(Ok(_)) => EntryState::Ready,
        Some(Err(_)) => EntryState::Failed,
    }
}
