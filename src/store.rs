//! Key-value persistence
//!
//! Selection history and subtitle preferences live under namespaced keys in
//! a host-provided store. Only `get` and `set` are needed.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SubtitleError};

/// Map of media path to chosen subtitle path
pub const KEY_SELECTIONS: &str = "subtitles.selections";
pub const KEY_LAST_USED_LANGUAGE: &str = "subtitles.lastUsedLanguage";
pub const KEY_DEFAULT_LANGUAGE: &str = "subtitles.defaultLanguage";
pub const KEY_AUTO_LOAD: &str = "subtitles.autoLoad";

/// Persisted selections, keyed by media path
pub type SelectionRecord = BTreeMap<String, String>;

pub trait KeyValueStore: Send + Sync {
    fn get_value(&self, key: &str) -> Option<Value>;

    fn set_value(&self, key: &str, value: Value) -> Result<()>;

    /// Typed read; a missing or mistyped value yields `default`
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T
    where
        Self: Sized,
    {
        match self.get_value(key) {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!(key, "ignoring stored value: {}", e);
                default
            }),
            None => default,
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(value).map_err(|e| SubtitleError::Store(e.to_string()))?;
        self.set_value(key, value)
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    fn set_value(&self, key: &str, value: Value) -> Result<()> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk, rewritten on every set
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    /// Open the store; a missing file starts empty
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                SubtitleError::Store(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(SubtitleError::io(path.display().to_string(), e)),
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    fn set_value(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value);

        let text =
            serde_json::to_string_pretty(&*values).map_err(|e| SubtitleError::Store(e.to_string()))?;
        std::fs::write(&self.path, text)
            .map_err(|e| SubtitleError::io(self.path.display().to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_typed_access() {
        let store = MemoryStore::new();
        assert!(store.get(KEY_AUTO_LOAD, true));

        store.set(KEY_AUTO_LOAD, &false).unwrap();
        assert!(!store.get(KEY_AUTO_LOAD, true));

        let mut record = SelectionRecord::new();
        record.insert("/m/a.mp4".into(), "/m/a.fr.srt".into());
        store.set(KEY_SELECTIONS, &record).unwrap();
        assert_eq!(store.get(KEY_SELECTIONS, SelectionRecord::new()), record);
    }

    #[test]
    fn test_mistyped_value_yields_default() {
        let store = MemoryStore::new();
        store.set_value(KEY_AUTO_LOAD, Value::String("yes".into())).unwrap();
        assert!(store.get(KEY_AUTO_LOAD, true));
    }

    #[test]
    fn test_json_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store
                .set(KEY_LAST_USED_LANGUAGE, &Some("fre".to_string()))
                .unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        let lang: Option<String> = store.get(KEY_LAST_USED_LANGUAGE, None);
        assert_eq!(lang.as_deref(), Some("fre"));
    }

    #[test]
    fn test_json_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(SubtitleError::Store(_))
        ));
    }
}
