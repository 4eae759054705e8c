//! File access used by the engine
//!
//! Reading files and listing directories are the only points where a media
//! load suspends.

use std::future::Future;
use std::io;
use std::path::Path;

/// Source of subtitle files and directory listings
pub trait FileSource: Send + Sync {
    /// Read a whole file
    fn read_file(&self, path: &Path) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    /// Full paths of the regular files in a directory
    fn read_dir(&self, path: &Path) -> impl Future<Output = io::Result<Vec<String>>> + Send;
}

/// Local filesystem via `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl FileSource for TokioFs {
    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(p) = entry.path().to_str() {
                files.push(p.to_string());
            }
        }

        // Directory order is platform dependent; sort for a stable scan order
        files.sort();
        Ok(files)
    }
}
