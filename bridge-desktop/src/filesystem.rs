//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::FileSystemAccess,
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Provides async file I/O operations using:
/// - `tokio::fs` for async operations
/// - `sync_all` before returning from writes, so a following `rename`
///   publishes fully flushed contents
/// - Platform-specific default cache directory
pub struct TokioFileSystem {
    cache_dir: PathBuf,
}

impl TokioFileSystem {
    /// Create a new file system accessor rooted at the platform cache directory
    pub fn new() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("playlist-sync");

        Self { cache_dir }
    }

    /// Create a new file system accessor with a custom cache directory
    pub fn with_cache_directory(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory suggested for result cache records
    pub fn cache_directory(&self) -> &Path {
        &self.cache_dir
    }

    /// Convert std::io::Error to BridgeError
    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }
}

impl Default for TokioFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(Self::map_io_error)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, "Created directory");
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(path).await.map_err(Self::map_io_error)?;
        file.write_all(data.as_ref())
            .await
            .map_err(Self::map_io_error)?;
        file.sync_all().await.map_err(Self::map_io_error)?;

        debug!(path = ?path, size = data.len(), "Wrote file");
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).await.map_err(Self::map_io_error)?;
        debug!(from = ?from, to = ?to, "Renamed file");
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Deleted file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_cache_directory() {
        let fs = TokioFileSystem::new();
        assert!(fs.cache_directory().ends_with("playlist-sync"));
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let dir = tempdir().unwrap();
        let fs = TokioFileSystem::with_cache_directory(dir.path().to_path_buf());
        let test_file = dir.path().join("nested").join("test-file.txt");

        let data = Bytes::from("Hello, World!");
        fs.write_file(&test_file, data.clone()).await.unwrap();

        assert!(fs.exists(&test_file).await.unwrap());
        let read_data = fs.read_file(&test_file).await.unwrap();
        assert_eq!(data, read_data);

        fs.delete_file(&test_file).await.unwrap();
        assert!(!fs.exists(&test_file).await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_replaces_destination() {
        let dir = tempdir().unwrap();
        let fs = TokioFileSystem::with_cache_directory(dir.path().to_path_buf());
        let target = dir.path().join("record.csv");
        let staged = dir.path().join("record.csv.tmp");

        fs.write_file(&target, Bytes::from("old")).await.unwrap();
        fs.write_file(&staged, Bytes::from("new")).await.unwrap();
        fs.rename(&staged, &target).await.unwrap();

        assert!(!fs.exists(&staged).await.unwrap());
        assert_eq!(fs.read_file(&target).await.unwrap(), Bytes::from("new"));
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let fs = TokioFileSystem::with_cache_directory(dir.path().to_path_buf());

        let err = fs.read_file(&dir.path().join("absent.csv")).await.unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }
}
