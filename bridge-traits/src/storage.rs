//! Storage and File System Abstractions
//!
//! Provides the platform-agnostic file I/O trait used by the result cache.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::error::Result;

/// File system access trait
///
/// Abstracts the handful of file operations the core needs so tests can run
/// against a temporary directory or an in-memory fake.
///
/// `rename` must replace the destination atomically when both paths are on
/// the same filesystem; the result cache relies on this to never expose a
/// partially written record.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn publish(fs: &dyn FileSystemAccess, path: &Path, data: Bytes) -> Result<()> {
///     let tmp = path.with_extension("tmp");
///     fs.write_file(&tmp, data).await?;
///     fs.rename(&tmp, path).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read entire file contents into memory
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Write data to a file, creating or truncating it
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Move `from` to `to`, replacing `to` if it exists
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> Result<()>;
}
