//! # Result Cache
//!
//! Disk-backed memo of whole row sets, one CSV file per collection and
//! record kind. The presence of a file is the cache hit: there is no TTL and
//! no invalidation. A record that is present but cannot be decoded aborts the
//! operation instead of being silently recomputed.
//!
//! ## File layout
//!
//! ```text
//! <cache_dir>/statistics_<collection>.csv   Title,Views,Likes
//! <cache_dir>/membership_<collection>.csv   Title,Media ID,Artist,Song
//! <cache_dir>/snapshot_<collection>.csv     Position,Title,Media ID,Membership ID
//! ```
//!
//! Writes go to `<file>.tmp` first and are renamed into place, so readers
//! only ever observe a complete file.

use crate::error::{Result, SyncError};
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use core_runtime::logging::strip_path;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Kind of row set stored for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Statistics,
    Membership,
    Snapshot,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Statistics => "statistics",
            CacheKind::Membership => "membership",
            CacheKind::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies one cache file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub collection_id: String,
    pub kind: CacheKind,
}

impl CacheKey {
    pub fn new(collection_id: impl Into<String>, kind: CacheKind) -> Self {
        Self {
            collection_id: collection_id.into(),
            kind,
        }
    }

    /// `<kind>_<collection id>.csv`, with the id percent-encoded so distinct
    /// ids never share a file.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.csv",
            self.kind,
            urlencoding::encode(&self.collection_id)
        )
    }
}

/// A row type that can be persisted in the cache.
///
/// `HEADERS` lists the columns that must be present in a file before any row
/// is decoded.
pub trait CacheRecord: Serialize + DeserializeOwned + Send + Sync {
    const KIND: CacheKind;
    const HEADERS: &'static [&'static str];
}

/// Engagement counters for one collection item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Views")]
    pub views: u64,
    #[serde(rename = "Likes")]
    pub likes: u64,
}

impl CacheRecord for StatisticsRow {
    const KIND: CacheKind = CacheKind::Statistics;
    const HEADERS: &'static [&'static str] = &["Title", "Views", "Likes"];
}

/// Title split into artist and song for one collection item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Media ID")]
    pub media_id: String,
    #[serde(rename = "Artist")]
    pub artist: String,
    #[serde(rename = "Song")]
    pub song: String,
}

impl CacheRecord for MembershipRow {
    const KIND: CacheKind = CacheKind::Membership;
    const HEADERS: &'static [&'static str] = &["Title", "Media ID", "Artist", "Song"];
}

/// Full snapshot entry, including the membership id removals need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    #[serde(rename = "Position")]
    pub position: usize,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Media ID")]
    pub media_id: String,
    #[serde(rename = "Membership ID")]
    pub membership_id: String,
}

impl CacheRecord for SnapshotRow {
    const KIND: CacheKind = CacheKind::Snapshot;
    const HEADERS: &'static [&'static str] = &["Position", "Title", "Media ID", "Membership ID"];
}

/// CSV result cache rooted at one directory.
pub struct ResultCache {
    fs: Arc<dyn FileSystemAccess>,
    root: PathBuf,
}

impl ResultCache {
    pub fn new(fs: Arc<dyn FileSystemAccess>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    /// Returns the cached rows, or `None` when no file exists.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Validation`] when a required column is missing
    /// - [`SyncError::LocalIo`] when the file cannot be read or a row cannot be decoded
    #[instrument(skip(self), fields(kind = %R::KIND))]
    pub async fn load<R: CacheRecord>(&self, collection_id: &str) -> Result<Option<Vec<R>>> {
        let key = CacheKey::new(collection_id, R::KIND);
        let Some((data, display)) = self.read_raw(&key).await? else {
            return Ok(None);
        };

        let rows = decode_rows::<R>(&data, &display)?;
        let shown = strip_path(&display);
        info!("Cache hit: {} ({} rows)", shown, rows.len());
        Ok(Some(rows))
    }

    /// Raw bytes of a record and its path, or `None` when no file exists.
    pub(crate) async fn read_raw(&self, key: &CacheKey) -> Result<Option<(Bytes, String)>> {
        let path = self.path_for(key);
        let display = path.display().to_string();

        let exists = self
            .fs
            .exists(&path)
            .await
            .map_err(|e| SyncError::local_io(&display, e))?;
        if !exists {
            let shown = strip_path(&display);
            debug!("Cache miss: {}", shown);
            return Ok(None);
        }

        let data = self
            .fs
            .read_file(&path)
            .await
            .map_err(|e| SyncError::local_io(&display, e))?;
        Ok(Some((data, display)))
    }

    /// Persists `rows` atomically, replacing any previous record.
    #[instrument(skip(self, rows), fields(kind = %R::KIND, rows = rows.len()))]
    pub async fn store<R: CacheRecord>(&self, collection_id: &str, rows: &[R]) -> Result<()> {
        let path = self.path_for(&CacheKey::new(collection_id, R::KIND));
        let display = path.display().to_string();
        let tmp_path = tmp_path_for(&path);

        let data = encode_rows(rows).map_err(|e| SyncError::local_io(&display, e))?;

        self.fs
            .create_dir_all(&self.root)
            .await
            .map_err(|e| SyncError::local_io(self.root.display().to_string(), e))?;
        self.fs
            .write_file(&tmp_path, Bytes::from(data))
            .await
            .map_err(|e| SyncError::local_io(tmp_path.display().to_string(), e))?;
        self.fs
            .rename(&tmp_path, &path)
            .await
            .map_err(|e| SyncError::local_io(&display, e))?;

        let shown = strip_path(&display);
        debug!("Cache stored: {}", shown);
        Ok(())
    }

    /// Loads the cached rows, or runs `compute` and persists its result.
    ///
    /// `compute` is never invoked on a hit. A compute error is returned as
    /// is and nothing is written.
    pub async fn get_or_compute<R, F, Fut>(&self, collection_id: &str, compute: F) -> Result<Vec<R>>
    where
        R: CacheRecord,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<R>>>,
    {
        if let Some(rows) = self.load::<R>(collection_id).await? {
            return Ok(rows);
        }

        let rows = compute().await?;
        self.store(collection_id, &rows).await?;
        Ok(rows)
    }

    /// Deletes a record. Missing records are not an error.
    pub async fn remove(&self, key: &CacheKey) -> Result<()> {
        let path = self.path_for(key);
        let display = path.display().to_string();

        let exists = self
            .fs
            .exists(&path)
            .await
            .map_err(|e| SyncError::local_io(&display, e))?;
        if exists {
            self.fs
                .delete_file(&path)
                .await
                .map_err(|e| SyncError::local_io(&display, e))?;
        }
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Checks that every column in `required` appears in `headers`.
pub(crate) fn require_columns<'a>(
    headers: &csv::StringRecord,
    required: impl IntoIterator<Item = &'a str>,
    path: &str,
) -> Result<()> {
    let present: HashSet<&str> = headers.iter().collect();
    for column in required {
        if !present.contains(column) {
            return Err(SyncError::Validation {
                column: column.to_string(),
                path: strip_path(path).to_string(),
            });
        }
    }
    Ok(())
}

fn decode_rows<R: CacheRecord>(data: &[u8], path: &str) -> Result<Vec<R>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| SyncError::local_io(path, format!("Failed to read CSV headers: {}", e)))?
        .clone();
    require_columns(&headers, R::HEADERS.iter().copied(), path)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<R>().enumerate() {
        let line_number = idx + 2; // header is line 1
        let row = result.map_err(|e| {
            SyncError::local_io(path, format!("line {}: {}", line_number, e))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn encode_rows<R: CacheRecord>(rows: &[R]) -> std::result::Result<Vec<u8>, String> {
    // Headers are written explicitly so an empty row set still has them.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(R::HEADERS)
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| format!("Failed to write CSV row: {}", e))?;
    }

    writer
        .into_inner()
        .map_err(|e| format!("Failed to flush CSV: {}", e))
}
