//! # Run Configuration
//!
//! Every reconciliation run is driven by an explicit [`ReconcileConfig`]
//! value. There is no process-wide state: collection ids, limits and cache
//! policy all travel with the config into the runner.
//!
//! ## Overview
//!
//! The configuration uses a builder pattern and fails fast on invalid
//! combinations, so a runner never starts with a config it cannot honor.
//!
//! ## Required Settings
//!
//! - `source_id` / `target_id` - the two remote collections, non-empty and distinct
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `FileSystemAccess` - needed whenever a cache policy is enabled. With the
//!   `desktop-shims` feature a tokio-backed implementation rooted at
//!   `cache_dir` is injected automatically.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::ReconcileConfig;
//!
//! let config = ReconcileConfig::builder()
//!     .source_id("PLsource")
//!     .target_id("PLtarget")
//!     .insert_limit(10)
//!     .cache_dir("/path/to/cache")
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::ReconcileConfig;
//!
//! // Source and target must differ
//! let config = ReconcileConfig::builder()
//!     .source_id("PL1")
//!     .target_id("PL1")
//!     .build()
//!     .expect("Should fail - identical collections");
//! ```

use crate::error::{Error, Result};
use bridge_traits::storage::FileSystemAccess;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Default number of new items inserted per run.
pub const DEFAULT_INSERT_LIMIT: usize = 5;

/// Default number of rows kept by the artist and statistics reports.
pub const DEFAULT_TOP_N: usize = 20;

/// Default artist column consulted by the artist report.
pub const DEFAULT_ARTIST_COLUMN: &str = "Artist";

/// Titles the remote service substitutes for media that is no longer viewable.
pub const DEFAULT_INVALID_TITLES: &[&str] = &["Deleted video", "Private video"];

/// Which snapshots are read from and written to the result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub source: bool,
    /// A cached target does not reflect insertions made by earlier runs.
    pub target: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            source: true,
            target: false,
        }
    }
}

impl CachePolicy {
    /// No caching at all.
    pub fn disabled() -> Self {
        Self {
            source: false,
            target: false,
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.source || self.target
    }
}

/// Filter over zero-based source positions applied before candidate selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceSelection {
    /// Every source position is eligible.
    #[default]
    All,
    /// Every position except the listed ones.
    Omit(BTreeSet<usize>),
    /// Only the listed positions.
    Only(BTreeSet<usize>),
}

impl SourceSelection {
    pub fn omit(positions: impl IntoIterator<Item = usize>) -> Self {
        Self::Omit(positions.into_iter().collect())
    }

    pub fn only(positions: impl IntoIterator<Item = usize>) -> Self {
        Self::Only(positions.into_iter().collect())
    }

    /// Returns true when the item at `position` may become a candidate.
    pub fn includes(&self, position: usize) -> bool {
        match self {
            Self::All => true,
            Self::Omit(positions) => !positions.contains(&position),
            Self::Only(positions) => positions.contains(&position),
        }
    }
}

/// Configuration for one reconciliation run.
///
/// Built with [`ReconcileConfig::builder()`].
#[derive(Clone)]
pub struct ReconcileConfig {
    /// Collection new items are read from
    pub source_id: String,

    /// Collection that is cleaned and receives new items
    pub target_id: String,

    /// Maximum number of insertions per run
    pub insert_limit: usize,

    /// Directory holding cache files
    pub cache_dir: Option<PathBuf>,

    pub cache_policy: CachePolicy,

    /// File system used by the result cache
    pub file_system: Option<Arc<dyn FileSystemAccess>>,

    /// Remove later repeats of the same media from the target
    pub remove_duplicates: bool,

    /// Remove target items whose title is an invalid sentinel
    pub remove_invalid: bool,

    pub invalid_titles: Vec<String>,

    /// Exclude source items with an invalid sentinel title from planning
    pub skip_invalid_source: bool,

    pub source_selection: SourceSelection,

    /// Treat any failed mutation as a run error
    pub strict_mutations: bool,

    /// Page ceiling for a single collection fetch
    pub max_pages: Option<usize>,

    pub artist_column: String,

    pub top_n: usize,
}

impl std::fmt::Debug for ReconcileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileConfig")
            .field("source_id", &self.source_id)
            .field("target_id", &self.target_id)
            .field("insert_limit", &self.insert_limit)
            .field("cache_dir", &self.cache_dir)
            .field("cache_policy", &self.cache_policy)
            .field("file_system", &self.file_system.is_some())
            .field("remove_duplicates", &self.remove_duplicates)
            .field("remove_invalid", &self.remove_invalid)
            .field("invalid_titles", &self.invalid_titles)
            .field("skip_invalid_source", &self.skip_invalid_source)
            .field("source_selection", &self.source_selection)
            .field("strict_mutations", &self.strict_mutations)
            .field("max_pages", &self.max_pages)
            .field("artist_column", &self.artist_column)
            .field("top_n", &self.top_n)
            .finish()
    }
}

impl ReconcileConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ReconcileConfigBuilder {
        ReconcileConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// Called by [`ReconcileConfigBuilder::build`]; exposed so callers that
    /// mutate a built config can re-check it.
    pub fn validate(&self) -> Result<()> {
        if self.source_id.trim().is_empty() {
            return Err(Error::Config("Source collection id cannot be empty".to_string()));
        }

        if self.target_id.trim().is_empty() {
            return Err(Error::Config("Target collection id cannot be empty".to_string()));
        }

        if self.source_id == self.target_id {
            return Err(Error::Config(format!(
                "Source and target must be different collections (both are '{}')",
                self.source_id
            )));
        }

        if self.cache_policy.any_enabled() {
            if self.cache_dir.is_none() {
                return Err(Error::Config(
                    "Cache directory is required when caching is enabled. \
                     Use .cache_dir() or .cache_policy(CachePolicy::disabled())."
                        .to_string(),
                ));
            }

            if self.file_system.is_none() {
                return Err(file_system_missing_error());
            }
        }

        if self.max_pages == Some(0) {
            return Err(Error::Config("max_pages must be greater than 0".to_string()));
        }

        if self.remove_invalid && self.invalid_titles.is_empty() {
            return Err(Error::Config(
                "Invalid title list cannot be empty when invalid removal is enabled".to_string(),
            ));
        }

        if self.artist_column.trim().is_empty() {
            return Err(Error::Config("Artist column cannot be empty".to_string()));
        }

        if self.top_n == 0 {
            return Err(Error::Config("top_n must be greater than 0".to_string()));
        }

        Ok(())
    }

    /// Returns true when `title` is one of the configured sentinels.
    pub fn is_invalid_title(&self, title: &str) -> bool {
        self.invalid_titles.iter().any(|t| t == title)
    }
}

fn file_system_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "FileSystemAccess".to_string(),
        message: "FileSystemAccess implementation is required when caching is enabled. \
                  Inject one with .file_system() or enable the 'desktop-shims' feature."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system(cache_dir: &std::path::Path) -> Option<Arc<dyn FileSystemAccess>> {
    use bridge_desktop::TokioFileSystem;

    let fs: Arc<dyn FileSystemAccess> =
        Arc::new(TokioFileSystem::with_cache_directory(cache_dir.to_path_buf()));
    Some(fs)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system(_cache_dir: &std::path::Path) -> Option<Arc<dyn FileSystemAccess>> {
    None
}

/// Builder for constructing [`ReconcileConfig`] instances.
#[derive(Default)]
pub struct ReconcileConfigBuilder {
    source_id: Option<String>,
    target_id: Option<String>,
    insert_limit: Option<usize>,
    cache_dir: Option<PathBuf>,
    cache_policy: Option<CachePolicy>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    remove_duplicates: Option<bool>,
    remove_invalid: Option<bool>,
    invalid_titles: Option<Vec<String>>,
    skip_invalid_source: Option<bool>,
    source_selection: Option<SourceSelection>,
    strict_mutations: Option<bool>,
    max_pages: Option<usize>,
    artist_column: Option<String>,
    top_n: Option<usize>,
}

impl ReconcileConfigBuilder {
    /// Sets the source collection id.
    pub fn source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = Some(id.into());
        self
    }

    /// Sets the target collection id.
    pub fn target_id(mut self, id: impl Into<String>) -> Self {
        self.target_id = Some(id.into());
        self
    }

    /// Sets the maximum number of insertions per run.
    ///
    /// Default: 5. A limit of 0 produces a run that only cleans the target.
    pub fn insert_limit(mut self, limit: usize) -> Self {
        self.insert_limit = Some(limit);
        self
    }

    /// Sets the cache directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::ReconcileConfig;
    ///
    /// let builder = ReconcileConfig::builder()
    ///     .cache_dir("/path/to/cache");
    /// ```
    pub fn cache_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = Some(policy);
        self
    }

    /// Sets the file system used by the result cache.
    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    pub fn remove_duplicates(mut self, enabled: bool) -> Self {
        self.remove_duplicates = Some(enabled);
        self
    }

    pub fn remove_invalid(mut self, enabled: bool) -> Self {
        self.remove_invalid = Some(enabled);
        self
    }

    /// Replaces the invalid title sentinels.
    pub fn invalid_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invalid_titles = Some(titles.into_iter().map(Into::into).collect());
        self
    }

    pub fn skip_invalid_source(mut self, enabled: bool) -> Self {
        self.skip_invalid_source = Some(enabled);
        self
    }

    pub fn source_selection(mut self, selection: SourceSelection) -> Self {
        self.source_selection = Some(selection);
        self
    }

    /// Turns any failed mutation into a run error once all items were attempted.
    pub fn strict_mutations(mut self, enabled: bool) -> Self {
        self.strict_mutations = Some(enabled);
        self
    }

    pub fn max_pages(mut self, pages: usize) -> Self {
        self.max_pages = Some(pages);
        self
    }

    pub fn artist_column(mut self, column: impl Into<String>) -> Self {
        self.artist_column = Some(column.into());
        self
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either collection id is missing or empty, or both are the same
    /// - Caching is enabled without a cache directory or file system
    /// - `max_pages` is 0, `top_n` is 0 or the artist column is empty
    /// - Invalid removal is enabled with no sentinel titles
    pub fn build(self) -> Result<ReconcileConfig> {
        let source_id = self.source_id.ok_or_else(|| {
            Error::Config("Source collection id is required. Use .source_id() to set it.".to_string())
        })?;

        let target_id = self.target_id.ok_or_else(|| {
            Error::Config("Target collection id is required. Use .target_id() to set it.".to_string())
        })?;

        let cache_policy = self.cache_policy.unwrap_or_default();

        let file_system = match self.file_system {
            Some(fs) => Some(fs),
            None if cache_policy.any_enabled() => self
                .cache_dir
                .as_deref()
                .and_then(provide_default_file_system),
            None => None,
        };

        let config = ReconcileConfig {
            source_id,
            target_id,
            insert_limit: self.insert_limit.unwrap_or(DEFAULT_INSERT_LIMIT),
            cache_dir: self.cache_dir,
            cache_policy,
            file_system,
            remove_duplicates: self.remove_duplicates.unwrap_or(true),
            remove_invalid: self.remove_invalid.unwrap_or(true),
            invalid_titles: self.invalid_titles.unwrap_or_else(|| {
                DEFAULT_INVALID_TITLES
                    .iter()
                    .map(|t| t.to_string())
                    .collect()
            }),
            skip_invalid_source: self.skip_invalid_source.unwrap_or(true),
            source_selection: self.source_selection.unwrap_or_default(),
            strict_mutations: self.strict_mutations.unwrap_or(false),
            max_pages: self.max_pages,
            artist_column: self
                .artist_column
                .unwrap_or_else(|| DEFAULT_ARTIST_COLUMN.to_string()),
            top_n: self.top_n.unwrap_or(DEFAULT_TOP_N),
        };

        config.validate()?;

        Ok(config)
    }
}
