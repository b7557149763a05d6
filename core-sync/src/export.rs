//! # Statistics and Membership Exports
//!
//! Row sets derived from a whole collection, memoized through the
//! [`ResultCache`]. On a cache hit nothing is fetched. A partial snapshot is
//! exported but never persisted, so the next call fetches again.

use crate::cache::{CacheRecord, MembershipRow, ResultCache, StatisticsRow};
use crate::error::{Result, SyncError};
use crate::fetcher::CollectionFetcher;
use crate::models::CollectionSnapshot;
use crate::title::parse_title;
use bridge_traits::{MediaStatistics, RemoteCollectionClient};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Builds `Title, Views, Likes` rows for a collection.
pub struct StatisticsCollector {
    client: Arc<dyn RemoteCollectionClient>,
    fetcher: CollectionFetcher,
    cache: Option<Arc<ResultCache>>,
}

impl StatisticsCollector {
    pub fn new(client: Arc<dyn RemoteCollectionClient>, cache: Option<Arc<ResultCache>>) -> Self {
        Self {
            fetcher: CollectionFetcher::new(Arc::clone(&client)),
            client,
            cache,
        }
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.fetcher = self.fetcher.with_max_pages(max_pages);
        self
    }

    /// Rows in collection order.
    ///
    /// A failed statistics lookup for one item is logged and recorded as
    /// zero views and zero likes.
    ///
    /// # Errors
    ///
    /// - [`SyncError::RemoteAuth`] if the remote rejects the credentials
    /// - cache errors from [`ResultCache::load`] and [`ResultCache::store`]
    #[instrument(skip(self))]
    pub async fn collect(&self, collection_id: &str) -> Result<Vec<StatisticsRow>> {
        if let Some(rows) = load_cached(self.cache.as_deref(), collection_id).await? {
            return Ok(rows);
        }

        let snapshot = self.fetcher.fetch(collection_id).await?;
        let mut rows = Vec::with_capacity(snapshot.len());

        for item in &snapshot.items {
            let stats = match self.client.media_statistics(&item.id).await {
                Ok(stats) => stats,
                Err(e) => {
                    let err = SyncError::remote("media_statistics", &item.id, e);
                    if err.is_auth() {
                        return Err(err);
                    }
                    warn!("Using zero statistics for {}: {}", item.id, err);
                    MediaStatistics::default()
                }
            };

            rows.push(StatisticsRow {
                title: item.title.clone(),
                views: stats.views,
                likes: stats.likes,
            });
        }

        store_if_complete(self.cache.as_deref(), &snapshot, &rows).await?;
        info!("Collected statistics for {} items", rows.len());
        Ok(rows)
    }
}

/// Builds `Title, Media ID, Artist, Song` rows for a collection.
pub struct MembershipExporter {
    fetcher: CollectionFetcher,
    cache: Option<Arc<ResultCache>>,
}

impl MembershipExporter {
    pub fn new(client: Arc<dyn RemoteCollectionClient>, cache: Option<Arc<ResultCache>>) -> Self {
        Self {
            fetcher: CollectionFetcher::new(client),
            cache,
        }
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.fetcher = self.fetcher.with_max_pages(max_pages);
        self
    }

    /// Rows in collection order, artist `"Unknown"` when the title has none.
    #[instrument(skip(self))]
    pub async fn export(&self, collection_id: &str) -> Result<Vec<MembershipRow>> {
        if let Some(rows) = load_cached(self.cache.as_deref(), collection_id).await? {
            return Ok(rows);
        }

        let snapshot = self.fetcher.fetch(collection_id).await?;
        let rows = membership_rows(&snapshot);

        store_if_complete(self.cache.as_deref(), &snapshot, &rows).await?;
        info!("Exported {} memberships", rows.len());
        Ok(rows)
    }
}

/// Membership rows for an already fetched snapshot.
pub fn membership_rows(snapshot: &CollectionSnapshot) -> Vec<MembershipRow> {
    snapshot
        .items
        .iter()
        .map(|item| {
            let parsed = parse_title(&item.title);
            MembershipRow {
                title: item.title.clone(),
                media_id: item.id.clone(),
                artist: parsed.artist_or_unknown().to_string(),
                song: parsed.song,
            }
        })
        .collect()
}

async fn load_cached<R: CacheRecord>(
    cache: Option<&ResultCache>,
    collection_id: &str,
) -> Result<Option<Vec<R>>> {
    match cache {
        Some(cache) => cache.load::<R>(collection_id).await,
        None => Ok(None),
    }
}

async fn store_if_complete<R: CacheRecord>(
    cache: Option<&ResultCache>,
    snapshot: &CollectionSnapshot,
    rows: &[R],
) -> Result<()> {
    let Some(cache) = cache else {
        return Ok(());
    };

    if !snapshot.is_complete() {
        warn!(
            "Not caching {} rows for {}: snapshot is partial",
            R::KIND,
            snapshot.collection_id
        );
        return Ok(());
    }

    cache.store(&snapshot.collection_id, rows).await
}
