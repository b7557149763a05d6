//! # Collection Fetcher
//!
//! Follows a remote collection's pagination cursor until it is exhausted and
//! returns the concatenated pages as a [`CollectionSnapshot`].
//!
//! A transient failure on any page stops pagination and yields what was
//! fetched so far, flagged [`Completeness::Partial`]. Callers must not use a
//! partial snapshot for deletion decisions. An authentication failure is
//! propagated as [`SyncError::RemoteAuth`] with no snapshot.

use crate::error::{Result, SyncError};
use crate::models::{CollectionSnapshot, Completeness, MediaItem};
use bridge_traits::RemoteCollectionClient;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Reads whole collections through a [`RemoteCollectionClient`].
pub struct CollectionFetcher {
    client: Arc<dyn RemoteCollectionClient>,
    max_pages: Option<usize>,
}

impl CollectionFetcher {
    pub fn new(client: Arc<dyn RemoteCollectionClient>) -> Self {
        Self {
            client,
            max_pages: None,
        }
    }

    /// Stops after `max_pages` pages, yielding a partial snapshot if more remain.
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Fetches every page of `collection_id` in order.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::RemoteAuth`] if the remote rejects the
    /// credentials on any page. Other page failures do not error; they end
    /// pagination and mark the snapshot partial.
    #[instrument(skip(self), fields(collection_id = %collection_id))]
    pub async fn fetch(&self, collection_id: &str) -> Result<CollectionSnapshot> {
        let mut items: Vec<MediaItem> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages_fetched = 0usize;

        loop {
            if let Some(limit) = self.max_pages {
                if pages_fetched >= limit {
                    warn!(
                        "Stopped after {} pages with a cursor still pending for {}",
                        pages_fetched, collection_id
                    );
                    return Ok(CollectionSnapshot::with_completeness(
                        collection_id,
                        items,
                        Completeness::Partial {
                            pages_fetched,
                            cause: format!("page limit {} reached", limit),
                        },
                    ));
                }
            }

            debug!("Fetching page {} (cursor: {:?})", pages_fetched + 1, cursor);

            let (entries, next_cursor) = match self
                .client
                .list_items(collection_id, cursor.clone())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    let err = SyncError::remote("list_items", collection_id, e);
                    if err.is_auth() {
                        return Err(err);
                    }

                    warn!(
                        "Pagination of {} aborted after {} pages: {}",
                        collection_id, pages_fetched, err
                    );
                    return Ok(CollectionSnapshot::with_completeness(
                        collection_id,
                        items,
                        Completeness::Partial {
                            pages_fetched,
                            cause: err.to_string(),
                        },
                    ));
                }
            };

            pages_fetched += 1;
            let offset = items.len();
            items.extend(
                entries
                    .into_iter()
                    .enumerate()
                    .map(|(i, entry)| MediaItem::from_entry(entry, offset + i)),
            );

            // An empty cursor string is terminal, same as no cursor.
            cursor = next_cursor.filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        info!(
            "Fetched {} items from {} in {} pages",
            items.len(),
            collection_id,
            pages_fetched
        );

        Ok(CollectionSnapshot::complete(collection_id, items))
    }
}
