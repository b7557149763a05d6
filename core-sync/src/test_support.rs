//! In-memory `RemoteCollectionClient` used by unit tests.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{CollectionEntry, MediaStatistics, RemoteCollectionClient};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Clone, Copy)]
pub(crate) enum FailureKind {
    Transient,
    Auth,
}

impl FailureKind {
    fn to_error(self, what: &str) -> BridgeError {
        match self {
            FailureKind::Transient => BridgeError::OperationFailed(format!("{} unavailable", what)),
            FailureKind::Auth => BridgeError::AuthenticationFailed(format!("{} unauthorized", what)),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeCollectionClient {
    pages: HashMap<String, Vec<Vec<CollectionEntry>>>,
    page_failures: HashMap<(String, usize), FailureKind>,
    insert_failures: HashMap<String, FailureKind>,
    remove_failures: HashMap<String, FailureKind>,
    statistics: HashMap<String, MediaStatistics>,
    statistics_failures: HashSet<String>,
    pub list_calls: Mutex<usize>,
    pub statistics_calls: Mutex<usize>,
    pub inserted: Mutex<Vec<(String, String)>>,
    pub removed: Mutex<Vec<String>>,
}

/// Shorthand for `CollectionEntry::new`.
pub(crate) fn entry(media_id: &str, title: &str, membership_id: &str) -> CollectionEntry {
    CollectionEntry::new(media_id, title, membership_id)
}

impl FakeCollectionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, collection_id: &str, pages: Vec<Vec<CollectionEntry>>) -> Self {
        self.pages.insert(collection_id.to_string(), pages);
        self
    }

    /// Single-page collection.
    pub fn with_items(self, collection_id: &str, items: Vec<CollectionEntry>) -> Self {
        self.with_pages(collection_id, vec![items])
    }

    pub fn fail_page(mut self, collection_id: &str, page: usize, kind: FailureKind) -> Self {
        self.page_failures
            .insert((collection_id.to_string(), page), kind);
        self
    }

    pub fn fail_insert(mut self, media_id: &str, kind: FailureKind) -> Self {
        self.insert_failures.insert(media_id.to_string(), kind);
        self
    }

    pub fn fail_remove(mut self, membership_id: &str, kind: FailureKind) -> Self {
        self.remove_failures.insert(membership_id.to_string(), kind);
        self
    }

    pub fn with_statistics(mut self, media_id: &str, views: u64, likes: u64) -> Self {
        self.statistics
            .insert(media_id.to_string(), MediaStatistics { views, likes });
        self
    }

    pub fn fail_statistics(mut self, media_id: &str) -> Self {
        self.statistics_failures.insert(media_id.to_string());
        self
    }

    pub fn inserted_ids(&self) -> Vec<String> {
        self.inserted
            .lock()
            .unwrap()
            .iter()
            .map(|(_, media_id)| media_id.clone())
            .collect()
    }

    pub fn removed_ids(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    pub fn list_call_count(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    pub fn statistics_call_count(&self) -> usize {
        *self.statistics_calls.lock().unwrap()
    }
}

#[async_trait]
impl RemoteCollectionClient for FakeCollectionClient {
    async fn list_items(
        &self,
        collection_id: &str,
        cursor: Option<String>,
    ) -> Result<(Vec<CollectionEntry>, Option<String>)> {
        *self.list_calls.lock().unwrap() += 1;

        let page: usize = match cursor {
            Some(c) => c
                .parse()
                .map_err(|_| BridgeError::OperationFailed(format!("bad cursor {}", c)))?,
            None => 0,
        };

        if let Some(kind) = self.page_failures.get(&(collection_id.to_string(), page)) {
            return Err(kind.to_error("list_items"));
        }

        let pages = self.pages.get(collection_id).cloned().unwrap_or_default();
        let items = pages.get(page).cloned().unwrap_or_default();
        let next = if page + 1 < pages.len() {
            Some((page + 1).to_string())
        } else {
            None
        };

        Ok((items, next))
    }

    async fn insert_item(&self, collection_id: &str, media_id: &str) -> Result<()> {
        if let Some(kind) = self.insert_failures.get(media_id) {
            return Err(kind.to_error("insert_item"));
        }
        self.inserted
            .lock()
            .unwrap()
            .push((collection_id.to_string(), media_id.to_string()));
        Ok(())
    }

    async fn remove_membership(&self, membership_id: &str) -> Result<()> {
        if let Some(kind) = self.remove_failures.get(membership_id) {
            return Err(kind.to_error("remove_membership"));
        }
        self.removed.lock().unwrap().push(membership_id.to_string());
        Ok(())
    }

    async fn media_statistics(&self, media_id: &str) -> Result<MediaStatistics> {
        *self.statistics_calls.lock().unwrap() += 1;
        if self.statistics_failures.contains(media_id) {
            return Err(FailureKind::Transient.to_error("media_statistics"));
        }
        Ok(self.statistics.get(media_id).copied().unwrap_or_default())
    }
}
