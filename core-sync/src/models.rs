//! # Collection Snapshot Types
//!
//! A [`CollectionSnapshot`] is the ordered list of [`MediaItem`]s captured
//! from one remote collection at one point in time, plus a flag saying
//! whether pagination ran to the end.

use bridge_traits::CollectionEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One membership of a media item in a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Identity of the underlying media; repeats are duplicates
    pub id: String,
    pub title: String,
    /// Identity of this placement; what removals target
    pub membership_id: String,
    /// Zero-based position in the snapshot
    pub position: usize,
}

impl MediaItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        membership_id: impl Into<String>,
        position: usize,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            membership_id: membership_id.into(),
            position,
        }
    }

    pub(crate) fn from_entry(entry: CollectionEntry, position: usize) -> Self {
        Self {
            id: entry.media_id,
            title: entry.title,
            membership_id: entry.membership_id,
            position,
        }
    }
}

/// Whether a snapshot covers the whole remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Completeness {
    Complete,
    /// Pagination stopped early; the id set is not authoritative.
    Partial { pages_fetched: usize, cause: String },
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        matches!(self, Completeness::Complete)
    }
}

/// Ordered items of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub collection_id: String,
    pub items: Vec<MediaItem>,
    pub completeness: Completeness,
}

impl CollectionSnapshot {
    /// Builds a complete snapshot, assigning positions in iteration order.
    ///
    /// ```
    /// use core_sync::models::{CollectionSnapshot, MediaItem};
    ///
    /// let snapshot = CollectionSnapshot::complete(
    ///     "PL1",
    ///     vec![
    ///         MediaItem::new("a", "A", "m1", 0),
    ///         MediaItem::new("b", "B", "m2", 0),
    ///     ],
    /// );
    /// assert_eq!(snapshot.items[1].position, 1);
    /// ```
    pub fn complete(collection_id: impl Into<String>, items: Vec<MediaItem>) -> Self {
        Self::with_completeness(collection_id, items, Completeness::Complete)
    }

    pub fn with_completeness(
        collection_id: impl Into<String>,
        items: Vec<MediaItem>,
        completeness: Completeness,
    ) -> Self {
        let items = items
            .into_iter()
            .enumerate()
            .map(|(position, mut item)| {
                item.position = position;
                item
            })
            .collect();

        Self {
            collection_id: collection_id.into(),
            items,
            completeness,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completeness.is_complete()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Set of media ids present in the snapshot.
    pub fn id_set(&self) -> HashSet<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }
}
