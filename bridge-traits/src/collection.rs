//! Remote Collection Abstraction
//!
//! Provides the capability object the core uses to read and mutate a remote
//! ordered media collection (a playlist).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One membership record as returned by a collection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    /// Identifier of the underlying media item
    pub media_id: String,
    /// Display title at listing time
    pub title: String,
    /// Identifier of this specific placement in the collection
    pub membership_id: String,
}

impl CollectionEntry {
    pub fn new(
        media_id: impl Into<String>,
        title: impl Into<String>,
        membership_id: impl Into<String>,
    ) -> Self {
        Self {
            media_id: media_id.into(),
            title: title.into(),
            membership_id: membership_id.into(),
        }
    }
}

/// Engagement counters for a single media item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStatistics {
    pub views: u64,
    pub likes: u64,
}

/// Remote collection client trait
///
/// A single capability object, built once with whatever session the external
/// credential provider produced and shared by reference with every component
/// that talks to the remote service.
///
/// # Error contract
///
/// - [`BridgeError::AuthenticationFailed`](crate::error::BridgeError::AuthenticationFailed)
///   when the credentials are rejected
/// - any other variant for network, quota, or service failures
///
/// # Example
///
/// ```ignore
/// use bridge_traits::collection::RemoteCollectionClient;
///
/// async fn first_page(client: &dyn RemoteCollectionClient) -> Result<usize> {
///     let (entries, _next) = client.list_items("PL123", None).await?;
///     Ok(entries.len())
/// }
/// ```
#[async_trait]
pub trait RemoteCollectionClient: Send + Sync {
    /// List one page of a collection
    ///
    /// Returns the page's entries in collection order and the cursor for the
    /// next page, or `None` when the listing is exhausted.
    async fn list_items(
        &self,
        collection_id: &str,
        cursor: Option<String>,
    ) -> Result<(Vec<CollectionEntry>, Option<String>)>;

    /// Append a media item to a collection
    async fn insert_item(&self, collection_id: &str, media_id: &str) -> Result<()>;

    /// Remove one specific membership record
    async fn remove_membership(&self, membership_id: &str) -> Result<()>;

    /// Fetch engagement counters for a media item
    async fn media_statistics(&self, media_id: &str) -> Result<MediaStatistics>;
}
