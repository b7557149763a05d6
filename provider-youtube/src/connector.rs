//! YouTube Data API connector implementation
//!
//! Implements the `RemoteCollectionClient` trait for YouTube playlists.

use async_trait::async_trait;
use bridge_traits::collection::{CollectionEntry, MediaStatistics, RemoteCollectionClient};
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use core_runtime::logging::redact_if_sensitive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{self, YouTubeError};
use crate::types::{PlaylistItemInsert, PlaylistItemListResponse, VideoListResponse};

/// YouTube Data API base URL
const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Maximum results per page (YouTube Data API limit)
const MAX_PAGE_SIZE: u32 = 50;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// YouTube Data API connector
///
/// Implements `RemoteCollectionClient` for YouTube Data API v3 playlists.
/// Each call issues exactly one HTTP request; nothing is retried here.
///
/// # Example
///
/// ```ignore
/// use provider_youtube::YouTubeConnector;
/// use bridge_traits::collection::RemoteCollectionClient;
///
/// let connector = YouTubeConnector::new(http_client, access_token);
/// let (entries, next_cursor) = connector.list_items("PL123", None).await?;
/// ```
pub struct YouTubeConnector {
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token with the `youtube` scope
    access_token: String,
}

impl YouTubeConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: String) -> Self {
        debug!(
            access_token = %redact_if_sensitive("access_token", &access_token),
            "Created YouTube connector"
        );
        Self {
            http_client,
            access_token,
        }
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .bearer_token(self.access_token.as_str())
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
    }

    /// Execute one request and classify a non-2xx status.
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> error::Result<HttpResponse> {
        let response = self.http_client.execute(request).await?;

        if response.is_success() {
            debug!("API request succeeded: status={}", response.status);
            Ok(response)
        } else {
            warn!("API request failed: status={}", response.status);
            Err(YouTubeError::from_status(response.status, &response.body))
        }
    }

    fn playlist_items_url(collection_id: &str, cursor: Option<&str>) -> String {
        let mut url = format!(
            "{}/playlistItems?part=snippet,contentDetails&maxResults={}&playlistId={}",
            YOUTUBE_API_BASE,
            MAX_PAGE_SIZE,
            urlencoding::encode(collection_id)
        );

        if let Some(page_token) = cursor {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(page_token)));
        }

        url
    }

    fn parse_count(field: &str, value: Option<&str>) -> error::Result<u64> {
        match value {
            None => Ok(0),
            Some(raw) => raw.parse().map_err(|e| {
                YouTubeError::ParseError(format!("Invalid {} '{}': {}", field, raw, e))
            }),
        }
    }
}

#[async_trait]
impl RemoteCollectionClient for YouTubeConnector {
    #[instrument(skip(self))]
    async fn list_items(
        &self,
        collection_id: &str,
        cursor: Option<String>,
    ) -> Result<(Vec<CollectionEntry>, Option<String>)> {
        let url = Self::playlist_items_url(collection_id, cursor.as_deref());
        let response = self.send(self.request(HttpMethod::Get, url)).await?;

        let page: PlaylistItemListResponse =
            serde_json::from_slice(&response.body).map_err(|e| {
                YouTubeError::ParseError(format!("Failed to parse playlist items: {}", e))
            })?;

        let mut entries = Vec::with_capacity(page.items.len());
        for item in page.items {
            let Some(video_id) = item.video_id().map(str::to_string) else {
                warn!("Skipping playlist item {} without a video id", item.id);
                continue;
            };
            entries.push(CollectionEntry::new(video_id, item.snippet.title, item.id));
        }

        // An empty token is treated the same as no token.
        let next_cursor = page.next_page_token.filter(|t| !t.is_empty());

        debug!(
            "Listed {} items, more pages: {}",
            entries.len(),
            next_cursor.is_some()
        );
        Ok((entries, next_cursor))
    }

    #[instrument(skip(self))]
    async fn insert_item(&self, collection_id: &str, media_id: &str) -> Result<()> {
        let url = format!("{}/playlistItems?part=snippet", YOUTUBE_API_BASE);
        let request = self
            .request(HttpMethod::Post, url)
            .json(&PlaylistItemInsert::video(collection_id, media_id))?;

        self.send(request).await?;
        info!("Inserted {} into {}", media_id, collection_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_membership(&self, membership_id: &str) -> Result<()> {
        let url = format!(
            "{}/playlistItems?id={}",
            YOUTUBE_API_BASE,
            urlencoding::encode(membership_id)
        );

        self.send(self.request(HttpMethod::Delete, url)).await?;
        info!("Removed membership {}", membership_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn media_statistics(&self, media_id: &str) -> Result<MediaStatistics> {
        let url = format!(
            "{}/videos?part=statistics&id={}",
            YOUTUBE_API_BASE,
            urlencoding::encode(media_id)
        );
        let response = self.send(self.request(HttpMethod::Get, url)).await?;

        let list: VideoListResponse = serde_json::from_slice(&response.body).map_err(|e| {
            YouTubeError::ParseError(format!("Failed to parse video statistics: {}", e))
        })?;

        let video = list
            .items
            .into_iter()
            .find(|v| v.id == media_id)
            .ok_or_else(|| YouTubeError::VideoNotFound {
                video_id: media_id.to_string(),
            })?;

        Ok(MediaStatistics {
            views: Self::parse_count("viewCount", video.statistics.view_count.as_deref())?,
            likes: Self::parse_count("likeCount", video.statistics.like_count.as_deref())?,
        })
    }
}
