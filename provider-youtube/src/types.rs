//! YouTube Data API response types
//!
//! Data structures for (de)serializing YouTube Data API v3 payloads.

use serde::{Deserialize, Serialize};

/// `playlistItems.list` response
///
/// See: https://developers.google.com/youtube/v3/docs/playlistItems/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,

    /// Token for next page, absent on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Playlist item resource. Its `id` identifies the membership, not the video.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub id: String,

    pub snippet: PlaylistItemSnippet,

    #[serde(default)]
    pub content_details: Option<PlaylistItemContentDetails>,
}

impl PlaylistItem {
    /// Video id, preferring `contentDetails.videoId` over `snippet.resourceId`.
    pub fn video_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|d| d.video_id.as_deref())
            .or(self.snippet.resource_id.video_id.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub position: Option<u32>,

    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    #[serde(default)]
    pub video_id: Option<String>,
}

/// Body of `playlistItems.insert`
#[derive(Debug, Serialize)]
pub struct PlaylistItemInsert {
    pub snippet: PlaylistItemInsertSnippet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemInsertSnippet {
    pub playlist_id: String,
    pub resource_id: ResourceId,
}

impl PlaylistItemInsert {
    pub fn video(playlist_id: &str, video_id: &str) -> Self {
        Self {
            snippet: PlaylistItemInsertSnippet {
                playlist_id: playlist_id.to_string(),
                resource_id: ResourceId {
                    kind: "youtube#video".to_string(),
                    video_id: Some(video_id.to_string()),
                },
            },
        }
    }
}

/// `videos.list?part=statistics` response
///
/// See: https://developers.google.com/youtube/v3/docs/videos/list
#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Debug, Deserialize)]
pub struct Video {
    pub id: String,

    #[serde(default)]
    pub statistics: VideoStatistics,
}

/// Counters arrive as decimal strings. `likeCount` is omitted when the
/// owner hides likes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default)]
    pub view_count: Option<String>,

    #[serde(default)]
    pub like_count: Option<String>,
}

/// Error envelope returned with non-2xx statuses
///
/// See: https://developers.google.com/youtube/v3/docs/errors
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorResponse {
    /// Parses an error body, `None` when it is not the JSON envelope.
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    pub fn reasons(&self) -> impl Iterator<Item = &str> {
        self.error
            .errors
            .iter()
            .filter_map(|detail| detail.reason.as_deref())
    }
}
