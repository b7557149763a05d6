//! Error types for the YouTube provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

use crate::types::ApiErrorResponse;

/// YouTube provider errors
#[derive(Error, Debug)]
pub enum YouTubeError {
    /// Token missing, expired, or lacking the required scope
    #[error("Authentication failed (status {status_code}): {message}")]
    AuthenticationFailed { status_code: u16, message: String },

    /// API request returned any other non-2xx status
    #[error("YouTube API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// `videos.list` returned no item for the requested id
    #[error("Video not found: {video_id}")]
    VideoNotFound { video_id: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for YouTube operations
pub type Result<T> = std::result::Result<T, YouTubeError>;

/// 403 reasons that mean the credential itself was refused. Every other 403
/// (`quotaExceeded`, `rateLimitExceeded`, item-level refusals) is an API error.
const AUTH_REASONS: &[&str] = &[
    "authError",
    "insufficientPermissions",
    "forbidden",
    "unauthorized",
];

impl YouTubeError {
    /// Classify a non-2xx response.
    ///
    /// 401 is always an authentication failure. 403 is one only when the
    /// error envelope carries an auth reason.
    pub fn from_status(status_code: u16, body: &[u8]) -> Self {
        let message = String::from_utf8_lossy(body).to_string();
        let is_auth = match status_code {
            401 => true,
            403 => ApiErrorResponse::parse(body)
                .is_some_and(|parsed| parsed.reasons().any(|r| AUTH_REASONS.contains(&r))),
            _ => false,
        };

        if is_auth {
            YouTubeError::AuthenticationFailed {
                status_code,
                message,
            }
        } else {
            YouTubeError::ApiError {
                status_code,
                message,
            }
        }
    }
}

impl From<YouTubeError> for BridgeError {
    fn from(error: YouTubeError) -> Self {
        match error {
            YouTubeError::AuthenticationFailed {
                status_code,
                message,
            } => BridgeError::AuthenticationFailed(format!(
                "status {}: {}",
                status_code, message
            )),
            YouTubeError::ApiError {
                status_code,
                message,
            } => BridgeError::OperationFailed(format!(
                "API error (status {}): {}",
                status_code, message
            )),
            YouTubeError::VideoNotFound { video_id } => {
                BridgeError::OperationFailed(format!("Video not found: {}", video_id))
            }
            YouTubeError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            YouTubeError::BridgeError(e) => e,
        }
    }
}
