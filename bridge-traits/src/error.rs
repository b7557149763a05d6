use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// Credentials were rejected by the remote service.
    ///
    /// Callers treat this as fatal; it is never retried or downgraded to a
    /// per-item failure.
    #[error("Authentication rejected: {0}")]
    AuthenticationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether this error means the credentials are no longer usable.
    pub fn is_auth(&self) -> bool {
        matches!(self, BridgeError::AuthenticationFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
