use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote call {operation} failed for {id}: {cause}")]
    RemoteTransient {
        operation: String,
        id: String,
        cause: String,
    },

    #[error("Remote call {operation} rejected credentials for {id}: {cause}")]
    RemoteAuth {
        operation: String,
        id: String,
        cause: String,
    },

    #[error("Local I/O error on {path}: {cause}")]
    LocalIo { path: String, cause: String },

    #[error("Missing required column '{column}' in {path}")]
    Validation { column: String, path: String },

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("{failed} of {attempted} mutations failed")]
    MutationsFailed { failed: usize, attempted: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Classifies a bridge failure from a remote call into auth vs transient.
    pub fn remote(operation: &str, id: &str, err: BridgeError) -> Self {
        let operation = operation.to_string();
        let id = id.to_string();
        let cause = err.to_string();

        if err.is_auth() {
            SyncError::RemoteAuth {
                operation,
                id,
                cause,
            }
        } else {
            SyncError::RemoteTransient {
                operation,
                id,
                cause,
            }
        }
    }

    /// Wraps a bridge failure from a filesystem call.
    pub fn local_io(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        SyncError::LocalIo {
            path: path.into(),
            cause: err.to_string(),
        }
    }

    /// Auth failures end the run.
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::RemoteAuth { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::RemoteTransient { .. })
    }
}

impl From<core_runtime::Error> for SyncError {
    fn from(err: core_runtime::Error) -> Self {
        SyncError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_classification() {
        let auth = SyncError::remote(
            "list_items",
            "PL1",
            BridgeError::AuthenticationFailed("401".to_string()),
        );
        assert!(auth.is_auth());
        assert!(!auth.is_transient());

        let transient = SyncError::remote(
            "insert_item",
            "vid1",
            BridgeError::OperationFailed("503".to_string()),
        );
        assert!(transient.is_transient());
        assert!(transient.to_string().contains("insert_item"));
        assert!(transient.to_string().contains("vid1"));
    }

    #[test]
    fn test_validation_message_names_column() {
        let err = SyncError::Validation {
            column: "Artist".to_string(),
            path: "membership_PL1.csv".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing required column 'Artist' in membership_PL1.csv"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err: SyncError = core_runtime::Error::Config("bad".to_string()).into();
        assert!(matches!(err, SyncError::Config(_)));
    }
}
