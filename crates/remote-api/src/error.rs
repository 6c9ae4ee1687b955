//! Error types for the remote API crate.

use thiserror::Error;

use ingot_core::errors::{Error as CoreError, RemoteError, StorageError};

/// Result type alias for remote API operations.
pub type Result<T> = std::result::Result<T, RemoteApiError>;

/// Errors that can occur while talking to the holdings service.
#[derive(Debug, Error)]
pub enum RemoteApiError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API error response from the service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Authentication error (missing or invalid token)
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl RemoteApiError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}

/// Conversion to the core error taxonomy.
///
/// A 404 means the targeted record does not exist and must propagate as
/// NotFound; auth rejections map to their own variant; every other failure
/// collapses into the remote category the sync coordinator recovers from.
impl From<RemoteApiError> for CoreError {
    fn from(err: RemoteApiError) -> Self {
        match err {
            RemoteApiError::Http(e) => CoreError::Remote(RemoteError::Unavailable(e.to_string())),
            RemoteApiError::Json(e) => {
                CoreError::Remote(RemoteError::Unavailable(format!("malformed response: {}", e)))
            }
            RemoteApiError::Api {
                status: 404,
                message,
            } => CoreError::Storage(StorageError::NotFound(message)),
            RemoteApiError::Api { status, message } if status == 401 || status == 403 => {
                CoreError::Remote(RemoteError::Auth(message))
            }
            RemoteApiError::Api { status, message } => {
                CoreError::Remote(RemoteError::Api { status, message })
            }
            RemoteApiError::Auth(message) => CoreError::Remote(RemoteError::Auth(message)),
        }
    }
}
