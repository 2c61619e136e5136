use reqwest::StatusCode;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("request did not complete: {0}")]
    Network(#[source] reqwest::Error),
    #[error("API key is missing or invalid")]
    Unauthorized,
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    /// The request could not be assembled locally
    #[error("failed to build request: {0}")]
    Request(#[source] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
    /// An authenticated call was attempted with no stored token
    #[error("not signed in")]
    MissingCredential,
    #[error("failed to read local file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::MissingCredential)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::Conflict { .. } => Some(StatusCode::CONFLICT),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message the backend attached to the failure, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Conflict { message } | ApiError::Status { message, .. } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}
