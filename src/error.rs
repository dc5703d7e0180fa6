//! Errors raised while talking to the CRM backend and its collaborators

use thiserror::Error;

/// Failure of one HTTP call. Display strings are shown to the operator.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out ({0}s)")]
    Timeout(u64),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("{0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Classify a reqwest failure the same way for every endpoint
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout_secs)
        } else if err.is_connect() {
            ApiError::Connect(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
