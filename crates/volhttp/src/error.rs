//! Error types for the volhttp crate.
//!
//! These never cross the public API: [`crate::HttpClient`] folds every
//! failure into a single text line.

use thiserror::Error;

/// Outbound request failures.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("{0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ureq::Transport> for HttpError {
    fn from(t: ureq::Transport) -> Self {
        HttpError::Transport(t.to_string())
    }
}

pub type HttpResult<T> = Result<T, HttpError>;
