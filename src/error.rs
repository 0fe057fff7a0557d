//! Error types shared across the fetch, storage and submission seams.

use thiserror::Error;

/// Transport-level failure: the request never produced an HTTP response.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("invalid url {0}")]
    InvalidUrl(String),
}

/// Failure while fetching or decoding a track listing.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("rate limit exceeded (HTTP {0})")]
    RateLimited(u16),
    #[error("source returned HTTP {0}")]
    Status(u16),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("could not decode listing: {0}")]
    Decode(String),
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },
}

impl FetchError {
    /// Classify a non-2xx status; 403 and 429 are GitHub's rate-limit answers.
    pub fn from_status(status: u16) -> Self {
        match status {
            403 | 429 => Self::RateLimited(status),
            other => Self::Status(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure of a contact-form POST once it left the client.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("endpoint rejected submission (HTTP {status})")]
    Rejected { status: u16, message: Option<String> },
}
