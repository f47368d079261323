//! Error types for Gmail API calls.

use std::io;

/// Result type alias for Gmail operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Gmail client errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading or writing a snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The API answered with a non-success status.
    #[error("Gmail API returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Still rate limited after every retry.
    #[error("Gmail API rate limit persisted after {0} attempts")]
    RateLimited(u32),
}

impl Error {
    /// Returns true for 401 responses, meaning the access token expired.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}
