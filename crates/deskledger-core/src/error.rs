//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur while exporting results.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
