//! Authorization errors.

use std::io;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure while authorizing or renewing Gmail access.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a credentials file, or the loopback socket.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport failure talking to the token endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed JSON in a response or credentials file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The authorization server refused the request.
    #[error("authorization server rejected the request: {code} ({description})")]
    Rejected {
        /// Error code such as `invalid_grant`.
        code: String,
        /// Server-provided detail, possibly empty.
        description: String,
    },

    /// A refresh was attempted without a refresh token.
    #[error("no refresh token; authorize again")]
    NoRefreshToken,

    /// Consent was not completed in time.
    #[error("no authorization redirect within {0} seconds")]
    Timeout(u64),

    /// The user declined on the consent page.
    #[error("access was denied on the consent page")]
    AccessDenied,

    /// The redirect carried a `state` different from the one sent.
    #[error("authorization state mismatch")]
    StateMismatch,

    /// The redirect could not be understood.
    #[error("invalid authorization redirect: {0}")]
    InvalidRedirect(String),

    /// Client secrets or provider settings are unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An endpoint or redirect URL failed to parse.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Builds a [`Error::Rejected`] from an OAuth error code and description.
    #[must_use]
    pub fn rejected(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            description: description.into(),
        }
    }

    /// True when a refresh token was revoked or expired, so consent has to
    /// run again.
    #[must_use]
    pub fn is_invalid_grant(&self) -> bool {
        matches!(self, Self::Rejected { code, .. } if code == "invalid_grant")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_grant_detection() {
        assert!(Error::rejected("invalid_grant", "Token has been expired or revoked.").is_invalid_grant());
        assert!(!Error::rejected("invalid_client", "").is_invalid_grant());
        assert!(!Error::AccessDenied.is_invalid_grant());
    }

    #[test]
    fn test_rejected_message() {
        let err = Error::rejected("invalid_client", "The OAuth client was not found.");
        assert_eq!(
            err.to_string(),
            "authorization server rejected the request: invalid_client (The OAuth client was not found.)"
        );
    }
}
