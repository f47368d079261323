//! Authorization server endpoints.

use crate::error::{Error, Result};
use url::Url;

/// Read-only Gmail scope: list labels and threads, never modify mail.
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Google authorization endpoint.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Endpoints and default scopes of an authorization server.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Display name, also used to detect Google.
    pub name: String,
    /// Consent page.
    pub auth_url: Url,
    /// Token endpoint for code exchange and refresh.
    pub token_url: Url,
    /// Scopes requested when the caller names none.
    pub default_scopes: Vec<String>,
}

impl Provider {
    /// Provider with no default scopes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if either endpoint fails to parse.
    pub fn new(
        name: impl Into<String>,
        auth_url: impl AsRef<str>,
        token_url: impl AsRef<str>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            auth_url: Url::parse(auth_url.as_ref())?,
            token_url: Url::parse(token_url.as_ref())?,
            default_scopes: Vec::new(),
        })
    }

    /// Replaces the default scopes.
    #[must_use]
    pub fn with_default_scopes(mut self, scopes: Vec<String>) -> Self {
        self.default_scopes = scopes;
        self
    }

    /// Google provider limited to read-only Gmail access.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in endpoints; the `Result` mirrors [`Provider::new`].
    pub fn google() -> Result<Self> {
        Ok(Self::new("Google", GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL)?
            .with_default_scopes(vec![GMAIL_READONLY_SCOPE.to_string()]))
    }

    /// Returns true for Google, which needs offline access parameters to
    /// issue a refresh token.
    #[must_use]
    pub fn is_google(&self) -> bool {
        self.name == "Google"
    }

    /// Checks that both endpoints are HTTP(S).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending endpoint.
    pub fn validate(&self) -> Result<()> {
        for (field, url) in [("auth_url", &self.auth_url), ("token_url", &self.token_url)] {
            if !matches!(url.scheme(), "https" | "http") {
                return Err(Error::Config(format!(
                    "{field} must be an http(s) URL, got {url}"
                )));
            }
        }
        Ok(())
    }
}
