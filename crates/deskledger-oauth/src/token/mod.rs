//! Access tokens and token endpoint payloads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A token is renewed this long before the server would reject it.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Bearer credential for Gmail requests, plus what is needed to renew it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Value sent in the `Authorization` header; empty until first refresh.
    pub access_token: String,
    /// Always `Bearer` for Google.
    pub token_type: String,
    /// Instant the access token stops working.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Long-lived grant used to mint new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Space-separated scopes actually granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Token {
    /// Token known only by its refresh grant, as loaded from disk.
    #[must_use]
    pub fn from_refresh_token(refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: String::new(),
            token_type: BEARER.to_string(),
            expires_at: None,
            refresh_token: Some(refresh_token.into()),
            scope: None,
        }
    }

    /// Token from a token endpoint reply received at `issued_at`.
    #[must_use]
    pub fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| issued_at + Duration::seconds(i64::from(secs)));
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at,
            refresh_token: response.refresh_token,
            scope: response.scope,
        }
    }

    /// True when the access token is missing or within a minute of expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        if self.access_token.is_empty() {
            return true;
        }
        let deadline = Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS);
        self.expires_at.is_some_and(|at| deadline >= at)
    }

    /// The refresh grant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRefreshToken`] if it is absent or empty.
    pub fn refresh_token(&self) -> Result<&str> {
        match self.refresh_token.as_deref() {
            Some(grant) if !grant.is_empty() => Ok(grant),
            _ => Err(Error::NoRefreshToken),
        }
    }
}

const BEARER: &str = "Bearer";

/// Successful token endpoint reply.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// New access token.
    pub access_token: String,
    /// Defaults to `Bearer` when omitted.
    #[serde(default = "bearer")]
    pub token_type: String,
    /// Lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u32>,
    /// Present on code exchange; usually absent on refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn bearer() -> String {
    BEARER.to_string()
}

/// Token endpoint error body (RFC 6749 section 5.2).
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Error code such as `invalid_grant`.
    pub error: String,
    /// Optional detail.
    #[serde(default)]
    pub error_description: String,
}

impl From<ErrorResponse> for Error {
    fn from(body: ErrorResponse) -> Self {
        Self::rejected(body.error, body.error_description)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn reply(expires_in: Option<u32>) -> TokenResponse {
        serde_json::from_value(serde_json::json!({
            "access_token": "ya29.a0Af",
            "expires_in": expires_in,
            "refresh_token": "1//0g-refresh",
            "scope": "https://www.googleapis.com/auth/gmail.readonly",
        }))
        .unwrap()
    }

    #[test]
    fn test_from_response_sets_expiry() {
        let issued_at = Utc::now();
        let token = Token::from_response(reply(Some(3599)), issued_at);
        assert_eq!(token.access_token, "ya29.a0Af");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_at, Some(issued_at + Duration::seconds(3599)));
        assert!(!token.is_expired());
        assert_eq!(token.refresh_token().unwrap(), "1//0g-refresh");
    }

    #[test]
    fn test_expiry_margin() {
        assert!(Token::from_response(reply(Some(30)), Utc::now()).is_expired());
        assert!(Token::from_response(reply(Some(3600)), Utc::now() - Duration::hours(2)).is_expired());
        assert!(!Token::from_response(reply(None), Utc::now()).is_expired());
    }

    #[test]
    fn test_refresh_only_token_needs_refresh() {
        let token = Token::from_refresh_token("1//0g-refresh");
        assert!(token.is_expired());
        assert_eq!(token.refresh_token().unwrap(), "1//0g-refresh");
    }

    #[test]
    fn test_empty_refresh_token_is_missing() {
        let mut token = Token::from_response(reply(None), Utc::now());
        token.refresh_token = Some(String::new());
        assert!(matches!(token.refresh_token(), Err(Error::NoRefreshToken)));
    }

    #[test]
    fn test_error_body_converts() {
        let body: ErrorResponse = serde_json::from_str(r#"{"error":"invalid_grant"}"#).unwrap();
        assert!(Error::from(body).is_invalid_grant());
    }
}
