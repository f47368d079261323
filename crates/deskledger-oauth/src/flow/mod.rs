//! Authorization code flow for installed apps.

mod code;
mod loopback;
mod pkce;

pub use code::AuthorizationCodeFlow;
pub use loopback::{CallbackParams, LoopbackReceiver};
pub use pkce::PkceChallenge;

use chrono::Utc;
use reqwest::Client;
use tracing::debug;

use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::token::{ErrorResponse, Token, TokenResponse};

/// What is traded at the token endpoint.
enum Grant<'a> {
    Refresh {
        refresh_token: &'a str,
    },
    Code {
        code: &'a str,
        redirect_uri: Option<&'a str>,
        code_verifier: Option<&'a str>,
    },
}

impl Grant<'_> {
    const fn name(&self) -> &'static str {
        match self {
            Self::Refresh { .. } => "refresh_token",
            Self::Code { .. } => "authorization_code",
        }
    }
}

/// A registered OAuth client and the provider it talks to.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    /// Client id from the console.
    pub client_id: String,
    /// Secret; installed apps still receive one from Google.
    pub client_secret: Option<String>,
    /// Loopback URI registered for the code flow.
    pub redirect_uri: Option<String>,
    /// Endpoints and scopes.
    pub provider: Provider,
    http: Client,
}

impl OAuthClient {
    /// Client without secret or redirect URI.
    #[must_use]
    pub fn new(client_id: impl Into<String>, provider: Provider) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: None,
            provider,
            http: Client::new(),
        }
    }

    /// Adds the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Adds the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Mints a new access token from `token`'s refresh grant.
    ///
    /// Google rarely rotates refresh tokens; when the reply carries none,
    /// the old one is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRefreshToken`] before any request if `token` has
    /// no grant, or the server's refusal.
    pub async fn refresh_token(&self, token: &Token) -> Result<Token> {
        let refresh_token = token.refresh_token()?;
        let mut renewed = self.request(Grant::Refresh { refresh_token }).await?;
        if renewed.refresh_token.is_none() {
            renewed.refresh_token.clone_from(&token.refresh_token);
        }
        Ok(renewed)
    }

    /// Trades an authorization code for tokens.
    pub(crate) async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
        code_verifier: Option<&str>,
    ) -> Result<Token> {
        self.request(Grant::Code {
            code,
            redirect_uri: redirect_uri.or(self.redirect_uri.as_deref()),
            code_verifier,
        })
        .await
    }

    async fn request(&self, grant: Grant<'_>) -> Result<Token> {
        debug!("Token request ({}) to {}", grant.name(), self.provider.name);

        let mut form = vec![
            ("grant_type", grant.name()),
            ("client_id", self.client_id.as_str()),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.as_str()));
        }
        match grant {
            Grant::Refresh { refresh_token } => form.push(("refresh_token", refresh_token)),
            Grant::Code {
                code,
                redirect_uri,
                code_verifier,
            } => {
                form.push(("code", code));
                form.extend(redirect_uri.map(|uri| ("redirect_uri", uri)));
                form.extend(code_verifier.map(|v| ("code_verifier", v)));
            }
        }

        let response = self
            .http
            .post(self.provider.token_url.clone())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(refusal) => refusal.into(),
                Err(_) => Error::rejected(status.as_str(), body.trim()),
            });
        }

        let reply: TokenResponse = response.json().await?;
        Ok(Token::from_response(reply, Utc::now()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = OAuthClient::new("123.apps.googleusercontent.com", Provider::google().unwrap())
            .with_client_secret("GOCSPX-secret")
            .with_redirect_uri("http://127.0.0.1:8080");

        assert_eq!(client.client_id, "123.apps.googleusercontent.com");
        assert_eq!(client.client_secret.as_deref(), Some("GOCSPX-secret"));
        assert_eq!(client.redirect_uri.as_deref(), Some("http://127.0.0.1:8080"));
    }

    #[test]
    fn test_grant_names() {
        assert_eq!(Grant::Refresh { refresh_token: "r" }.name(), "refresh_token");
        let code = Grant::Code {
            code: "c",
            redirect_uri: None,
            code_verifier: None,
        };
        assert_eq!(code.name(), "authorization_code");
    }

    #[test]
    fn test_refresh_without_grant_fails_before_request() {
        let client = OAuthClient::new("id", Provider::google().unwrap());
        let mut token = Token::from_refresh_token("x");
        token.refresh_token = None;
        let result = tokio_test::block_on(client.refresh_token(&token));
        assert!(matches!(result, Err(Error::NoRefreshToken)));
    }
}
