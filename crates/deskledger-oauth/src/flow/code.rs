//! Consent URL construction and code exchange.

use super::pkce::random_urlsafe;
use super::{OAuthClient, PkceChallenge};
use crate::error::{Error, Result};
use crate::token::Token;
use url::Url;

/// One consent round trip.
///
/// Each flow carries its own random `state` value, checked when the
/// redirect comes back.
#[derive(Debug)]
pub struct AuthorizationCodeFlow {
    client: OAuthClient,
    pkce: Option<PkceChallenge>,
    state: String,
}

impl AuthorizationCodeFlow {
    /// Flow with a fresh random `state` and no PKCE.
    #[must_use]
    pub fn new(client: OAuthClient) -> Self {
        Self {
            client,
            pkce: None,
            state: random_urlsafe(16),
        }
    }

    /// Adds an S256 PKCE challenge.
    #[must_use]
    pub fn with_pkce(mut self) -> Self {
        self.pkce = Some(PkceChallenge::generate());
        self
    }

    /// The `state` value sent with the authorization request.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Verifier to send with the code, when PKCE is on.
    #[must_use]
    pub fn pkce_verifier(&self) -> Option<&str> {
        self.pkce.as_ref().map(PkceChallenge::verifier)
    }

    /// Builds the consent URL the user opens in a browser.
    ///
    /// Uses the provider's default scopes when `scopes` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client has no redirect URI.
    pub fn authorization_url(&self, scopes: Option<&[String]>) -> Result<Url> {
        let redirect_uri = self
            .client
            .redirect_uri
            .as_deref()
            .ok_or_else(|| Error::Config("redirect_uri is not set".into()))?;
        let scope = scopes.map_or_else(
            || self.client.provider.default_scopes.join(" "),
            |s| s.join(" "),
        );

        let mut url = self.client.provider.auth_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", &self.client.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("state", &self.state);
            if !scope.is_empty() {
                pairs.append_pair("scope", &scope);
            }
            if let Some(pkce) = &self.pkce {
                pairs
                    .append_pair("code_challenge", pkce.challenge())
                    .append_pair("code_challenge_method", PkceChallenge::METHOD);
            }
            if self.client.provider.is_google() {
                // Without these Google omits the refresh token on re-consent.
                pairs
                    .append_pair("access_type", "offline")
                    .append_pair("prompt", "consent");
            }
        }
        Ok(url)
    }

    /// Trades the code from the redirect for tokens, sending the PKCE
    /// verifier when one was generated.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint refuses the code.
    pub async fn exchange_code(&self, code: &str) -> Result<Token> {
        self.client
            .exchange_code(code, None, self.pkce_verifier())
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::provider::Provider;

    fn client() -> OAuthClient {
        OAuthClient::new("test_client", Provider::google().unwrap())
            .with_redirect_uri("http://127.0.0.1:8080")
    }

    #[test]
    fn test_authorization_url() {
        let flow = AuthorizationCodeFlow::new(client());
        let url = flow.authorization_url(None).unwrap();
        let query = url.query().unwrap();

        assert!(query.contains("client_id=test_client"));
        assert!(query.contains("response_type=code"));
        assert!(query.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8080"));
        assert!(query.contains(&format!("state={}", flow.state())));
        assert!(query.contains("gmail.readonly"));
        assert!(query.contains("access_type=offline"));
        assert!(query.contains("prompt=consent"));
        assert!(!query.contains("code_challenge"));
    }

    #[test]
    fn test_authorization_url_with_pkce() {
        let flow = AuthorizationCodeFlow::new(client()).with_pkce();
        let url = flow.authorization_url(None).unwrap();

        assert!(url.as_str().contains("code_challenge="));
        assert!(url.as_str().contains("code_challenge_method=S256"));
        assert!(flow.pkce_verifier().is_some());
    }

    #[test]
    fn test_authorization_url_custom_scopes() {
        let flow = AuthorizationCodeFlow::new(client());
        let scopes = vec!["email".to_string(), "profile".to_string()];
        let url = flow.authorization_url(Some(&scopes)).unwrap();
        assert!(url.as_str().contains("scope=email+profile"));
    }

    #[test]
    fn test_missing_redirect_uri() {
        let bare = OAuthClient::new("test_client", Provider::google().unwrap());
        let flow = AuthorizationCodeFlow::new(bare);
        assert!(matches!(
            flow.authorization_url(None),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_each_flow_has_its_own_state() {
        let a = AuthorizationCodeFlow::new(client());
        let b = AuthorizationCodeFlow::new(client());
        assert_ne!(a.state(), b.state());
        assert!(!a.state().is_empty());
    }
}
