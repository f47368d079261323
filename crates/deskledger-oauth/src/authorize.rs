//! End-to-end authorization for a command-line run.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::flow::{AuthorizationCodeFlow, LoopbackReceiver};
use crate::secrets::ClientSecrets;
use crate::store::{AuthorizedUser, TokenStore};
use crate::token::Token;

/// Options for the interactive part of authorization.
#[derive(Debug, Clone)]
pub struct AuthorizeOptions {
    /// Loopback port for the redirect; 0 picks a free port.
    pub redirect_port: u16,
    /// Open the consent page in the default browser.
    pub open_browser: bool,
    /// How long to wait for the user to finish consent.
    pub timeout: Duration,
}

impl Default for AuthorizeOptions {
    fn default() -> Self {
        Self {
            redirect_port: 0,
            open_browser: true,
            timeout: Duration::from_secs(300),
        }
    }
}

/// Obtains a valid access token, reusing a saved refresh token when possible.
#[derive(Debug)]
pub struct Authenticator {
    secrets: ClientSecrets,
    store: TokenStore,
    options: AuthorizeOptions,
}

impl Authenticator {
    /// Creates an authenticator.
    #[must_use]
    pub const fn new(secrets: ClientSecrets, store: TokenStore, options: AuthorizeOptions) -> Self {
        Self {
            secrets,
            store,
            options,
        }
    }

    /// Returns an access token.
    ///
    /// A saved refresh token issued to the same client is exchanged first.
    /// If there is none, or the server reports it revoked, the browser
    /// consent flow runs and the new refresh token is saved.
    ///
    /// # Errors
    ///
    /// Returns an error if refreshing fails for a reason other than a
    /// revoked grant, or if interactive authorization fails.
    pub async fn authorize(&self) -> Result<Token> {
        let client = self.secrets.client()?;

        if let Some(saved) = self.store.load().await {
            if saved.matches(&self.secrets) {
                let token = Token::from_refresh_token(saved.refresh_token);
                match client.refresh_token(&token).await {
                    Ok(token) => {
                        info!("Using saved credentials from {}", self.store.path().display());
                        return Ok(token);
                    }
                    Err(e) if e.is_invalid_grant() => {
                        warn!("Saved refresh token was rejected, authorizing again: {e}");
                    }
                    Err(e) => return Err(e),
                }
            } else {
                warn!("Saved token belongs to another client, authorizing again");
            }
        }

        let token = self.authorize_interactive().await?;
        match token.refresh_token.as_deref() {
            Some(refresh_token) => {
                self.store
                    .save(&AuthorizedUser::new(&self.secrets, refresh_token))
                    .await?;
            }
            None => warn!("Server issued no refresh token; the next run will ask again"),
        }
        Ok(token)
    }

    /// Renews an access token obtained from [`Authenticator::authorize`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token has no refresh token or the server
    /// rejects the refresh.
    pub async fn refresh(&self, token: &Token) -> Result<Token> {
        self.secrets.client()?.refresh_token(token).await
    }

    async fn authorize_interactive(&self) -> Result<Token> {
        let receiver = LoopbackReceiver::bind(self.options.redirect_port).await?;
        let client = self.secrets.client()?.with_redirect_uri(receiver.redirect_uri());
        let flow = AuthorizationCodeFlow::new(client).with_pkce();
        let url = flow.authorization_url(None)?;

        info!("Authorize access in your browser:\n\n    {url}\n");
        if self.options.open_browser {
            if let Err(e) = opener::open(url.as_str()) {
                warn!("Could not open a browser ({e}); open the URL above manually");
            }
        }

        let code = receiver
            .wait_for_code(flow.state(), self.options.timeout)
            .await?;
        let token = flow.exchange_code(&code).await?;
        if token.access_token.is_empty() {
            return Err(Error::rejected("invalid_response", "empty access token"));
        }
        info!("Authorization completed");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = AuthorizeOptions::default();
        assert_eq!(options.redirect_port, 0);
        assert!(options.open_browser);
        assert_eq!(options.timeout, Duration::from_secs(300));
    }
}
