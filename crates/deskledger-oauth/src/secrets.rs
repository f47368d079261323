//! Installed-app client secrets (`credentials.json`).

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::flow::OAuthClient;
use crate::provider::{GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, Provider};

/// Client registration downloaded from the Google Cloud console.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Authorization endpoint override.
    #[serde(default)]
    pub auth_uri: Option<String>,
    /// Token endpoint override.
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parses a secrets document with an `installed` or `web` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or has neither section.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SecretsFile = serde_json::from_str(json)?;
        file.installed.or(file.web).ok_or_else(|| {
            Error::Config("client secrets need an \"installed\" or \"web\" section".into())
        })
    }

    /// Reads and parses a secrets file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Google provider, honouring endpoint overrides from the file.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL is invalid.
    pub fn provider(&self) -> Result<Provider> {
        let provider = Provider::google()?;
        let auth_url = self.auth_uri.as_deref().unwrap_or(GOOGLE_AUTH_URL);
        let token_url = self.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URL);
        let provider = Provider::new(provider.name, auth_url, token_url)?
            .with_default_scopes(provider.default_scopes);
        provider.validate()?;
        Ok(provider)
    }

    /// OAuth client for these credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider configuration is invalid.
    pub fn client(&self) -> Result<OAuthClient> {
        let client = OAuthClient::new(&self.client_id, self.provider()?);
        Ok(match &self.client_secret {
            Some(secret) => client.with_client_secret(secret),
            None => client,
        })
    }
}
