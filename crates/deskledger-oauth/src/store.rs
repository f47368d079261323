//! Refresh token persistence.
//!
//! Tokens are saved in the `authorized_user` JSON format used by Google
//! client libraries, so a file written here can be reused by other tools.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::secrets::ClientSecrets;

const AUTHORIZED_USER: &str = "authorized_user";

/// Saved credentials for a user who completed authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    /// Always `authorized_user`.
    #[serde(rename = "type")]
    pub kind: String,
    /// OAuth client id the refresh token was issued to.
    pub client_id: String,
    /// OAuth client secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

impl AuthorizedUser {
    /// Creates a record for `refresh_token` issued to the given client.
    #[must_use]
    pub fn new(secrets: &ClientSecrets, refresh_token: impl Into<String>) -> Self {
        Self {
            kind: AUTHORIZED_USER.to_string(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Returns true if the record was issued to the client in `secrets`.
    #[must_use]
    pub fn matches(&self, secrets: &ClientSecrets) -> bool {
        self.kind == AUTHORIZED_USER && self.client_id == secrets.client_id
    }
}

/// File-backed store for an [`AuthorizedUser`].
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads saved credentials.
    ///
    /// A missing or unreadable file yields `None`; the caller falls back to
    /// interactive authorization.
    pub async fn load(&self) -> Option<AuthorizedUser> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) => {
                debug!("No saved token at {}: {e}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Ignoring unreadable token file {}: {e}", self.path.display());
                None
            }
        }
    }

    /// Saves credentials, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, user: &AuthorizedUser) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(user)?;
        tokio::fs::write(&self.path, contents).await?;
        restrict_permissions(&self.path).await;
        info!("Saved refresh token to {}", self.path.display());
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o600);
    if let Err(e) = tokio::fs::set_permissions(path, perms).await {
        warn!("Could not restrict permissions on {}: {e}", path.display());
    }
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secrets() -> ClientSecrets {
        ClientSecrets::from_json(r#"{"installed": {"client_id": "cid", "client_secret": "cs"}}"#)
            .unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token.json"));
        let user = AuthorizedUser::new(&secrets(), "1//refresh");

        tokio_test::block_on(store.save(&user)).unwrap();
        let loaded = tokio_test::block_on(store.load()).unwrap();

        assert_eq!(loaded, user);
        assert!(loaded.matches(&secrets()));
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"type\": \"authorized_user\""));
    }

    #[test]
    fn test_missing_and_corrupt_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        assert!(tokio_test::block_on(store.load()).is_none());

        std::fs::write(store.path(), "not json").unwrap();
        assert!(tokio_test::block_on(store.load()).is_none());
    }

    #[test]
    fn test_matches_other_client() {
        let user = AuthorizedUser::new(&secrets(), "1//refresh");
        let other = ClientSecrets::from_json(r#"{"installed": {"client_id": "other"}}"#).unwrap();
        assert!(!user.matches(&other));
    }
}
