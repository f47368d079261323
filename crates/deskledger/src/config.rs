//! Application configuration.
//!
//! Values come from a JSON file (explicit `--config`, or
//! `<config dir>/deskledger/config.json` when present), then command-line
//! flags override them. Every field has a default, so a missing file or a
//! partial one is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use deskledger_core::LabelRules;
use deskledger_gmail::DEFAULT_PAGE_SIZE;
use deskledger_oauth::AuthorizeOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Cli;

/// Settings for one report run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OAuth client secrets file.
    pub credentials_path: PathBuf,
    /// Saved refresh token file.
    pub token_path: PathBuf,
    /// Directory receiving the report files.
    pub output_dir: PathBuf,
    /// KPI report file name.
    pub results_file: String,
    /// Per-thread table file name.
    pub csv_file: String,
    /// Gmail search query limiting the threads read.
    pub query: Option<String>,
    /// Threads requested per list page.
    pub page_size: u32,
    /// Upper bound on threads processed.
    pub max_threads: Option<usize>,
    /// Loopback port for the authorization redirect.
    pub redirect_port: u16,
    /// Open the consent page automatically.
    pub open_browser: bool,
    /// Seconds to wait for the user to finish consent.
    pub auth_timeout_secs: u64,
    /// Sector and status label names.
    pub rules: LabelRules,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            output_dir: PathBuf::from("."),
            results_file: "results.json".to_string(),
            csv_file: "chamados.csv".to_string(),
            query: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_threads: None,
            redirect_port: 0,
            open_browser: true,
            auth_timeout_secs: 300,
            rules: LabelRules::default(),
        }
    }
}

impl AppConfig {
    /// Default location of the configuration file.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deskledger")
            .join("config.json")
    }

    /// Loads configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present and defaults apply otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::default_path();
                if !path.exists() {
                    debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Applies command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(path) = &cli.credentials {
            self.credentials_path.clone_from(path);
        }
        if let Some(path) = &cli.token {
            self.token_path.clone_from(path);
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir.clone_from(dir);
        }
        if cli.query.is_some() {
            self.query.clone_from(&cli.query);
        }
        if let Some(page_size) = cli.page_size {
            self.page_size = page_size;
        }
        if cli.max_threads.is_some() {
            self.max_threads = cli.max_threads;
        }
        if let Some(port) = cli.port {
            self.redirect_port = port;
        }
        if cli.no_browser {
            self.open_browser = false;
        }
        self
    }

    /// Path of the KPI report.
    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(&self.results_file)
    }

    /// Path of the per-thread table.
    #[must_use]
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.csv_file)
    }

    /// Options for interactive authorization.
    #[must_use]
    pub fn authorize_options(&self) -> AuthorizeOptions {
        AuthorizeOptions {
            redirect_port: self.redirect_port,
            open_browser: self.open_browser,
            timeout: Duration::from_secs(self.auth_timeout_secs),
        }
    }
}
