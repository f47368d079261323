//! Offline mailbox snapshots.
//!
//! A snapshot holds the raw labels and thread metadata of one fetch, so a
//! report can be recomputed later without network access or credentials.

use std::path::Path;

use deskledger_core::{Conversation, Label, LabelCatalog};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::schema::{WireLabel, WireThread};

/// Labels and threads captured from a mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Every label in the mailbox.
    #[serde(default)]
    pub labels: Vec<WireLabel>,
    /// Thread metadata, in fetch order.
    #[serde(default)]
    pub threads: Vec<WireThread>,
}

impl Snapshot {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(labels: Vec<WireLabel>, threads: Vec<WireThread>) -> Self {
        Self { labels, threads }
    }

    /// Reads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a snapshot.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let snapshot: Self = serde_json::from_str(&contents)?;
        info!(
            "Loaded snapshot {} ({} labels, {} threads)",
            path.display(),
            snapshot.labels.len(),
            snapshot.threads.len()
        );
        Ok(snapshot)
    }

    /// Writes the snapshot as JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string(self)?;
        tokio::fs::write(path, contents).await?;
        info!("Snapshot saved to {}", path.display());
        Ok(())
    }

    /// Builds the label catalog.
    #[must_use]
    pub fn catalog(&self) -> LabelCatalog {
        self.labels.iter().cloned().map(Label::from).collect()
    }

    /// Converts the threads into conversations, consuming the snapshot.
    #[must_use]
    pub fn into_conversations(self) -> Vec<Conversation> {
        self.threads
            .into_iter()
            .map(WireThread::into_conversation)
            .collect()
    }
}
