//! Report pipeline: fetch, classify, aggregate, export.

use std::path::Path;

use anyhow::{Context, Result};
use deskledger_core::export::{write_json, write_records_csv};
use deskledger_core::{ConversationRecord, KpiReport, aggregate, build_conversation_record};
use deskledger_gmail::{GmailClient, Snapshot, WireThread};
use deskledger_oauth::{Authenticator, ClientSecrets, Token, TokenStore};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

/// Threads between progress messages.
const PROGRESS_EVERY: usize = 50;

/// Outcome of a run.
#[derive(Debug)]
pub struct RunSummary {
    /// Threads that made it into the report.
    pub threads: usize,
    /// Threads skipped after a fetch failure.
    pub skipped: usize,
    /// Aggregated metrics.
    pub report: KpiReport,
}

/// Runs the pipeline end to end.
///
/// With `input`, the mailbox is read from a snapshot file; otherwise the
/// user is authorized and the Gmail API is queried. `save_snapshot` stores
/// what was read for later offline runs.
///
/// # Errors
///
/// Returns an error if authorization, label listing, thread listing or
/// writing the outputs fails. Individual thread failures are skipped.
pub async fn run(
    config: &AppConfig,
    input: Option<&Path>,
    save_snapshot: Option<&Path>,
) -> Result<RunSummary> {
    let (snapshot, skipped) = match input {
        Some(path) => {
            let snapshot = Snapshot::load(path)
                .await
                .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
            (snapshot, 0)
        }
        None => fetch(config).await?,
    };

    if let Some(path) = save_snapshot {
        snapshot
            .save(path)
            .await
            .with_context(|| format!("Failed to save snapshot {}", path.display()))?;
    }

    let (records, report) = build_report(config, snapshot);
    export(config, &records, &report)?;

    Ok(RunSummary {
        threads: records.len(),
        skipped,
        report,
    })
}

/// Classifies every thread of a snapshot and aggregates the records.
#[must_use]
pub fn build_report(
    config: &AppConfig,
    snapshot: Snapshot,
) -> (Vec<ConversationRecord>, KpiReport) {
    info!("Computing indicators for {} threads", snapshot.threads.len());
    let catalog = snapshot.catalog();
    let records: Vec<ConversationRecord> = snapshot
        .into_conversations()
        .iter()
        .map(|conversation| build_conversation_record(conversation, &catalog, &config.rules))
        .collect();
    let report = aggregate(&records);
    (records, report)
}

fn export(config: &AppConfig, records: &[ConversationRecord], report: &KpiReport) -> Result<()> {
    if !config.output_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&config.output_dir).with_context(|| {
            format!("Failed to create output directory {}", config.output_dir.display())
        })?;
    }

    let results_path = config.results_path();
    write_json(report, &results_path)
        .with_context(|| format!("Failed to write {}", results_path.display()))?;

    let csv_path = config.csv_path();
    write_records_csv(records, &csv_path)
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;
    Ok(())
}

/// Authorized Gmail access that renews its token when it lapses.
struct Session {
    authenticator: Authenticator,
    token: Token,
    client: GmailClient,
}

impl Session {
    async fn open(config: &AppConfig) -> Result<Self> {
        let secrets = ClientSecrets::load(&config.credentials_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to load OAuth client secrets from {}",
                    config.credentials_path.display()
                )
            })?;
        let authenticator = Authenticator::new(
            secrets,
            TokenStore::new(&config.token_path),
            config.authorize_options(),
        );

        info!("Authenticating");
        let token = authenticator
            .authorize()
            .await
            .context("Authorization failed")?;
        info!("Authentication completed");

        let client = GmailClient::new(token.access_token.clone()).with_page_size(config.page_size);
        Ok(Self {
            authenticator,
            token,
            client,
        })
    }

    async fn renew(&mut self) -> Result<()> {
        debug!("Refreshing access token");
        self.token = self
            .authenticator
            .refresh(&self.token)
            .await
            .context("Failed to refresh access token")?;
        self.client.set_access_token(self.token.access_token.clone());
        Ok(())
    }

    async fn ensure_fresh(&mut self) -> Result<()> {
        if self.token.is_expired() {
            self.renew().await?;
        }
        Ok(())
    }

    /// Fetches one thread, renewing the token once if it was rejected.
    async fn thread(&mut self, id: &str) -> Result<WireThread> {
        self.ensure_fresh().await?;
        match self.client.get_thread(id).await {
            Err(e) if e.is_unauthorized() => {
                self.renew().await?;
                Ok(self.client.get_thread(id).await?)
            }
            result => Ok(result?),
        }
    }
}

/// Reads labels and thread metadata from the Gmail API.
///
/// Returns the snapshot and the number of threads that could not be fetched.
async fn fetch(config: &AppConfig) -> Result<(Snapshot, usize)> {
    let mut session = Session::open(config).await?;

    info!("Fetching labels");
    let labels = session
        .client
        .list_labels()
        .await
        .context("Failed to list labels")?;
    info!("Found {} labels", labels.len());

    info!("Listing threads");
    let ids = session
        .client
        .list_thread_ids(config.query.as_deref(), config.max_threads)
        .await
        .context("Failed to list threads")?;
    info!("Found {} threads", ids.len());

    let total = ids.len();
    let mut threads = Vec::with_capacity(total);
    let mut skipped = 0;
    for (index, id) in ids.iter().enumerate() {
        match session.thread(id).await {
            Ok(thread) => threads.push(thread),
            Err(e) => {
                warn!("Skipping thread {id}: {e:#}");
                skipped += 1;
            }
        }
        let done = index + 1;
        if done % PROGRESS_EVERY == 0 {
            info!("Processed {done}/{total} threads");
        }
    }

    Ok((Snapshot::new(labels, threads), skipped))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use deskledger_gmail::{WireHeader, WireLabel, WireMessage, WirePayload};

    fn label(id: &str, name: &str) -> WireLabel {
        WireLabel {
            id: id.into(),
            name: name.into(),
            kind: Some("user".into()),
        }
    }

    fn message(labels: &[&str], millis: i64, from: Option<&str>) -> WireMessage {
        WireMessage {
            id: format!("m{millis}"),
            label_ids: labels.iter().map(ToString::to_string).collect(),
            internal_date: Some(millis.to_string()),
            payload: from.map(|from| WirePayload {
                headers: vec![WireHeader {
                    name: "From".into(),
                    value: from.into(),
                }],
            }),
        }
    }

    fn snapshot() -> Snapshot {
        // 2023-01-01T00:00:00Z and 2023-02-01T00:00:00Z
        let jan = 1_672_531_200_000;
        let feb = 1_675_209_600_000;
        Snapshot::new(
            vec![
                label("L1", "Setor Financeiro"),
                label("L2", "Chamados Fechados"),
                label("L3", "Setor TI"),
                label("L4", "Chamados em Aberto"),
            ],
            vec![
                WireThread {
                    id: "t1".into(),
                    messages: vec![
                        message(&["INBOX", "L1"], jan, Some("Jane <jane@x.com>")),
                        message(&["SENT", "L2"], jan + 2 * 3_600_000, None),
                    ],
                },
                WireThread {
                    id: "t2".into(),
                    messages: vec![message(&["INBOX", "L3", "L4"], feb, Some("jane@x.com"))],
                },
                WireThread {
                    id: "t3".into(),
                    messages: vec![message(&["INBOX"], feb, None)],
                },
            ],
        )
    }

    #[test]
    fn test_build_report() {
        let (records, report) = build_report(&AppConfig::default(), snapshot());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].sector, "Financeiro");
        assert_eq!(records[2].sector, "Undefined");
        assert_eq!(records[2].sender, "Unknown");

        assert_eq!(report.total_conversations, 3);
        assert_eq!(report.by_sector["Financeiro"], 1);
        assert_eq!(report.by_sector["TI"], 1);
        assert_eq!(report.by_sender["jane@x.com"], 2);
        assert_eq!(report.by_month["2023-02"], 2);
        assert_eq!(report.resolved_by_month["2023-01"], 1);
        assert_eq!(report.open_by_month["2023-02"], 1);
        assert!((report.quarterly_average["2023-Q1"] - 1.0).abs() < f64::EPSILON);
        assert!((report.average_response_hours - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_offline_run_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("snapshot.json");
        snapshot().save(&input).await.unwrap();

        let config = AppConfig {
            output_dir: dir.path().join("out"),
            ..AppConfig::default()
        };
        let copy = dir.path().join("copy.json");
        let summary = run(&config, Some(&input), Some(&copy)).await.unwrap();
        assert_eq!(summary.threads, 3);
        assert_eq!(summary.skipped, 0);

        let results = std::fs::read_to_string(config.results_path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&results).unwrap();
        assert_eq!(json["totalConversations"], 3);

        let table = std::fs::read_to_string(config.csv_path()).unwrap();
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("t1,Jane <jane@x.com>,Financeiro,Sim"));

        assert_eq!(Snapshot::load(&copy).await.unwrap(), snapshot());
    }

    #[tokio::test]
    async fn test_missing_snapshot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            output_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        let result = run(&config, Some(&dir.path().join("absent.json")), None).await;
        assert!(result.is_err());
        assert!(!config.results_path().exists());
    }
}
