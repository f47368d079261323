//! `deskledger` - support KPI reports from a Gmail mailbox
//!
//! Reads department and status labels on support threads, measures time to
//! first reply, and writes an aggregated JSON report plus a per-thread CSV.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod config;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "deskledger=info,deskledger_core=info,deskledger_gmail=info,deskledger_oauth=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    info!("Starting deskledger");

    let config = AppConfig::load(cli.config.as_deref())
        .await?
        .with_overrides(&cli);

    let summary = match pipeline::run(&config, cli.input.as_deref(), cli.save_snapshot.as_deref())
        .await
    {
        Ok(summary) => summary,
        Err(e) => {
            error!("Run failed: {e:#}");
            return Err(e);
        }
    };

    let report = &summary.report;
    info!(
        "Done: {} threads ({} skipped), {} sectors, average response {:.2} h",
        summary.threads,
        summary.skipped,
        report.by_sector.len(),
        report.average_response_hours
    );
    if report.timing_anomalies > 0 {
        info!(
            "{} threads had a reply dated before the opening message",
            report.timing_anomalies
        );
    }
    Ok(())
}
