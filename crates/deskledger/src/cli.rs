//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Builds support KPI reports from a Gmail mailbox.
#[derive(Debug, Default, Parser)]
#[command(name = "deskledger", version, about)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// OAuth client secrets downloaded from the Google Cloud console
    #[arg(long, value_name = "FILE")]
    pub credentials: Option<PathBuf>,

    /// Where the refresh token is stored
    #[arg(long, value_name = "FILE")]
    pub token: Option<PathBuf>,

    /// Directory for results.json and the CSV table
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Gmail search query restricting which threads are read
    #[arg(short, long)]
    pub query: Option<String>,

    /// Stop after this many threads
    #[arg(short = 'n', long)]
    pub max_threads: Option<usize>,

    /// Threads requested per list page (1-500)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Loopback port for the authorization redirect (0 picks one)
    #[arg(long)]
    pub port: Option<u16>,

    /// Print the consent URL instead of opening a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Build the report from a saved snapshot instead of the Gmail API
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Save fetched labels and threads for later offline runs
    #[arg(long, value_name = "FILE")]
    pub save_snapshot: Option<PathBuf>,
}
