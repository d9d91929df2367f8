//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific
//! modules.

mod enqueue;
mod history;
mod init;
mod status;
mod upload;
mod work;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "evalsync")]
#[command(about = "Evaluation PDF delivery pipeline")]
#[command(version)]
pub struct Cli {
    /// Data directory holding evalsync.db (overrides config file)
    #[arg(long, global = true, env = "EVALSYNC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,
    /// Queue an evaluation for upload (re-queues terminal jobs)
    Enqueue {
        /// Owning organization id
        #[arg(long)]
        org: i64,
        /// Evaluation id
        #[arg(long)]
        evaluation: i64,
        /// Annotation recorded on a re-queued job
        #[arg(long)]
        reason: Option<String>,
    },
    /// Run the upload worker until interrupted
    Work,
    /// Upload one evaluation immediately, bypassing the queue
    Upload {
        #[arg(long)]
        org: i64,
        #[arg(long)]
        evaluation: i64,
    },
    /// Show queue counts by state
    Status {
        /// Restrict to one organization
        #[arg(long)]
        org: Option<i64>,
    },
    /// Show the upload audit trail for an evaluation
    History {
        #[arg(long)]
        org: i64,
        #[arg(long)]
        evaluation: i64,
        /// Maximum rows to show
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Enqueue {
            org,
            evaluation,
            reason,
        } => enqueue::cmd_enqueue(&settings, org, evaluation, reason.as_deref()).await,
        Commands::Work => work::cmd_work(&settings).await,
        Commands::Upload { org, evaluation } => {
            upload::cmd_upload(&settings, org, evaluation).await
        }
        Commands::Status { org } => status::cmd_status(&settings, org).await,
        Commands::History {
            org,
            evaluation,
            limit,
        } => history::cmd_history(&settings, org, evaluation, limit).await,
    }
}
