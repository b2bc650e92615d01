//! CLI for the just-paste download service.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use jp_core::config;

use commands::{
    open_history, run_clear_history, run_delete_history, run_history, run_serve,
    run_validate_path,
};

/// Top-level CLI for just-paste.
#[derive(Debug, Parser)]
#[command(name = "just-paste")]
#[command(about = "just-paste: paste media links, get files back", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the HTTP/WebSocket server.
    Serve {
        /// Listen address (overrides `bind` from the config file).
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// List recent completed downloads, newest first.
    History {
        /// Maximum number of records (defaults to `history_limit` from the config file).
        #[arg(long, value_name = "N")]
        limit: Option<i64>,
    },

    /// Remove every history record.
    ClearHistory,

    /// Remove one history record by its ID.
    DeleteHistory {
        /// Record identifier.
        id: i64,
    },

    /// Check whether a directory can be used as a download destination.
    ValidatePath {
        path: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Serve { bind } => run_serve(&cfg, bind.as_deref()).await?,
            CliCommand::History { limit } => {
                let db = open_history(&cfg).await?;
                run_history(&db, limit.unwrap_or(cfg.history_limit)).await?;
            }
            CliCommand::ClearHistory => run_clear_history(&open_history(&cfg).await?).await?,
            CliCommand::DeleteHistory { id } => {
                run_delete_history(&open_history(&cfg).await?, id).await?
            }
            CliCommand::ValidatePath { path } => run_validate_path(&path)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
