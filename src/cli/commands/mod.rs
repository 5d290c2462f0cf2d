//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod catalog;
mod documents;
mod ingest;
mod init;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions, Settings};
use crate::server::AppState;

#[derive(Parser)]
#[command(name = "gazette")]
#[command(about = "Official gazette PDF harvester")]
#[command(version)]
pub struct Cli {
    /// Config file path (default: gazette.toml in the working directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

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

    /// Start the HTTP server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: 127.0.0.1:3030)
        #[arg(default_value = "127.0.0.1:3030")]
        bind: String,
    },

    /// Manage the issue catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },

    /// Download and store every PDF of one issue
    Ingest {
        /// Issue token as listed by `catalog list`
        token: String,
    },

    /// Manage ingested documents
    Documents {
        #[command(subcommand)]
        command: DocumentCommands,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// Scrape the issue list from the source site
    Refresh {
        /// Passed to the source page as the `date` query parameter
        #[arg(long)]
        date_hint: Option<String>,
    },
    /// Show the stored catalog
    List,
}

#[derive(Subcommand)]
enum DocumentCommands {
    /// List documents, newest first
    List {
        /// Case-insensitive name filter
        #[arg(short, long)]
        name: Option<String>,
        /// all, pending, processing, completed or failed
        #[arg(short, long, default_value = "all")]
        status: String,
        /// Page number (1-indexed)
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Rows per page: 10, 25, 50, 100 or -1 for all
        #[arg(short, long, default_value = "10", allow_hyphen_values = true)]
        limit: i64,
    },
    /// Mark a document as processing
    Parse { id: String },
    /// Delete a document and its stored file
    Delete { id: String },
    /// Print the public URL of a document's file
    Preview { id: String },
}

/// Prepare the data directory and schema, then wire the shared services.
async fn open_state(settings: &Settings) -> anyhow::Result<AppState> {
    settings.ensure_directories()?;
    let state = AppState::new(settings)?;
    state.ctx.init_schema().await?;
    Ok(state)
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    })
    .await?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Catalog { command } => match command {
            CatalogCommands::Refresh { date_hint } => {
                catalog::cmd_refresh(&settings, date_hint.as_deref()).await
            }
            CatalogCommands::List => catalog::cmd_list(&settings).await,
        },
        Commands::Ingest { token } => ingest::cmd_ingest(&settings, &token).await,
        Commands::Documents { command } => match command {
            DocumentCommands::List {
                name,
                status,
                page,
                limit,
            } => documents::cmd_list(&settings, name, &status, page, limit).await,
            DocumentCommands::Parse { id } => documents::cmd_parse(&settings, &id).await,
            DocumentCommands::Delete { id } => documents::cmd_delete(&settings, &id).await,
            DocumentCommands::Preview { id } => documents::cmd_preview(&settings, &id).await,
        },
    }
}
