//! # Biosearch CLI Module
//!
//! This module implements the CLI interface for biosearch.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP proxy
//! - `search` - Keyword search over project ids and labels
//! - `metadata` - Export flat project metadata (JSON or TSV)
//! - `plot` - Print composition bar series for samples

mod commands;

use crate::api::ExportFormat;
use crate::config::ProxyConfig;
use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Biosearch - query and reshape proxy for document search
#[derive(Parser, Debug)]
#[command(name = "biosearch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Search backend base URL (overrides config and ELASTICSEARCH_HOST)
    #[arg(short = 'B', long, global = true)]
    pub backend_url: Option<String>,

    /// Output in compact JSON (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP proxy
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Keyword search over project ids and labels
    Search {
        /// Search text (matched as a case-insensitive substring)
        #[arg(short = 'Q', long)]
        query: String,
    },

    /// Export flat metadata for the given projects
    Metadata {
        /// Comma-separated project ids
        #[arg(short, long)]
        ids: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print composition bar series for the given samples
    Plot {
        /// Comma-separated sample ids
        #[arg(short, long)]
        ids: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve configuration: file, then environment, then global flags.
pub fn resolve_config(cli: &Cli) -> Result<ProxyConfig, AppError> {
    let mut config = ProxyConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.backend_url {
        config.elasticsearch_host.clone_from(url);
    }
    Ok(config)
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let mut config = resolve_config(&cli)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Server { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            cmd_server(config).await
        }
        Commands::Search { query } => cmd_search(&config, &query, json_mode).await,
        Commands::Metadata {
            ids,
            format,
            output,
        } => cmd_metadata(&config, &ids, format, output.as_deref(), json_mode).await,
        Commands::Plot { ids } => cmd_plot(&config, &ids, json_mode).await,
    }
}

// =============================================================================
// TESTS
// =============================================================================
