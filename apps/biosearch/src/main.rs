//! # Biosearch - Search Proxy
//!
//! The main binary for the biosearch proxy.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                 apps/biosearch (THE BINARY)                │
//! │                                                            │
//! │  ┌─────────────┐    ┌─────────────┐    ┌───────────────┐   │
//! │  │    CLI      │    │  HTTP API   │    │ ElasticClient │   │
//! │  │   (clap)    │    │   (axum)    │───▶│   (reqwest)   │──▶ search backend
//! │  └──────┬──────┘    └──────┬──────┘    └───────────────┘   │
//! │         └──────────────────┤                               │
//! │                            ▼                               │
//! │                   ┌────────────────┐                       │
//! │                   │ biosearch-core │                       │
//! │                   │  (THE LOGIC)   │                       │
//! │                   └────────────────┘                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the proxy
//! biosearch server --host 0.0.0.0 --port 8080 --backend-url http://es01:9200
//!
//! # One-shot queries
//! biosearch metadata --ids PRJDB1,PRJDB2 --format tsv -o metadata.tsv
//! biosearch plot --ids SRS001,SRS002
//! ```

use biosearch::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // BIOSEARCH_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("BIOSEARCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "biosearch=info,tower_http=debug".into());

    // Logs go to stderr; stdout carries command output.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner to stderr.
fn print_banner() {
    eprintln!(
        r#"
  biosearch v{}
  query and reshape proxy for document search
"#,
        env!("CARGO_PKG_VERSION")
    );
}
