//! # Application Errors
//!
//! Top-level error type for the server and CLI commands.

use crate::backend::BackendError;
use crate::config::ConfigError;
use biosearch_core::ShapingError;
use thiserror::Error;

/// Errors surfaced by `cli::execute` and `api::run_server`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Shaping(#[from] ShapingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}
