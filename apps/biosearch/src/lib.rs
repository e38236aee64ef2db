//! # biosearch
//!
//! Query-and-reshape proxy in front of a document search backend.
//!
//! - `backend`: the search backend interface and its Elasticsearch client
//! - `api`: the axum HTTP layer
//! - `cli`: clap commands (server and one-shot queries)
//! - `config`: TOML file + environment configuration
//!
//! Result shaping lives in `biosearch-core`.

pub mod api;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;

pub use error::AppError;
