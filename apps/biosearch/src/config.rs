//! # Configuration
//!
//! Proxy settings, resolved in three layers (later wins):
//!
//! 1. TOML file given with `--config` (optional)
//! 2. Environment variables
//! 3. Command-line flags (applied by the CLI)
//!
//! ## Environment Variables
//!
//! - `ELASTICSEARCH_HOST`: search backend base URL
//! - `PORT`: HTTP port
//! - `BIOSEARCH_HOST`: bind address
//! - `BIOSEARCH_PROJECT_INDEX`, `BIOSEARCH_COMPOSITION_INDEX`: index names
//! - `BIOSEARCH_SEARCH_SIZE`: hit limit of the keyword search
//! - `BIOSEARCH_TIMEOUT_SECS`: backend request timeout
//! - `BIOSEARCH_RATE_LIMIT`: requests per second, 0 disables
//! - `BIOSEARCH_CORS_ORIGINS`: comma-separated origins, or "*"

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Resolved proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Search backend base URL.
    pub elasticsearch_host: String,
    /// Bind address of the HTTP server.
    pub host: String,
    /// Port of the HTTP server.
    pub port: u16,
    /// Index holding project documents.
    pub project_index: String,
    /// Index holding per-sample composition documents.
    pub composition_index: String,
    /// Maximum hits returned by the keyword search.
    pub search_size: usize,
    /// Backend request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Requests per second, 0 disables rate limiting.
    pub rate_limit: u32,
    /// Allowed CORS origins: comma-separated list or "*". Localhost only when unset.
    pub cors_origins: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            elasticsearch_host: "http://localhost:9200".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            project_index: "bioproject".to_string(),
            composition_index: "taxonomic_comparison".to_string(),
            search_size: 10,
            request_timeout_secs: 30,
            rate_limit: 100,
            cors_origins: None,
        }
    }
}

impl ProxyConfig {
    /// Load from an optional TOML file, then apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Parse a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from an environment lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("ELASTICSEARCH_HOST") {
            self.elasticsearch_host = v;
        }
        if let Some(v) = get("BIOSEARCH_HOST") {
            self.host = v;
        }
        if let Some(v) = get("PORT") {
            self.port = parse_value("PORT", &v)?;
        }
        if let Some(v) = get("BIOSEARCH_PROJECT_INDEX") {
            self.project_index = v;
        }
        if let Some(v) = get("BIOSEARCH_COMPOSITION_INDEX") {
            self.composition_index = v;
        }
        if let Some(v) = get("BIOSEARCH_SEARCH_SIZE") {
            self.search_size = parse_value("BIOSEARCH_SEARCH_SIZE", &v)?;
        }
        if let Some(v) = get("BIOSEARCH_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_value("BIOSEARCH_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("BIOSEARCH_RATE_LIMIT") {
            self.rate_limit = parse_value("BIOSEARCH_RATE_LIMIT", &v)?;
        }
        if let Some(v) = get("BIOSEARCH_CORS_ORIGINS") {
            self.cors_origins = Some(v);
        }
        Ok(self)
    }

    /// Backend request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        })
}

// =============================================================================
// TESTS
// =============================================================================
