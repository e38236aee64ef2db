//! # API Request/Response Types
//!
//! This module defines the JSON structures and query parameters of the HTTP API.

use biosearch_core::RawDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// =============================================================================
// SEARCH
// =============================================================================

/// `GET /?q=` parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Keyword search response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<RawDocument>,
}

/// `POST /bioproject` response. The hit list is wrapped in one extra array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSearchResponse {
    pub hits: Vec<Vec<Value>>,
}

impl RawSearchResponse {
    pub fn new(hits: Vec<Value>) -> Self {
        Self { hits: vec![hits] }
    }
}

// =============================================================================
// METADATA
// =============================================================================

/// Output format of the metadata endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One JSON object per document.
    #[default]
    Json,
    /// Tab-separated text with a header row.
    Tsv,
}

/// `GET /metadata` parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataParams {
    /// Comma-separated document ids.
    pub ids: Option<String>,
    #[serde(default)]
    pub format: ExportFormat,
}

// =============================================================================
// PLOT DATA
// =============================================================================

/// `GET /plotly_data` parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlotParams {
    /// Comma-separated sample ids.
    pub id: Option<String>,
    /// View selector. Accepted but not used yet.
    pub view: Option<String>,
}

// =============================================================================
// TESTS
// =============================================================================
