//! # CLI Command Implementations
//!
//! Each one-shot command renders its output with a `render_*` function that
//! takes the backend as a parameter; the `cmd_*` wrappers build the
//! Elasticsearch client and write the result.

use crate::api::{self, ExportFormat};
use crate::backend::{ElasticClient, SearchBackend, order_by_request, parse_id_list};
use crate::config::ProxyConfig;
use crate::error::AppError;
use biosearch_core::{CompositionEntry, encode_records, pivot_composition, project_metadata};
use serde::Serialize;
use std::path::Path;

fn connect(config: &ProxyConfig) -> Result<ElasticClient, AppError> {
    Ok(ElasticClient::new(
        &config.elasticsearch_host,
        config.request_timeout(),
    )?)
}

fn require_ids(raw: &str) -> Result<Vec<String>, AppError> {
    let ids = parse_id_list(raw);
    if ids.is_empty() {
        return Err(AppError::Usage("at least one id is required".to_string()));
    }
    Ok(ids)
}

fn to_json<T: Serialize>(value: &T, json_mode: bool) -> Result<String, AppError> {
    let text = if json_mode {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(text)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP proxy.
pub async fn cmd_server(config: ProxyConfig) -> Result<(), AppError> {
    let backend = connect(&config)?;

    tracing::info!(
        backend = %config.elasticsearch_host,
        project_index = %config.project_index,
        composition_index = %config.composition_index,
        "Biosearch proxy starting"
    );
    eprintln!("Endpoints:");
    eprintln!("  GET  /             - Keyword search (?q=)");
    eprintln!("  POST /bioproject   - Forward a query body");
    eprintln!("  GET  /bioproject/{{id}} - Fetch one document");
    eprintln!("  GET  /metadata     - Flat metadata (?ids=&format=json|tsv)");
    eprintln!("  GET  /plotly_data  - Composition series (?id=)");
    eprintln!("  GET  /health       - Health check");
    eprintln!();
    eprintln!("Press Ctrl+C to stop");

    api::run_server(backend, config).await
}

// =============================================================================
// SEARCH COMMAND
// =============================================================================

/// Keyword search.
pub async fn cmd_search(
    config: &ProxyConfig,
    query: &str,
    json_mode: bool,
) -> Result<(), AppError> {
    let backend = connect(config)?;
    println!("{}", render_search(&backend, config, query, json_mode).await?);
    Ok(())
}

pub async fn render_search<B: SearchBackend>(
    backend: &B,
    config: &ProxyConfig,
    query: &str,
    json_mode: bool,
) -> Result<String, AppError> {
    let hits = backend
        .search_by_query(&config.project_index, query, config.search_size)
        .await?;
    to_json(&hits, json_mode)
}

// =============================================================================
// METADATA COMMAND
// =============================================================================

/// Export metadata to stdout or a file.
pub async fn cmd_metadata(
    config: &ProxyConfig,
    ids: &str,
    format: ExportFormat,
    output: Option<&Path>,
    json_mode: bool,
) -> Result<(), AppError> {
    let backend = connect(config)?;
    let text = render_metadata(&backend, config, ids, format, json_mode).await?;

    match output {
        Some(path) => {
            std::fs::write(path, text.as_bytes())?;
            tracing::info!(path = %path.display(), "metadata written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

pub async fn render_metadata<B: SearchBackend>(
    backend: &B,
    config: &ProxyConfig,
    ids: &str,
    format: ExportFormat,
    json_mode: bool,
) -> Result<String, AppError> {
    let ids = require_ids(ids)?;
    let documents = backend.search_by_ids(&config.project_index, &ids).await?;
    let records = project_metadata(&order_by_request(documents, &ids));

    match format {
        ExportFormat::Json => to_json(&records, json_mode),
        ExportFormat::Tsv => Ok(encode_records(&records)?),
    }
}

// =============================================================================
// PLOT COMMAND
// =============================================================================

/// Print composition series.
pub async fn cmd_plot(config: &ProxyConfig, ids: &str, json_mode: bool) -> Result<(), AppError> {
    let backend = connect(config)?;
    println!("{}", render_plot(&backend, config, ids, json_mode).await?);
    Ok(())
}

pub async fn render_plot<B: SearchBackend>(
    backend: &B,
    config: &ProxyConfig,
    ids: &str,
    json_mode: bool,
) -> Result<String, AppError> {
    let ids = require_ids(ids)?;
    let documents = backend
        .search_by_ids(&config.composition_index, &ids)
        .await?;
    let entries = documents
        .iter()
        .map(CompositionEntry::from_document)
        .collect::<Result<Vec<_>, _>>()?;
    let series = pivot_composition(&entries, Some(ids.as_slice()))?;
    to_json(&series, json_mode)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use biosearch_core::{RawDocument, ShapingError};
    use serde_json::{Map, Value, json};

    /// Backend double serving a fixed document list.
    struct FixedBackend(Vec<RawDocument>);

    impl SearchBackend for FixedBackend {
        async fn search_by_ids(
            &self,
            _index: &str,
            ids: &[String],
        ) -> Result<Vec<RawDocument>, BackendError> {
            Ok(self
                .0
                .iter()
                .filter(|d| ids.contains(&d.id))
                .cloned()
                .collect())
        }

        async fn search_by_query(
            &self,
            _index: &str,
            _text: &str,
            size: usize,
        ) -> Result<Vec<RawDocument>, BackendError> {
            Ok(self.0.iter().take(size).cloned().collect())
        }

        async fn get_by_id(&self, _index: &str, id: &str) -> Result<RawDocument, BackendError> {
            self.0
                .iter()
                .find(|d| d.id == id)
                .cloned()
                .ok_or_else(|| BackendError::NotFound(id.to_string()))
        }

        async fn search_raw(&self, _index: &str, _body: Value) -> Result<Vec<Value>, BackendError> {
            Ok(Vec::new())
        }
    }

    fn doc(id: &str, source: Value) -> RawDocument {
        RawDocument::new(id, source.as_object().cloned().unwrap_or_else(Map::new))
    }

    #[tokio::test]
    async fn metadata_tsv_follows_request_order() {
        let backend = FixedBackend(vec![
            doc("B", json!({"identifier": "B", "title": "second"})),
            doc("A", json!({"identifier": "A", "title": "first"})),
        ]);
        let text = render_metadata(
            &backend,
            &ProxyConfig::default(),
            "A,B",
            ExportFormat::Tsv,
            false,
        )
        .await
        .expect("render");

        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("identifier\ttitle\t"));
        assert!(rows[1].starts_with("A\tfirst\t"));
        assert!(rows[2].starts_with("B\tsecond\t"));
    }

    #[tokio::test]
    async fn metadata_tsv_without_matches_is_malformed() {
        let backend = FixedBackend(Vec::new());
        let result = render_metadata(
            &backend,
            &ProxyConfig::default(),
            "A",
            ExportFormat::Tsv,
            false,
        )
        .await;
        assert!(matches!(
            result,
            Err(AppError::Shaping(ShapingError::MalformedInput(_)))
        ));
    }

    #[tokio::test]
    async fn blank_id_list_is_a_usage_error() {
        let backend = FixedBackend(Vec::new());
        let result = render_plot(&backend, &ProxyConfig::default(), " , ", true).await;
        assert!(matches!(result, Err(AppError::Usage(_))));
    }

    #[tokio::test]
    async fn plot_renders_series_json() {
        let backend = FixedBackend(vec![
            doc(
                "S2",
                json!({"taxonomic_comparison": {"name": "S2", "composition": [{"taxon": "X", "value": 3}]}}),
            ),
            doc(
                "S1",
                json!({"taxonomic_comparison": {"name": "S1", "composition": [{"taxon": "X", "value": 1}]}}),
            ),
        ]);
        let text = render_plot(&backend, &ProxyConfig::default(), "S1,S2", true)
            .await
            .expect("render");
        let value: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(
            value,
            json!([{"x": ["S1", "S2"], "y": [1.0, 3.0], "name": "X", "type": "bar"}])
        );
    }

    #[tokio::test]
    async fn plot_axis_follows_requested_ids_not_labels() {
        let backend = FixedBackend(vec![
            doc(
                "SRS002",
                json!({"taxonomic_comparison": {"name": "gut-B", "composition": [{"taxon": "X", "value": 2}]}}),
            ),
            doc(
                "SRS001",
                json!({"taxonomic_comparison": {"name": "gut-A", "composition": [{"taxon": "X", "value": 1}]}}),
            ),
        ]);
        let text = render_plot(&backend, &ProxyConfig::default(), "SRS001,SRS002", true)
            .await
            .expect("render");
        let value: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value[0]["x"], json!(["gut-A", "gut-B"]));
        assert_eq!(value[0]["y"], json!([1.0, 2.0]));
    }

    #[tokio::test]
    async fn search_respects_size() {
        let backend = FixedBackend(vec![doc("A", json!({})), doc("B", json!({}))]);
        let config = ProxyConfig {
            search_size: 1,
            ..ProxyConfig::default()
        };
        let text = render_search(&backend, &config, "a", true)
            .await
            .expect("render");
        let hits: Vec<Value> = serde_json::from_str(&text).expect("json");
        assert_eq!(hits.len(), 1);
    }
}
