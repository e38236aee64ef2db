//! # API Endpoint Handlers
//!
//! Each handler makes one backend call, then applies at most one shaping
//! transform from `biosearch-core`.

use super::{
    ApiError, AppState,
    types::{
        ExportFormat, HealthResponse, MetadataParams, PlotParams, RawSearchResponse,
        SearchParams, SearchResponse,
    },
};
use crate::backend::{SearchBackend, order_by_request, parse_id_list};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use biosearch_core::{
    CompositionEntry, RawDocument, Series, encode_records, pivot_composition, project_metadata,
};
use serde_json::Value;

/// Attachment name of the metadata export.
const METADATA_FILENAME: &str = "metadata.tsv";

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// SEARCH HANDLERS
// =============================================================================

/// Keyword search over project ids and labels. No query, no hits.
pub async fn search_handler<B: SearchBackend>(
    State(state): State<AppState<B>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Some(q) = params.q.filter(|q| !q.trim().is_empty()) else {
        return Ok(Json(SearchResponse::default()));
    };
    tracing::info!(query = %q, "keyword search");

    let hits = state
        .backend
        .search_by_query(&state.config.project_index, &q, state.config.search_size)
        .await?;
    Ok(Json(SearchResponse { hits }))
}

/// Forward a query body to the project index unchanged.
pub async fn project_search_handler<B: SearchBackend>(
    State(state): State<AppState<B>>,
    Json(body): Json<Value>,
) -> Result<Json<RawSearchResponse>, ApiError> {
    if !body.is_object() {
        return Err(ApiError::BadRequest(
            "query body must be a JSON object".to_string(),
        ));
    }
    let hits = state
        .backend
        .search_raw(&state.config.project_index, body)
        .await?;
    Ok(Json(RawSearchResponse::new(hits)))
}

/// Fetch one project document.
pub async fn document_handler<B: SearchBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<RawDocument>, ApiError> {
    let document = state
        .backend
        .get_by_id(&state.config.project_index, &id)
        .await?;
    Ok(Json(document))
}

// =============================================================================
// METADATA HANDLER
// =============================================================================

/// Flat metadata for the requested projects, as JSON or a TSV attachment.
///
/// Records follow the requested id order.
pub async fn metadata_handler<B: SearchBackend>(
    State(state): State<AppState<B>>,
    Query(params): Query<MetadataParams>,
) -> Result<Response, ApiError> {
    let ids = required_ids(params.ids.as_deref(), "ids")?;

    let documents = state
        .backend
        .search_by_ids(&state.config.project_index, &ids)
        .await?;
    let documents = order_by_request(documents, &ids);
    let records = project_metadata(&documents);
    tracing::info!(requested = ids.len(), found = records.len(), "metadata");

    match params.format {
        ExportFormat::Json => Ok(Json(records).into_response()),
        ExportFormat::Tsv => {
            if records.is_empty() {
                return Err(ApiError::NotFound(
                    "no documents matched the requested ids".to_string(),
                ));
            }
            let body = encode_records(&records)?;
            Ok((
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        "text/tab-separated-values; charset=utf-8".to_string(),
                    ),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{METADATA_FILENAME}\""),
                    ),
                ],
                body,
            )
                .into_response())
        }
    }
}

// =============================================================================
// PLOT DATA HANDLER
// =============================================================================

/// Bar series of per-sample compositions, one series per taxon.
///
/// The x axis follows the requested id order.
pub async fn plot_data_handler<B: SearchBackend>(
    State(state): State<AppState<B>>,
    Query(params): Query<PlotParams>,
) -> Result<Json<Vec<Series>>, ApiError> {
    let ids = required_ids(params.id.as_deref(), "id")?;
    if let Some(view) = params.view.as_deref().filter(|v| !v.is_empty()) {
        tracing::debug!(view, "view selection is not supported, ignoring");
    }

    let documents = state
        .backend
        .search_by_ids(&state.config.composition_index, &ids)
        .await?;
    let entries = documents
        .iter()
        .map(CompositionEntry::from_document)
        .collect::<Result<Vec<_>, _>>()?;
    let series = pivot_composition(&entries, Some(ids.as_slice()))?;
    tracing::info!(samples = entries.len(), series = series.len(), "plot data");

    Ok(Json(series))
}

/// Parse a required comma-separated id parameter.
fn required_ids(raw: Option<&str>, name: &str) -> Result<Vec<String>, ApiError> {
    let ids = raw.map(parse_id_list).unwrap_or_default();
    if ids.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "missing required parameter '{name}'"
        )));
    }
    Ok(ids)
}
