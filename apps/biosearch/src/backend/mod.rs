//! # Search Backend
//!
//! The narrow interface the proxy uses to reach the document search backend.
//!
//! The backend is an explicit dependency: the server state and the CLI
//! commands receive an implementation instead of reaching for a shared
//! client. `ElasticClient` talks to Elasticsearch over HTTP; tests plug in
//! in-memory doubles.
//!
//! ## Failure Classes
//!
//! Every backend failure is one of `NotFound`, `BackendUnavailable`,
//! `Timeout`, `InvalidRequest` or `InvalidResponse`, and is propagated to the
//! caller unchanged. There is no retry here.

mod elastic;

pub use elastic::ElasticClient;

use biosearch_core::RawDocument;
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

/// Errors from the search backend layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The index or document does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend cannot be reached or answered with a server error.
    #[error("Search backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend did not answer within the configured timeout.
    #[error("Search backend timed out")]
    Timeout,

    /// The request could not be built or was rejected by the backend.
    #[error("Invalid backend request: {0}")]
    InvalidRequest(String),

    /// The backend answered with a body that could not be parsed.
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

/// Document search backend.
///
/// Result order is whatever the backend returns; it is not guaranteed to
/// follow the requested id order (see `order_by_request`).
pub trait SearchBackend: Send + Sync + 'static {
    /// Fetch the documents whose ids are in `ids`.
    fn search_by_ids(
        &self,
        index: &str,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<RawDocument>, BackendError>> + Send;

    /// Keyword search over identifiers and labels, at most `size` hits.
    fn search_by_query(
        &self,
        index: &str,
        text: &str,
        size: usize,
    ) -> impl Future<Output = Result<Vec<RawDocument>, BackendError>> + Send;

    /// Fetch one document by id.
    fn get_by_id(
        &self,
        index: &str,
        id: &str,
    ) -> impl Future<Output = Result<RawDocument, BackendError>> + Send;

    /// Run a caller-supplied query body and return the raw hits.
    fn search_raw(
        &self,
        index: &str,
        body: Value,
    ) -> impl Future<Output = Result<Vec<Value>, BackendError>> + Send;
}

/// Arrange documents to follow the requested id order.
///
/// Requested ids the backend did not return are skipped; returned documents
/// not named in the request keep their backend order after the named ones.
#[must_use]
pub fn order_by_request(documents: Vec<RawDocument>, ids: &[String]) -> Vec<RawDocument> {
    let mut pending: Vec<Option<RawDocument>> = documents.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(pending.len());

    for id in ids {
        let slot = pending
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|doc| doc.id == *id));
        if let Some(doc) = slot.and_then(Option::take) {
            ordered.push(doc);
        }
    }
    ordered.extend(pending.into_iter().flatten());
    ordered
}

/// Split a comma-separated id list, dropping blanks.
#[must_use]
pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
