//! # Elasticsearch Client
//!
//! `SearchBackend` over the Elasticsearch HTTP API.

use super::{BackendError, SearchBackend};
use biosearch_core::RawDocument;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

/// `{"hits": {"hits": [...]}}` envelope of a search response.
#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    hits: HitList<T>,
}

#[derive(Debug, Deserialize)]
struct HitList<T> {
    #[serde(default = "Vec::new")]
    hits: Vec<T>,
}

/// HTTP client for one Elasticsearch node.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ElasticClient {
    /// Create a client for the node at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            BackendError::InvalidRequest(format!("invalid backend url '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidRequest(format!(
                "backend url '{base_url}' cannot be a base"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::BackendUnavailable(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// Build `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BackendError::InvalidRequest(format!(
                    "backend url '{}' cannot be a base",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// POST a query body to `{index}/_search` and unwrap the hit list.
    async fn search<T: DeserializeOwned>(
        &self,
        index: &str,
        body: &Value,
    ) -> Result<Vec<T>, BackendError> {
        let url = self.endpoint(&[index, "_search"])?;
        tracing::debug!(%url, "backend search");
        let resp = self.send(self.http.post(url).json(body)).await?;
        let resp = check_status(resp, index).await?;
        let parsed: SearchResponse<T> = resp
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        Ok(parsed.hits.hits)
    }

    /// Send a request and classify transport failures.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        req.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::BackendUnavailable(format!("{}: {e}", self.base_url))
            }
        })
    }
}

/// Map HTTP status codes onto backend failure classes.
async fn check_status(
    resp: reqwest::Response,
    target: &str,
) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound(target.to_string()));
    }
    if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
        return Err(BackendError::Timeout);
    }
    let body = resp.text().await.unwrap_or_default();
    if status.is_client_error() {
        Err(BackendError::InvalidRequest(format!("{status}: {body}")))
    } else {
        Err(BackendError::BackendUnavailable(format!("{status}: {body}")))
    }
}

/// `terms` query on the document id.
fn ids_query(ids: &[String]) -> Value {
    json!({
        "size": ids.len(),
        "query": {
            "terms": { "_id": ids }
        }
    })
}

/// Case-insensitive substring match on `id` or `label`.
fn keyword_query(text: &str, size: usize) -> Value {
    let pattern = format!("*{}*", text.to_lowercase());
    json!({
        "size": size,
        "query": {
            "bool": {
                "should": [
                    { "wildcard": { "id": { "value": pattern } } },
                    { "wildcard": { "label": { "value": pattern } } }
                ],
                "minimum_should_match": 1
            }
        }
    })
}

impl SearchBackend for ElasticClient {
    async fn search_by_ids(
        &self,
        index: &str,
        ids: &[String],
    ) -> Result<Vec<RawDocument>, BackendError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.search(index, &ids_query(ids)).await
    }

    async fn search_by_query(
        &self,
        index: &str,
        text: &str,
        size: usize,
    ) -> Result<Vec<RawDocument>, BackendError> {
        self.search(index, &keyword_query(text, size)).await
    }

    async fn get_by_id(&self, index: &str, id: &str) -> Result<RawDocument, BackendError> {
        let url = self.endpoint(&[index, "_doc", id])?;
        tracing::debug!(%url, "backend get");
        let resp = self.send(self.http.get(url)).await?;
        let resp = check_status(resp, id).await?;
        resp.json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn search_raw(&self, index: &str, body: Value) -> Result<Vec<Value>, BackendError> {
        self.search(index, &body).await
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ElasticClient {
        ElasticClient::new(base, Duration::from_secs(1)).expect("client")
    }

    #[test]
    fn ids_query_uses_terms_on_id() {
        let ids = vec!["SRS1".to_string(), "SRS2".to_string()];
        assert_eq!(
            ids_query(&ids),
            json!({"size": 2, "query": {"terms": {"_id": ["SRS1", "SRS2"]}}})
        );
    }

    #[test]
    fn keyword_query_is_lowercased_wildcard() {
        let query = keyword_query("PRJDB", 10);
        assert_eq!(query["size"], json!(10));
        assert_eq!(
            query["query"]["bool"]["should"][0]["wildcard"]["id"]["value"],
            json!("*prjdb*")
        );
        assert_eq!(
            query["query"]["bool"]["should"][1]["wildcard"]["label"]["value"],
            json!("*prjdb*")
        );
        assert_eq!(query["query"]["bool"]["minimum_should_match"], json!(1));
    }

    #[test]
    fn endpoint_encodes_segments() {
        let client = client("http://es01:9200/");
        let url = client
            .endpoint(&["bioproject", "_doc", "a/b c"])
            .expect("url");
        assert_eq!(url.as_str(), "http://es01:9200/bioproject/_doc/a%2Fb%20c");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = client("http://proxy/es");
        let url = client.endpoint(&["bioproject", "_search"]).expect("url");
        assert_eq!(url.as_str(), "http://proxy/es/bioproject/_search");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            ElasticClient::new("not a url", Duration::from_secs(1)),
            Err(BackendError::InvalidRequest(_))
        ));
        assert!(matches!(
            ElasticClient::new("mailto:someone@example.org", Duration::from_secs(1)),
            Err(BackendError::InvalidRequest(_))
        ));
    }

    #[test]
    fn search_envelope_parses_hits() {
        let body = json!({
            "took": 1,
            "hits": {"total": {"value": 1}, "hits": [{"_id": "PRJDB1", "_source": {"title": "t"}}]}
        });
        let parsed: SearchResponse<RawDocument> = serde_json::from_value(body).expect("parse");
        assert_eq!(parsed.hits.hits.len(), 1);
        assert_eq!(parsed.hits.hits[0].id, "PRJDB1");
    }
}
