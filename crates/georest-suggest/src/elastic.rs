//! Elasticsearch `_msearch` backend for the document-search family.

use async_trait::async_trait;
use georest_resolver::http::{endpoint, HttpSettings};
use georest_resolver::retry::retry_with_backoff;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::error::SuggestError;
use crate::family::{DocumentSearch, MultiQueryBackend, SearchRequest};

const DEFAULT_BASE_URL: &str = "http://localhost:9200";
const BACKEND: &str = "elasticsearch";

#[derive(Debug, Deserialize)]
struct MultiSearchResponse {
    responses: Vec<Value>,
}

/// Sends each batch as one `_msearch` request with up to one concurrent
/// search per request.
pub struct ElasticsearchClient {
    client: Client,
    settings: HttpSettings,
    msearch_url: Url,
}

impl ElasticsearchClient {
    /// # Errors
    ///
    /// Returns [`SuggestError::Setup`] if the HTTP client cannot be built.
    pub fn new(settings: HttpSettings) -> Result<Self, SuggestError> {
        Self::with_base_url(settings, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`SuggestError::Setup`] if `base_url` is invalid or the HTTP
    /// client cannot be built.
    pub fn with_base_url(settings: HttpSettings, base_url: &str) -> Result<Self, SuggestError> {
        let setup = |reason: String| SuggestError::Setup {
            backend: BACKEND,
            reason,
        };
        let client = settings
            .build_client()
            .map_err(|e| setup(format!("http client: {e}")))?;
        let msearch_url = endpoint(base_url, "_msearch").map_err(|e| setup(e.to_string()))?;
        Ok(Self {
            client,
            settings,
            msearch_url,
        })
    }

    async fn post_batch(&self, url: &Url, body: String) -> Result<String, SuggestError> {
        let client = &self.client;
        let body = &body;
        retry_with_backoff(
            BACKEND,
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            move || async move {
                let response = client
                    .post(url.clone())
                    .header(CONTENT_TYPE, "application/x-ndjson")
                    .body(body.clone())
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|source| SuggestError::Transport {
                        backend: BACKEND,
                        source,
                    })?;
                response.text().await.map_err(|source| SuggestError::Transport {
                    backend: BACKEND,
                    source,
                })
            },
        )
        .await
    }
}

/// One header line and one body line per request, each newline-terminated.
fn ndjson(requests: &[SearchRequest]) -> String {
    let mut body = String::new();
    for request in requests {
        body.push_str(&serde_json::json!({ "index": request.index }).to_string());
        body.push('\n');
        body.push_str(&request.body.to_string());
        body.push('\n');
    }
    body
}

/// An item of `responses` either is a search response or carries `error`.
fn slot(item: Value) -> Result<Value, String> {
    let Some(error) = item.get("error") else {
        return Ok(item);
    };
    let reason = error.get("reason").and_then(Value::as_str);
    let kind = error.get("type").and_then(Value::as_str);
    Err(match (kind, reason) {
        (Some(kind), Some(reason)) => format!("{kind}: {reason}"),
        (None, Some(reason)) => reason.to_string(),
        _ => error.to_string(),
    })
}

#[async_trait]
impl MultiQueryBackend<DocumentSearch> for ElasticsearchClient {
    async fn multi_query(
        &self,
        requests: Vec<SearchRequest>,
    ) -> Result<Vec<Result<Value, String>>, SuggestError> {
        let mut url = self.msearch_url.clone();
        url.query_pairs_mut()
            .append_pair("max_concurrent_searches", &requests.len().to_string());

        tracing::debug!(searches = requests.len(), "sending _msearch batch");
        let text = self.post_batch(&url, ndjson(&requests)).await?;
        let parsed: MultiSearchResponse =
            serde_json::from_str(&text).map_err(|e| SuggestError::Backend {
                backend: BACKEND,
                message: format!("unexpected _msearch response: {e}"),
            })?;
        Ok(parsed.responses.into_iter().map(slot).collect())
    }
}
