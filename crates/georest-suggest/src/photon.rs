//! Photon place search and the map-search batch built on top of it.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::try_join_all;
use georest_resolver::http::HttpSettings;
use georest_resolver::retry::retry_with_backoff;
use reqwest::{Client, Url};

use crate::error::SuggestError;
use crate::family::{MapSearch, MapSearchProvider, MapSearchQuery, MultiQueryBackend};

const DEFAULT_BASE_URL: &str = "http://localhost:2322/api";
const BACKEND: &str = "photon";

pub struct PhotonClient {
    client: Client,
    settings: HttpSettings,
    search_url: Url,
}

impl PhotonClient {
    /// # Errors
    ///
    /// Returns [`SuggestError::Setup`] if the HTTP client cannot be built.
    pub fn new(settings: HttpSettings) -> Result<Self, SuggestError> {
        Self::with_base_url(settings, DEFAULT_BASE_URL)
    }

    /// `base_url` is the search endpoint itself, e.g. `http://host:2322/api`.
    ///
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
        let search_url =
            Url::parse(base_url).map_err(|e| setup(format!("invalid base URL '{base_url}': {e}")))?;
        Ok(Self {
            client,
            settings,
            search_url,
        })
    }

    fn build_url(&self, query: &MapSearchQuery) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &query.text);
            for tag in &query.tags {
                pairs.append_pair("osm_tag", tag);
            }
            pairs.append_pair("limit", &query.limit.to_string());
        }
        url
    }
}

#[async_trait]
impl MapSearchProvider for PhotonClient {
    async fn search(&self, query: &MapSearchQuery) -> Result<Bytes, SuggestError> {
        let url = &self.build_url(query);
        let client = &self.client;
        retry_with_backoff(
            BACKEND,
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            move || async move {
                let transport = |source| SuggestError::Transport {
                    backend: BACKEND,
                    source,
                };
                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(transport)?;
                response.bytes().await.map_err(transport)
            },
        )
        .await
    }
}

/// Runs one provider search per query concurrently. Any failed search fails
/// the whole batch.
pub struct MapSearchBatch {
    provider: Arc<dyn MapSearchProvider>,
}

impl MapSearchBatch {
    #[must_use]
    pub fn new(provider: Arc<dyn MapSearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl MultiQueryBackend<MapSearch> for MapSearchBatch {
    async fn multi_query(
        &self,
        requests: Vec<MapSearchQuery>,
    ) -> Result<Vec<Result<Bytes, String>>, SuggestError> {
        let bodies = try_join_all(requests.iter().map(|query| self.provider.search(query))).await?;
        Ok(bodies.into_iter().map(Ok).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_repeats_osm_tag_per_filter() {
        let client =
            PhotonClient::with_base_url(HttpSettings::default(), "http://localhost:2322/api")
                .unwrap();
        let url = client.build_url(&MapSearchQuery {
            text: "Тверская".to_string(),
            limit: 10,
            tags: vec!["place:city".to_string(), "boundary:administrative".to_string()],
        });
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(url.path(), "/api");
        assert_eq!(
            pairs,
            [
                ("q".to_string(), "Тверская".to_string()),
                ("osm_tag".to_string(), "place:city".to_string()),
                ("osm_tag".to_string(), "boundary:administrative".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn garbage_base_url_is_setup_error() {
        let err = PhotonClient::with_base_url(HttpSettings::default(), "::nope").err();
        assert!(matches!(err, Some(SuggestError::Setup { backend: "photon", .. })));
    }
}
