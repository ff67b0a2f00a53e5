//! Shared HTTP client settings for provider clients.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ResolveError;
use crate::retry::retry_with_backoff;

/// Timeout, user agent and retry policy applied to every provider client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure, for transient errors only.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "georest/0.1 (geo-resolution)".to_string(),
            max_retries: 2,
            backoff_base_ms: 250,
        }
    }
}

impl HttpSettings {
    /// Builds a `reqwest::Client` with the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the client cannot be constructed.
    pub fn build_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(self.timeout_secs.min(10)))
            .user_agent(self.user_agent.clone())
            .build()
    }
}

/// Parses `base_url` and appends `path`, keeping any path prefix of the base.
///
/// `http://host/api` + `reverse` gives `http://host/api/reverse`.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidInput`] if the URL cannot be parsed.
pub fn endpoint(base_url: &str, path: &str) -> Result<Url, ResolveError> {
    // Exactly one trailing slash so `join` appends instead of replacing the
    // last path segment.
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised)
        .and_then(|base| base.join(path.trim_start_matches('/')))
        .map_err(|e| ResolveError::InvalidInput(format!("invalid base URL '{base_url}': {e}")))
}

/// Sends a GET to `url`, asserts a 2xx status and deserializes the JSON body.
///
/// Transient failures are retried per `settings`.
///
/// # Errors
///
/// - [`ResolveError::Transport`] on network failure or a non-2xx status.
/// - [`ResolveError::Parse`] if the body does not match `T`.
pub(crate) async fn get_json<T>(
    client: &Client,
    settings: &HttpSettings,
    provider: &'static str,
    url: &Url,
) -> Result<T, ResolveError>
where
    T: DeserializeOwned,
{
    retry_with_backoff(
        provider,
        settings.max_retries,
        settings.backoff_base_ms,
        move || async move {
            let response = client
                .get(url.clone())
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|source| ResolveError::Transport { provider, source })?;
            let body = response
                .text()
                .await
                .map_err(|source| ResolveError::Transport { provider, source })?;
            // The path only: the query may carry an API key.
            serde_json::from_str(&body).map_err(|source| ResolveError::Parse {
                context: format!("{provider} {}", url.path()),
                source,
            })
        },
    )
    .await
}
