use thiserror::Error;

/// Errors returned by resolvers and their collaborators.
///
/// A cache miss is not an error: cache lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The caller supplied something that cannot be resolved.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network, TLS or non-2xx HTTP failure talking to a provider.
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// A non-HTTP backend (such as a cache store) failed.
    #[error("{backend} backend error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    /// The provider answered but had no usable result.
    #[error("{provider} returned no result: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// The provider response could not be deserialized.
    #[error("malformed response from {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("resolution cancelled")]
    Cancelled,
}

impl ResolveError {
    /// The backend could not be reached or failed outright.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Backend { .. })
    }
}
