use georest_core::EngineKey;
use georest_resolver::retry::{is_transient_http, Transient};
use georest_resolver::ResolveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuggestError {
    /// Network, TLS or non-2xx HTTP failure for a whole batch.
    #[error("{backend} request failed: {source}")]
    Transport {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered the batch with something other than a batch response.
    #[error("{backend} backend error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    /// A client could not be constructed from its settings.
    #[error("{backend} client setup failed: {reason}")]
    Setup {
        backend: &'static str,
        reason: String,
    },

    #[error("batch returned {got} responses for {expected} requests")]
    BatchShape { expected: usize, got: usize },

    /// One engine's response could not be turned into hits.
    #[error("engine '{engine}' could not parse its response: {reason}")]
    Parse { engine: EngineKey, reason: String },

    /// One engine's query failed inside an otherwise successful batch.
    #[error("engine '{engine}' failed inside the batch: {reason}")]
    PartialBatchFailure { engine: EngineKey, reason: String },

    #[error("region name lookup failed: {0}")]
    Lookup(#[source] ResolveError),

    #[error("suggestion task failed: {0}")]
    Task(String),

    #[error("suggestion cancelled")]
    Cancelled,
}

impl SuggestError {
    /// The whole batch failed; no engine produced results.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Backend { .. } | Self::BatchShape { .. }
        )
    }
}

impl Transient for SuggestError {
    fn is_transient(&self) -> bool {
        match self {
            SuggestError::Transport { source, .. } => is_transient_http(source),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Parse,
    PartialBatch,
    Lookup,
}

/// Why an engine contributed no hits to an otherwise successful round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    pub kind: FailureKind,
    pub reason: String,
}

impl EngineFailure {
    #[must_use]
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.reason)
    }
}
