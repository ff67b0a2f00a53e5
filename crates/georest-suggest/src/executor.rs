//! One multi-query round for all engines of a backend family.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use georest_core::EngineKey;
use tokio_util::sync::CancellationToken;

use crate::error::{EngineFailure, FailureKind, SuggestError};
use crate::family::{BackendFamily, MultiQueryBackend, SuggestEngine};
use crate::hits::{EngineEntry, EngineResultSet};

/// Object-safe view of a [`SuggestExecutor`] for any family.
#[async_trait]
pub trait Executor: Send + Sync {
    fn family(&self) -> &'static str;

    fn engine_keys(&self) -> Vec<EngineKey>;

    async fn suggest(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<EngineResultSet, SuggestError>;
}

/// Runs every registered engine of family `F` in a single backend batch.
///
/// The batch either fails as a whole (transport, shape, cancellation) or
/// yields exactly one entry per engine key. A request that failed inside the
/// batch, or a response its engine could not parse, becomes a failed entry
/// for that engine only. Engines registered under the same key share one
/// entry holding the union of their hits.
pub struct SuggestExecutor<F: BackendFamily> {
    backend: Arc<dyn MultiQueryBackend<F>>,
    engines: Vec<(EngineKey, Arc<dyn SuggestEngine<F>>)>,
}

impl<F: BackendFamily> SuggestExecutor<F> {
    #[must_use]
    pub fn new(backend: Arc<dyn MultiQueryBackend<F>>) -> Self {
        Self {
            backend,
            engines: Vec::new(),
        }
    }

    /// Registers an engine. Engines run in registration order, and each one
    /// sends its own request even when its key is already taken.
    pub fn add_engine(&mut self, key: EngineKey, engine: Arc<dyn SuggestEngine<F>>) {
        self.engines.push((key, engine));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    async fn run(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<EngineResultSet, SuggestError> {
        let requests: Vec<F::Request> = self
            .engines
            .iter()
            .map(|(_, engine)| engine.build_request(text))
            .collect();
        let expected = requests.len();

        let responses = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(SuggestError::Cancelled),
            batch = self.backend.multi_query(requests) => batch?,
        };
        if responses.len() != expected {
            return Err(SuggestError::BatchShape {
                expected,
                got: responses.len(),
            });
        }

        let parsed = join_all(self.engines.iter().zip(responses).map(
            |((key, engine), response)| async move {
                let entry = match response {
                    Ok(body) => match engine.parse_response(body, cancel).await {
                        Ok(hits) => EngineEntry::ok(hits),
                        Err(SuggestError::Cancelled) => return Err(SuggestError::Cancelled),
                        Err(err) => EngineEntry::failed(engine_failure(&err)),
                    },
                    Err(reason) => EngineEntry::failed(engine_failure(
                        &SuggestError::PartialBatchFailure {
                            engine: *key,
                            reason,
                        },
                    )),
                };
                Ok((*key, entry))
            },
        ))
        .await;

        let mut results = EngineResultSet::new();
        for outcome in parsed {
            let (key, entry) = outcome?;
            if let Some(failure) = &entry.failure {
                tracing::warn!(
                    family = F::NAME,
                    engine = %key,
                    failure = %failure,
                    "engine contributed no results"
                );
            }
            results.absorb(key, entry);
        }
        Ok(results)
    }
}

fn engine_failure(err: &SuggestError) -> EngineFailure {
    let kind = match err {
        SuggestError::Lookup(_) => FailureKind::Lookup,
        SuggestError::PartialBatchFailure { .. } => FailureKind::PartialBatch,
        _ => FailureKind::Parse,
    };
    EngineFailure::new(kind, err.to_string())
}

#[async_trait]
impl<F: BackendFamily> Executor for SuggestExecutor<F> {
    fn family(&self) -> &'static str {
        F::NAME
    }

    fn engine_keys(&self) -> Vec<EngineKey> {
        self.engines.iter().map(|(key, _)| *key).collect()
    }

    async fn suggest(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<EngineResultSet, SuggestError> {
        if self.engines.is_empty() {
            return Ok(EngineResultSet::new());
        }
        tracing::debug!(family = F::NAME, engines = self.engines.len(), "running batch");
        self.run(text, cancel).await
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
