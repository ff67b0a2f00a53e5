//! Runs every executor for one query and merges their results.

use std::sync::Arc;

use georest_core::{EngineKey, Suggestion};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::assemble::build_suggestion;
use crate::error::SuggestError;
use crate::executor::Executor;
use crate::hits::EngineResultSet;

/// Fans a query out to all executors, one task each, and merges the result
/// sets in registration order.
///
/// The first executor error is returned as soon as it is observed. Tasks
/// still running at that point are detached: they drain on their own and
/// their results are discarded.
#[derive(Default, Clone)]
pub struct SuggestionService {
    executors: Vec<Arc<dyn Executor>>,
}

impl SuggestionService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, executor: Arc<dyn Executor>) {
        self.executors.push(executor);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }

    /// Every engine key served by this service, executor by executor.
    #[must_use]
    pub fn engine_keys(&self) -> Vec<EngineKey> {
        self.executors
            .iter()
            .flat_map(|executor| executor.engine_keys())
            .collect()
    }

    /// Runs all executors for `text` and returns the merged result set.
    ///
    /// # Errors
    ///
    /// Returns the first executor error observed, or [`SuggestError::Task`]
    /// if an executor task panicked.
    pub async fn suggest(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<EngineResultSet, SuggestError> {
        let mut tasks = JoinSet::new();
        for (position, executor) in self.executors.iter().enumerate() {
            let executor = Arc::clone(executor);
            let text = text.to_string();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let outcome = executor.suggest(&text, &cancel).await;
                (position, executor.family(), outcome)
            });
        }

        let mut rounds: Vec<Option<EngineResultSet>> = vec![None; self.executors.len()];
        while let Some(joined) = tasks.join_next().await {
            let (position, family, outcome) = match joined {
                Ok(done) => done,
                Err(err) => {
                    tasks.detach_all();
                    return Err(SuggestError::Task(err.to_string()));
                }
            };
            match outcome {
                Ok(results) => rounds[position] = Some(results),
                Err(err) => {
                    tracing::warn!(family, error = %err, "suggestion round failed");
                    tasks.detach_all();
                    return Err(err);
                }
            }
        }

        let mut merged = EngineResultSet::new();
        for results in rounds.into_iter().flatten() {
            merged.merge(results);
        }
        tracing::debug!(engines = merged.len(), "suggestion round merged");
        Ok(merged)
    }

    /// Runs [`Self::suggest`] and decodes the merged hits into a [`Suggestion`].
    ///
    /// # Errors
    ///
    /// Any error of [`Self::suggest`], or [`SuggestError::Parse`] if a hit
    /// payload does not decode into its category's record type.
    pub async fn suggest_all(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Suggestion, SuggestError> {
        let results = self.suggest(text, cancel).await?;
        build_suggestion(&results)
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
