//! Bounded worker pool that attaches display names to region hits.

use std::sync::Arc;

use georest_core::{RegionIdentifier, RegionSuggestion};
use georest_resolver::{RegionProvider, ResolveError};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::SuggestError;

type Indexed<T> = (usize, T);
type SharedReceiver = Arc<Mutex<mpsc::Receiver<Indexed<RegionIdentifier>>>>;

/// Looks up display names for many regions with at most `concurrency`
/// lookups in flight.
///
/// Workers pull regions from a shared queue, send named results to an output
/// channel and report failures on a one-slot error channel; extra errors are
/// dropped. Any failure fails the whole batch, and no worker takes another
/// region after it.
///
/// The cancellation token only stops workers from taking new regions. A
/// lookup already in flight runs to completion, with no timeout of its own.
pub struct ConcurrentLookupService {
    provider: Arc<dyn RegionProvider>,
    concurrency: usize,
}

impl ConcurrentLookupService {
    /// A `concurrency` of zero is raised to one.
    #[must_use]
    pub fn new(provider: Arc<dyn RegionProvider>, concurrency: usize) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
        }
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Names every region in `regions`, preserving input order.
    ///
    /// # Errors
    ///
    /// - [`SuggestError::Lookup`] with the first lookup failure observed.
    /// - [`SuggestError::Cancelled`] if `cancel` fired before every region was named.
    /// - [`SuggestError::Task`] if a worker panicked.
    pub async fn lookup_all(
        &self,
        regions: Vec<RegionIdentifier>,
        cancel: &CancellationToken,
    ) -> Result<Vec<RegionSuggestion>, SuggestError> {
        let total = regions.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let (input_tx, input_rx) = mpsc::channel::<Indexed<RegionIdentifier>>(self.concurrency);
        let (output_tx, mut output_rx) =
            mpsc::channel::<Indexed<RegionSuggestion>>(self.concurrency);
        let (error_tx, mut error_rx) = mpsc::channel::<ResolveError>(1);

        let input_rx: SharedReceiver = Arc::new(Mutex::new(input_rx));
        // Cancelled by the caller, or by the first worker that sees an error.
        let stop = cancel.child_token();
        let mut workers = JoinSet::new();
        for _ in 0..self.concurrency {
            workers.spawn(lookup_worker(
                Arc::clone(&self.provider),
                Arc::clone(&input_rx),
                output_tx.clone(),
                error_tx.clone(),
                stop.clone(),
            ));
        }
        // Only workers hold the channel ends from here on, so the input side
        // closes once they all exit and the output side once they all finish.
        drop(input_rx);
        drop(output_tx);
        drop(error_tx);

        let produce = async move {
            for item in regions.into_iter().enumerate() {
                if input_tx.send(item).await.is_err() {
                    break;
                }
            }
        };
        let drain = async {
            let mut collected = Vec::with_capacity(total);
            while let Some(item) = output_rx.recv().await {
                collected.push(item);
            }
            collected
        };
        let ((), mut collected) = tokio::join!(produce, drain);

        while let Some(joined) = workers.join_next().await {
            joined.map_err(|e| SuggestError::Task(e.to_string()))?;
        }

        if let Ok(err) = error_rx.try_recv() {
            return Err(SuggestError::Lookup(err));
        }
        if collected.len() < total {
            return Err(SuggestError::Cancelled);
        }

        collected.sort_by_key(|(idx, _)| *idx);
        Ok(collected.into_iter().map(|(_, named)| named).collect())
    }
}

async fn lookup_worker(
    provider: Arc<dyn RegionProvider>,
    input: SharedReceiver,
    output: mpsc::Sender<Indexed<RegionSuggestion>>,
    errors: mpsc::Sender<ResolveError>,
    stop: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            biased;
            () = stop.cancelled() => break,
            next = async { input.lock().await.recv().await } => next,
        };
        let Some((idx, region)) = next else {
            break;
        };
        match provider.lookup_display_name(&region).await {
            Ok(name) => {
                if output
                    .send((idx, RegionSuggestion { region, name }))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(err) => {
                tracing::warn!(%region, error = %err, "region name lookup failed");
                // One error is enough to fail the batch.
                let _ = errors.try_send(err);
                stop.cancel();
            }
        }
    }
}

#[cfg(test)]
#[path = "lookup_test.rs"]
mod tests;
