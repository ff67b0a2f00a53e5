//! Retry with exponential back-off and jitter for provider HTTP calls.
//!
//! [`retry_with_backoff`] wraps any fallible async operation whose error type
//! implements [`Transient`]. Only transient failures are retried; everything
//! else is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ResolveError;

/// Classifies an error as worth retrying after a back-off delay.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Timeouts, connect failures, 5xx and 429 responses are transient.
#[must_use]
pub fn is_transient_http(err: &reqwest::Error) -> bool {
    err.is_timeout()
        || err.is_connect()
        || err
            .status()
            .is_some_and(|s| s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS)
}

impl Transient for ResolveError {
    fn is_transient(&self) -> bool {
        match self {
            ResolveError::Transport { source, .. } => is_transient_http(source),
            ResolveError::InvalidInput(_)
            | ResolveError::Backend { .. }
            | ResolveError::Provider { .. }
            | ResolveError::Parse { .. }
            | ResolveError::Cancelled => false,
        }
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The sleep before retry `n` is `backoff_base_ms * 2^(n-1)` with ±25 % jitter,
/// capped at 30 s.
pub async fn retry_with_backoff<T, E, F, Fut>(
    label: &str,
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, E>
where
    E: Transient + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    provider = label,
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient provider error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
