//! Cache-then-provider resolution with write-back.

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ResolveError;

/// The primary, persistent tier.
///
/// `get` returns `Ok(None)` on a miss. `put` is an upsert: concurrent writes
/// for the same key may race and the last one wins.
#[async_trait]
pub trait CacheStore<K, V>: Send + Sync {
    async fn get(&self, key: &K) -> Result<Option<V>, ResolveError>;
    async fn put(&self, key: &K, value: &V) -> Result<(), ResolveError>;
}

/// The external provider consulted on a cache miss.
#[async_trait]
pub trait Fallback<K, V>: Send + Sync {
    async fn fetch(&self, key: &K) -> Result<V, ResolveError>;
}

/// Races `fut` against cancellation of `cancel`.
pub(crate) async fn guarded<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ResolveError>
where
    F: Future<Output = Result<T, ResolveError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ResolveError::Cancelled),
        result = fut => result,
    }
}

/// Generic two-tier resolver.
///
/// 1. Look the key up in the cache; a hit is returned as is.
/// 2. On a miss, ask the fallback provider.
/// 3. Write the fetched value back to the cache. A failed write-back is
///    logged and does not fail the resolve.
///
/// A cache error other than a miss is returned without consulting the
/// provider. There is no per-key locking: concurrent misses for the same key
/// may each fetch and each write back.
pub struct TwoTierResolver<K, V> {
    name: &'static str,
    cache: Arc<dyn CacheStore<K, V>>,
    fallback: Arc<dyn Fallback<K, V>>,
}

impl<K, V> Clone for TwoTierResolver<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            cache: Arc::clone(&self.cache),
            fallback: Arc::clone(&self.fallback),
        }
    }
}

impl<K, V> TwoTierResolver<K, V>
where
    K: Debug + Send + Sync,
    V: Send + Sync,
{
    #[must_use]
    pub fn new(
        name: &'static str,
        cache: Arc<dyn CacheStore<K, V>>,
        fallback: Arc<dyn Fallback<K, V>>,
    ) -> Self {
        Self {
            name,
            cache,
            fallback,
        }
    }

    /// Resolves `key`, falling back to the provider on a cache miss.
    ///
    /// # Errors
    ///
    /// - Any cache error other than a miss, unchanged.
    /// - Any provider error, unchanged.
    /// - [`ResolveError::Cancelled`] if `cancel` fires before a value is obtained.
    pub async fn resolve(&self, key: &K, cancel: &CancellationToken) -> Result<V, ResolveError> {
        if let Some(hit) = guarded(cancel, self.cache.get(key)).await? {
            tracing::debug!(resolver = self.name, ?key, "cache hit");
            return Ok(hit);
        }

        tracing::debug!(resolver = self.name, ?key, "cache miss, asking provider");
        let value = guarded(cancel, self.fallback.fetch(key)).await?;

        if let Err(e) = guarded(cancel, self.cache.put(key, &value)).await {
            tracing::warn!(
                resolver = self.name,
                ?key,
                error = %e,
                "cache write-back failed"
            );
        }

        Ok(value)
    }
}

#[cfg(test)]
#[path = "tier_test.rs"]
mod tests;
