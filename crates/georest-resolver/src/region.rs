//! Region identifier to boundary polygon resolution.

use std::sync::Arc;

use async_trait::async_trait;
use georest_core::{Polygon, RegionIdentifier};
use tokio_util::sync::CancellationToken;

use crate::error::ResolveError;
use crate::tier::{guarded, CacheStore, Fallback, TwoTierResolver};

/// An external source of region boundaries and display names.
#[async_trait]
pub trait RegionProvider: Send + Sync {
    async fn resolve_boundary(&self, region: &RegionIdentifier) -> Result<Polygon, ResolveError>;

    /// A short human-readable name for `region`.
    async fn lookup_display_name(&self, region: &RegionIdentifier)
        -> Result<String, ResolveError>;
}

/// Treats a cached polygon with zero points as a miss.
struct NonEmptyPolygons(Arc<dyn CacheStore<RegionIdentifier, Polygon>>);

#[async_trait]
impl CacheStore<RegionIdentifier, Polygon> for NonEmptyPolygons {
    async fn get(&self, key: &RegionIdentifier) -> Result<Option<Polygon>, ResolveError> {
        Ok(self.0.get(key).await?.filter(|polygon| !polygon.is_empty()))
    }

    async fn put(&self, key: &RegionIdentifier, value: &Polygon) -> Result<(), ResolveError> {
        self.0.put(key, value).await
    }
}

struct BoundaryFallback(Arc<dyn RegionProvider>);

#[async_trait]
impl Fallback<RegionIdentifier, Polygon> for BoundaryFallback {
    async fn fetch(&self, key: &RegionIdentifier) -> Result<Polygon, ResolveError> {
        self.0.resolve_boundary(key).await
    }
}

/// Resolves region boundaries through the cache, falling back to a
/// [`RegionProvider`].
///
/// Display names are not cached and are never fetched as part of a boundary
/// resolve; see [`RegionResolver::lookup_display_name`].
#[derive(Clone)]
pub struct RegionResolver {
    inner: TwoTierResolver<RegionIdentifier, Polygon>,
    provider: Arc<dyn RegionProvider>,
}

impl RegionResolver {
    #[must_use]
    pub fn new(
        cache: Arc<dyn CacheStore<RegionIdentifier, Polygon>>,
        provider: Arc<dyn RegionProvider>,
    ) -> Self {
        let cache: Arc<dyn CacheStore<RegionIdentifier, Polygon>> =
            Arc::new(NonEmptyPolygons(cache));
        let fallback = Arc::new(BoundaryFallback(Arc::clone(&provider)));
        Self {
            inner: TwoTierResolver::new("region", cache, fallback),
            provider,
        }
    }

    /// # Errors
    ///
    /// Any cache, provider or cancellation error from the underlying resolve.
    pub async fn resolve(
        &self,
        region: &RegionIdentifier,
        cancel: &CancellationToken,
    ) -> Result<Polygon, ResolveError> {
        self.inner.resolve(region, cancel).await
    }

    /// Asks the provider directly for the region's display name.
    ///
    /// # Errors
    ///
    /// Any provider error, or [`ResolveError::Cancelled`].
    pub async fn lookup_display_name(
        &self,
        region: &RegionIdentifier,
        cancel: &CancellationToken,
    ) -> Result<String, ResolveError> {
        guarded(cancel, self.provider.lookup_display_name(region)).await
    }

    /// The underlying provider, for callers that enrich many regions at once.
    #[must_use]
    pub fn provider(&self) -> Arc<dyn RegionProvider> {
        Arc::clone(&self.provider)
    }
}

#[cfg(test)]
#[path = "region_test.rs"]
mod tests;
