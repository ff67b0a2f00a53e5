//! Bidirectional address and coordinate resolution.

use std::sync::Arc;

use async_trait::async_trait;
use georest_core::{GeoPoint, Location};
use tokio_util::sync::CancellationToken;

use crate::error::ResolveError;
use crate::tier::{CacheStore, Fallback, TwoTierResolver};

/// Forward and reverse geocoding.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, ResolveError>;
    async fn reverse_geocode(&self, point: GeoPoint) -> Result<String, ResolveError>;
}

/// The side of a [`Location`] that is already known.
#[derive(Debug, Clone, PartialEq)]
pub enum AddressKey {
    Address(String),
    Point(GeoPoint),
}

/// An address paired with its coordinate; the value stored in the address cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub address: String,
    pub point: GeoPoint,
}

struct GeocodingFallback(Arc<dyn GeocodingProvider>);

#[async_trait]
impl Fallback<AddressKey, ResolvedAddress> for GeocodingFallback {
    async fn fetch(&self, key: &AddressKey) -> Result<ResolvedAddress, ResolveError> {
        match key {
            AddressKey::Address(address) => {
                let point = self.0.geocode(address).await?;
                Ok(ResolvedAddress {
                    address: address.clone(),
                    point,
                })
            }
            AddressKey::Point(point) => {
                let address = self.0.reverse_geocode(*point).await?;
                Ok(ResolvedAddress {
                    address,
                    point: *point,
                })
            }
        }
    }
}

/// Fills in the missing half of a [`Location`].
///
/// An address-only location is geocoded, a point-only location is reverse
/// geocoded. A location carrying both is returned unchanged and never touches
/// the cache or the provider.
#[derive(Clone)]
pub struct AddressResolver {
    inner: TwoTierResolver<AddressKey, ResolvedAddress>,
}

impl AddressResolver {
    #[must_use]
    pub fn new(
        cache: Arc<dyn CacheStore<AddressKey, ResolvedAddress>>,
        provider: Arc<dyn GeocodingProvider>,
    ) -> Self {
        Self {
            inner: TwoTierResolver::new("address", cache, Arc::new(GeocodingFallback(provider))),
        }
    }

    /// Returns a copy of `location` with both fields set.
    ///
    /// Only the missing field is filled; the known one is carried over from
    /// the input as is.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::InvalidInput`] if neither field is set, or the address is blank.
    /// - Any cache, provider or cancellation error from the underlying resolve.
    pub async fn resolve(
        &self,
        location: &Location,
        cancel: &CancellationToken,
    ) -> Result<Location, ResolveError> {
        match (&location.address, location.point) {
            (Some(_), Some(_)) => Ok(location.clone()),
            (Some(address), None) => {
                let trimmed = address.trim();
                if trimmed.is_empty() {
                    return Err(ResolveError::InvalidInput(
                        "location address is blank".to_string(),
                    ));
                }
                let resolved = self
                    .inner
                    .resolve(&AddressKey::Address(trimmed.to_string()), cancel)
                    .await?;
                Ok(Location {
                    point: Some(resolved.point),
                    address: Some(address.clone()),
                })
            }
            (None, Some(point)) => {
                let resolved = self.inner.resolve(&AddressKey::Point(point), cancel).await?;
                Ok(Location {
                    point: Some(point),
                    address: Some(resolved.address),
                })
            }
            (None, None) => Err(ResolveError::InvalidInput(
                "location has neither address nor point".to_string(),
            )),
        }
    }
}

#[cfg(test)]
#[path = "address_test.rs"]
mod tests;
