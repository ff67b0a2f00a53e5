//! In-process cache stores.
//!
//! Both stores are plain upserts: the last write for a key wins.

use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;
use georest_core::GeoPoint;
use tokio::sync::RwLock;

use crate::address::{AddressKey, ResolvedAddress};
use crate::error::ResolveError;
use crate::tier::CacheStore;

/// A generic keyed store behind a tokio `RwLock`.
#[derive(Debug)]
pub struct MemoryCacheStore<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for MemoryCacheStore<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> MemoryCacheStore<K, V>
where
    K: Eq + Hash,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl<K, V> CacheStore<K, V> for MemoryCacheStore<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> Result<Option<V>, ResolveError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &K, value: &V) -> Result<(), ResolveError> {
        self.entries.write().await.insert(key.clone(), value.clone());
        Ok(())
    }
}

/// Points are matched at 1e-6 degree precision (about 10 cm).
const POINT_SCALE: f64 = 1e6;

#[allow(clippy::cast_possible_truncation)]
fn point_cell(point: GeoPoint) -> (i64, i64) {
    (
        (point.lat * POINT_SCALE).round() as i64,
        (point.lon * POINT_SCALE).round() as i64,
    )
}

#[derive(Debug, Default)]
struct AddressIndex {
    by_address: HashMap<String, GeoPoint>,
    by_point: HashMap<(i64, i64), String>,
}

/// Address cache indexed in both directions.
///
/// Every `put` records the pair under its address and under its point, so a
/// value fetched by geocoding also answers the reverse lookup.
#[derive(Debug, Default)]
pub struct MemoryAddressCache {
    index: RwLock<AddressIndex>,
}

impl MemoryAddressCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore<AddressKey, ResolvedAddress> for MemoryAddressCache {
    async fn get(&self, key: &AddressKey) -> Result<Option<ResolvedAddress>, ResolveError> {
        let index = self.index.read().await;
        let hit = match key {
            AddressKey::Address(address) => {
                index
                    .by_address
                    .get(address)
                    .map(|point| ResolvedAddress {
                        address: address.clone(),
                        point: *point,
                    })
            }
            AddressKey::Point(point) => {
                index
                    .by_point
                    .get(&point_cell(*point))
                    .map(|address| ResolvedAddress {
                        address: address.clone(),
                        point: *point,
                    })
            }
        };
        Ok(hit)
    }

    async fn put(&self, _key: &AddressKey, value: &ResolvedAddress) -> Result<(), ResolveError> {
        let mut index = self.index.write().await;
        index.by_address.insert(value.address.clone(), value.point);
        index
            .by_point
            .insert(point_cell(value.point), value.address.clone());
        Ok(())
    }
}
