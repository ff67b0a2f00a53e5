use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use georest_core::{EngineKey, RegionIdentifier, RegionSearchSpec};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::parse_error;
use crate::error::SuggestError;
use crate::family::{MapSearch, MapSearchQuery, SuggestEngine};
use crate::hits::NormalizedHit;
use crate::lookup::ConcurrentLookupService;

/// Place search through the map-search provider.
///
/// Features without an OSM id and type, or whose entity kind is not in the
/// configured set, are dropped; the rest are named by the lookup service. Each hit's id is the compact region
/// identifier (`R102269`) and its payload a serialized `RegionSuggestion`.
pub struct RegionSearchEngine {
    key: EngineKey,
    spec: RegionSearchSpec,
    lookup: Arc<ConcurrentLookupService>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: FeatureProperties,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureProperties {
    #[serde(default)]
    osm_id: Option<i64>,
    #[serde(default)]
    osm_type: Option<String>,
}

impl RegionSearchEngine {
    #[must_use]
    pub fn new(
        key: EngineKey,
        spec: RegionSearchSpec,
        lookup: Arc<ConcurrentLookupService>,
    ) -> Self {
        Self { key, spec, lookup }
    }
}

#[async_trait]
impl SuggestEngine<MapSearch> for RegionSearchEngine {
    fn build_request(&self, text: &str) -> MapSearchQuery {
        MapSearchQuery {
            text: text.to_string(),
            limit: self.spec.limit,
            tags: self.spec.tags.clone(),
        }
    }

    async fn parse_response(
        &self,
        response: Bytes,
        cancel: &CancellationToken,
    ) -> Result<Vec<NormalizedHit>, SuggestError> {
        let collection: FeatureCollection =
            serde_json::from_slice(&response).map_err(|e| parse_error(self.key, &e))?;

        let wanted: Vec<RegionIdentifier> = collection
            .features
            .into_iter()
            .filter_map(|feature| {
                let FeatureProperties { osm_id, osm_type } = feature.properties;
                Some((osm_type?, osm_id?))
            })
            .filter(|(kind, _)| self.spec.kinds.contains(kind))
            .map(|(kind, id)| RegionIdentifier::new(kind, id))
            .collect();
        tracing::debug!(engine = %self.key, regions = wanted.len(), "naming region hits");

        let named = self.lookup.lookup_all(wanted, cancel).await?;
        named
            .iter()
            .map(|suggestion| {
                NormalizedHit::from_json(suggestion.region.to_string(), suggestion)
                    .map_err(|e| parse_error(self.key, &e))
            })
            .collect()
    }
}
