//! Builds a [`SuggestionService`] from the engine registry.

use std::sync::Arc;

use georest_core::{EngineSettings, EnginesFile};

use crate::engines::{CompletionEngine, FuzzyMatchEngine, RegionSearchEngine};
use crate::executor::SuggestExecutor;
use crate::family::{DocumentSearch, MapSearch, MultiQueryBackend};
use crate::lookup::ConcurrentLookupService;
use crate::service::SuggestionService;

/// Groups the configured engines by backend family, one executor each.
///
/// Engines keep their registry order within their executor. A family with
/// no configured engines gets no executor.
#[must_use]
pub fn build_service(
    engines: &EnginesFile,
    documents: Arc<dyn MultiQueryBackend<DocumentSearch>>,
    places: Arc<dyn MultiQueryBackend<MapSearch>>,
    lookup: Arc<ConcurrentLookupService>,
) -> SuggestionService {
    let mut document_executor = SuggestExecutor::<DocumentSearch>::new(documents);
    let mut place_executor = SuggestExecutor::<MapSearch>::new(places);

    for spec in &engines.engines {
        match &spec.engine {
            EngineSettings::Completion(settings) => document_executor.add_engine(
                spec.key,
                Arc::new(CompletionEngine::new(spec.key, settings.clone())),
            ),
            EngineSettings::FuzzyMatch(settings) => document_executor.add_engine(
                spec.key,
                Arc::new(FuzzyMatchEngine::new(spec.key, settings.clone())),
            ),
            EngineSettings::RegionSearch(settings) => place_executor.add_engine(
                spec.key,
                Arc::new(RegionSearchEngine::new(
                    spec.key,
                    settings.clone(),
                    Arc::clone(&lookup),
                )),
            ),
        }
    }

    let mut service = SuggestionService::new();
    if !document_executor.is_empty() {
        service.add(Arc::new(document_executor));
    }
    if !place_executor.is_empty() {
        service.add(Arc::new(place_executor));
    }
    tracing::debug!(
        engines = engines.engines.len(),
        executors = service.len(),
        "suggestion service built"
    );
    service
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;
    use georest_core::{default_engines, EngineKey, Polygon, RegionIdentifier};
    use georest_resolver::{RegionProvider, ResolveError};
    use serde_json::Value;

    use super::*;
    use crate::error::SuggestError;
    use crate::family::{MapSearchQuery, SearchRequest};

    struct Unused;

    #[async_trait]
    impl MultiQueryBackend<DocumentSearch> for Unused {
        async fn multi_query(
            &self,
            _requests: Vec<SearchRequest>,
        ) -> Result<Vec<Result<Value, String>>, SuggestError> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl MultiQueryBackend<MapSearch> for Unused {
        async fn multi_query(
            &self,
            _requests: Vec<MapSearchQuery>,
        ) -> Result<Vec<Result<Bytes, String>>, SuggestError> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl RegionProvider for Unused {
        async fn resolve_boundary(
            &self,
            _region: &RegionIdentifier,
        ) -> Result<Polygon, ResolveError> {
            Ok(Polygon::default())
        }

        async fn lookup_display_name(
            &self,
            _region: &RegionIdentifier,
        ) -> Result<String, ResolveError> {
            Ok(String::new())
        }
    }

    fn build(engines: &EnginesFile) -> SuggestionService {
        build_service(
            engines,
            Arc::new(Unused),
            Arc::new(Unused),
            Arc::new(ConcurrentLookupService::new(Arc::new(Unused), 1)),
        )
    }

    #[test]
    fn default_registry_splits_into_two_families() {
        let service = build(&default_engines("couriers", "orders"));
        assert_eq!(service.len(), 2);
        assert_eq!(
            service.engine_keys(),
            [
                EngineKey::Orders,
                EngineKey::Couriers,
                EngineKey::OrdersPrefix,
                EngineKey::Regions
            ]
        );
    }

    #[test]
    fn family_without_engines_gets_no_executor() {
        let mut engines = default_engines("couriers", "orders");
        engines.engines.retain(|spec| spec.key == EngineKey::Regions);
        let service = build(&engines);
        assert_eq!(service.len(), 1);
        assert_eq!(service.engine_keys(), [EngineKey::Regions]);
    }
}
