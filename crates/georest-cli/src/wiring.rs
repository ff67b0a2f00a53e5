//! Builds the resolvers and the suggestion service from [`AppConfig`].

use std::path::Path;
use std::sync::Arc;

use georest_core::{
    default_engines, load_engines, AppConfig, EnginesFile, Polygon, RegionIdentifier,
};
use georest_resolver::{
    AddressResolver, GoogleGeocoder, HttpSettings, MemoryAddressCache, MemoryCacheStore,
    NominatimClient, RegionResolver,
};
use georest_suggest::{
    build_service, ConcurrentLookupService, ElasticsearchClient, MapSearchBatch, PhotonClient,
    SuggestionService,
};

pub struct Components {
    pub addresses: AddressResolver,
    pub regions: RegionResolver,
    pub suggestions: SuggestionService,
}

pub fn http_settings(config: &AppConfig) -> HttpSettings {
    HttpSettings {
        timeout_secs: config.http_timeout_secs,
        user_agent: config.http_user_agent.clone(),
        max_retries: config.http_max_retries,
        backoff_base_ms: config.http_retry_backoff_ms,
    }
}

/// Reads the engine registry at `path`, or falls back to the built-in
/// engines when no file exists there. Index overrides apply to either.
pub fn load_registry(
    path: &Path,
    couriers_index: Option<&str>,
    orders_index: Option<&str>,
) -> anyhow::Result<EnginesFile> {
    let mut engines = if path.exists() {
        load_engines(path)?
    } else {
        tracing::info!(
            path = %path.display(),
            "engine registry not found, using built-in engines"
        );
        default_engines("couriers", "orders")
    };
    if couriers_index.is_some() || orders_index.is_some() {
        tracing::debug!(?couriers_index, ?orders_index, "overriding engine indexes");
        engines.override_indexes(couriers_index, orders_index);
    }
    Ok(engines)
}

pub fn build(config: &AppConfig) -> anyhow::Result<Components> {
    let settings = http_settings(config);

    if config.geocoder_api_key.is_none() {
        tracing::warn!("GEOREST_GEOCODER_API_KEY is not set; geocoding requests may be rejected");
    }
    let geocoder = GoogleGeocoder::with_base_url(
        config.geocoder_api_key.as_deref(),
        &config.language,
        settings.clone(),
        &config.geocoder_url,
    )?;
    let addresses = AddressResolver::new(Arc::new(MemoryAddressCache::new()), Arc::new(geocoder));

    let nominatim =
        NominatimClient::with_base_url(&config.language, settings.clone(), &config.nominatim_url)?;
    let regions = RegionResolver::new(
        Arc::new(MemoryCacheStore::<RegionIdentifier, Polygon>::new()),
        Arc::new(nominatim),
    );

    let engines = load_registry(
        &config.engines_path,
        config.couriers_index.as_deref(),
        config.orders_index.as_deref(),
    )?;
    let documents = ElasticsearchClient::with_base_url(settings.clone(), &config.elastic_url)?;
    let photon = PhotonClient::with_base_url(settings, &config.photon_url)?;
    let lookup = ConcurrentLookupService::new(regions.provider(), config.lookup_concurrency);
    let suggestions = build_service(
        &engines,
        Arc::new(documents),
        Arc::new(MapSearchBatch::new(Arc::new(photon))),
        Arc::new(lookup),
    );

    tracing::debug!(
        env = %config.env,
        engines = engines.engines.len(),
        "components built"
    );
    Ok(Components {
        addresses,
        regions,
        suggestions,
    })
}
