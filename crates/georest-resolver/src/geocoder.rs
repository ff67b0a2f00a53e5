//! Google Geocoding API client.
//!
//! Every response carries a `status` field; anything other than `OK` is a
//! provider error, and so is an `OK` response with no results.

use async_trait::async_trait;
use georest_core::GeoPoint;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::address::GeocodingProvider;
use crate::error::ResolveError;
use crate::http::{endpoint, get_json, HttpSettings};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const GEOCODE_PATH: &str = "maps/api/geocode/json";
const PROVIDER: &str = "google-geocoder";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    formatted_address: String,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub struct GoogleGeocoder {
    client: Client,
    settings: HttpSettings,
    geocode_url: Url,
    api_key: Option<String>,
    language: String,
}

impl GoogleGeocoder {
    /// Creates a client pointed at the production Google Maps API.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidInput`] if the HTTP client cannot be built.
    pub fn new(
        api_key: Option<&str>,
        language: &str,
        settings: HttpSettings,
    ) -> Result<Self, ResolveError> {
        Self::with_base_url(api_key, language, settings, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidInput`] if `base_url` is not a valid URL
    /// or the HTTP client cannot be built.
    pub fn with_base_url(
        api_key: Option<&str>,
        language: &str,
        settings: HttpSettings,
        base_url: &str,
    ) -> Result<Self, ResolveError> {
        let client = settings
            .build_client()
            .map_err(|e| ResolveError::InvalidInput(format!("http client: {e}")))?;
        Ok(Self {
            client,
            geocode_url: endpoint(base_url, GEOCODE_PATH)?,
            settings,
            api_key: api_key.map(str::to_owned),
            language: language.to_owned(),
        })
    }

    fn build_url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.geocode_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        url
    }

    async fn first_result(&self, url: &Url) -> Result<GeocodeResult, ResolveError> {
        let response: GeocodeResponse =
            get_json(&self.client, &self.settings, PROVIDER, url).await?;
        if response.status != "OK" {
            let message = match response.error_message {
                Some(detail) => format!("{}: {detail}", response.status),
                None => response.status,
            };
            return Err(ResolveError::Provider {
                provider: PROVIDER,
                message,
            });
        }
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::Provider {
                provider: PROVIDER,
                message: "OK status with empty results".to_string(),
            })
    }
}

#[async_trait]
impl GeocodingProvider for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, ResolveError> {
        let url = self.build_url(&[("address", address)]);
        let result = self.first_result(&url).await?;
        let location = result
            .geometry
            .ok_or_else(|| ResolveError::Provider {
                provider: PROVIDER,
                message: format!("no geometry for '{address}'"),
            })?
            .location;
        tracing::debug!(
            provider = PROVIDER,
            address,
            lat = location.lat,
            lon = location.lng,
            "geocoded"
        );
        Ok(GeoPoint::new(location.lat, location.lng))
    }

    async fn reverse_geocode(&self, point: GeoPoint) -> Result<String, ResolveError> {
        let latlng = point.to_string();
        let url = self.build_url(&[
            ("latlng", latlng.as_str()),
            ("result_type", "street_address"),
            ("location_type", "ROOFTOP"),
            ("language", self.language.as_str()),
        ]);
        let result = self.first_result(&url).await?;
        if result.formatted_address.is_empty() {
            return Err(ResolveError::Provider {
                provider: PROVIDER,
                message: format!("no formatted address for {latlng}"),
            });
        }
        tracing::debug!(provider = PROVIDER, %point, "reverse geocoded");
        Ok(result.formatted_address)
    }
}
