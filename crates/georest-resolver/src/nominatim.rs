//! Nominatim client for region boundaries and display names.

use async_trait::async_trait;
use georest_core::{GeoPoint, Polygon, RegionIdentifier};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ResolveError;
use crate::http::{endpoint, get_json, HttpSettings};
use crate::region::RegionProvider;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const PROVIDER: &str = "nominatim";

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    geojson: Option<GeoJson>,
}

#[derive(Debug, Deserialize)]
struct GeoJson {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

/// GeoJSON position: `[lon, lat]`.
type Position = [f64; 2];

#[derive(Debug, Deserialize)]
struct LookupEntry {
    #[serde(default)]
    address: LookupAddress,
}

#[derive(Debug, Default, Deserialize)]
struct LookupAddress {
    #[serde(default)]
    county: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state_district: String,
    #[serde(default)]
    state: String,
}

impl LookupAddress {
    /// `"<county><city>, <state_district>, <state>"`; separators are always written.
    fn prettify(&self) -> String {
        format!(
            "{}{}, {}, {}",
            self.county, self.city, self.state_district, self.state
        )
    }
}

/// Picks the outer ring of a `Polygon`, or of the first polygon of a
/// `MultiPolygon`, converting `[lon, lat]` positions to points in order.
fn first_ring(geojson: GeoJson) -> Result<Polygon, ResolveError> {
    let parse = |source| ResolveError::Parse {
        context: format!("{PROVIDER} geojson {}", geojson.kind),
        source,
    };
    let ring: Option<Vec<Position>> = match geojson.kind.as_str() {
        "Polygon" => {
            let rings: Vec<Vec<Position>> =
                serde_json::from_value(geojson.coordinates.clone()).map_err(parse)?;
            rings.into_iter().next()
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<Position>>> =
                serde_json::from_value(geojson.coordinates.clone()).map_err(parse)?;
            polygons.into_iter().next().and_then(|p| p.into_iter().next())
        }
        other => {
            return Err(ResolveError::Provider {
                provider: PROVIDER,
                message: format!("geometry type '{other}' has no boundary"),
            })
        }
    };
    let ring = ring.ok_or_else(|| ResolveError::Provider {
        provider: PROVIDER,
        message: "boundary has no rings".to_string(),
    })?;
    Ok(ring
        .into_iter()
        .map(|[lon, lat]| GeoPoint::new(lat, lon))
        .collect::<Vec<_>>()
        .into())
}

/// Client for the Nominatim `reverse` and `lookup` endpoints.
///
/// Use [`NominatimClient::with_base_url`] to point at a self-hosted instance or a
/// mock server.
pub struct NominatimClient {
    client: Client,
    settings: HttpSettings,
    reverse_url: Url,
    lookup_url: Url,
    language: String,
}

impl NominatimClient {
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidInput`] if the HTTP client cannot be built.
    pub fn new(language: &str, settings: HttpSettings) -> Result<Self, ResolveError> {
        Self::with_base_url(language, settings, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidInput`] if `base_url` is not a valid URL
    /// or the HTTP client cannot be built.
    pub fn with_base_url(
        language: &str,
        settings: HttpSettings,
        base_url: &str,
    ) -> Result<Self, ResolveError> {
        let client = settings
            .build_client()
            .map_err(|e| ResolveError::InvalidInput(format!("http client: {e}")))?;
        Ok(Self {
            client,
            settings,
            reverse_url: endpoint(base_url, "reverse")?,
            lookup_url: endpoint(base_url, "lookup")?,
            language: language.to_owned(),
        })
    }

    fn reverse_request(&self, region: &RegionIdentifier) -> Url {
        let mut url = self.reverse_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("osm_id", &region.id.to_string())
            .append_pair("osm_type", &region.kind)
            .append_pair("polygon_geojson", "1")
            .append_pair("accept-language", &self.language);
        url
    }

    fn lookup_request(&self, region: &RegionIdentifier) -> Url {
        let mut url = self.lookup_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("osm_ids", &region.to_string())
            .append_pair("accept-language", &self.language);
        url
    }
}

#[async_trait]
impl RegionProvider for NominatimClient {
    async fn resolve_boundary(&self, region: &RegionIdentifier) -> Result<Polygon, ResolveError> {
        let url = self.reverse_request(region);
        let response: ReverseResponse =
            get_json(&self.client, &self.settings, PROVIDER, &url).await?;
        let geojson = response.geojson.ok_or_else(|| ResolveError::Provider {
            provider: PROVIDER,
            message: format!("no geojson for {region}"),
        })?;
        let polygon = first_ring(geojson)?;
        tracing::debug!(
            provider = PROVIDER,
            %region,
            points = polygon.len(),
            "boundary fetched"
        );
        Ok(polygon)
    }

    async fn lookup_display_name(
        &self,
        region: &RegionIdentifier,
    ) -> Result<String, ResolveError> {
        let url = self.lookup_request(region);
        let entries: Vec<LookupEntry> =
            get_json(&self.client, &self.settings, PROVIDER, &url).await?;
        entries
            .first()
            .map(|entry| entry.address.prettify())
            .ok_or_else(|| ResolveError::Provider {
                provider: PROVIDER,
                message: format!("lookup returned nothing for {region}"),
            })
    }
}
