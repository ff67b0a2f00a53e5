//! Geographic value types: points, locations, region identifiers and polygons.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// A place described by a coordinate, a free-form address, or both.
///
/// A resolved location carries both fields. Resolving an already-resolved
/// location leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    #[must_use]
    pub fn from_address(address: impl Into<String>) -> Self {
        Self {
            point: None,
            address: Some(address.into()),
        }
    }

    #[must_use]
    pub const fn from_point(point: GeoPoint) -> Self {
        Self {
            point: Some(point),
            address: None,
        }
    }

    /// Both the coordinate and the address are present.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.point.is_some() && self.address.is_some()
    }
}

/// Provider-specific region key: an entity kind (`R`, `N`, `W` for OSM) plus
/// its numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionIdentifier {
    #[serde(rename = "osm_type")]
    pub kind: String,
    #[serde(rename = "osm_id")]
    pub id: i64,
}

impl RegionIdentifier {
    #[must_use]
    pub fn new(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

/// Renders as the provider's compact form, e.g. `R102269`.
impl std::fmt::Display for RegionIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind, self.id)
    }
}

/// A single boundary ring. Point order is significant and is preserved as
/// received from the provider; the ring is not forced closed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon(Vec<GeoPoint>);

impl Polygon {
    #[must_use]
    pub const fn new(points: Vec<GeoPoint>) -> Self {
        Self(points)
    }

    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_points(self) -> Vec<GeoPoint> {
        self.0
    }
}

impl From<Vec<GeoPoint>> for Polygon {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_with_both_fields_is_resolved() {
        let mut location = Location::from_address("Red Square, Moscow");
        assert!(!location.is_resolved());
        location.point = Some(GeoPoint::new(55.7539, 37.6208));
        assert!(location.is_resolved());
    }

    #[test]
    fn location_serializes_without_missing_fields() {
        let location = Location::from_point(GeoPoint::new(1.5, 2.5));
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json, serde_json::json!({ "point": { "lat": 1.5, "lon": 2.5 } }));
    }

    #[test]
    fn region_identifier_displays_compact_form() {
        assert_eq!(RegionIdentifier::new("R", 102_269).to_string(), "R102269");
    }

    #[test]
    fn polygon_round_trips_as_plain_array() {
        let polygon = Polygon::new(vec![GeoPoint::new(1.0, 2.0), GeoPoint::new(3.0, 4.0)]);
        let json = serde_json::to_string(&polygon).unwrap();
        assert_eq!(json, r#"[{"lat":1.0,"lon":2.0},{"lat":3.0,"lon":4.0}]"#);
        let back: Polygon = serde_json::from_str(&json).unwrap();
        assert_eq!(back.points(), polygon.points());
    }
}
