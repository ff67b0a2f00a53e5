//! Suggestion payload types decoded from search documents.

use serde::{Deserialize, Serialize};

use crate::geo::{Location, RegionIdentifier};

/// A courier document as stored in the couriers index.
///
/// `id` is not part of the stored document; it is filled from the hit's
/// document id when a suggestion is assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Courier {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// International format without the leading `+`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Unix time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<i64>,
    #[serde(default)]
    pub orders_count: i64,
    #[serde(default)]
    pub is_active: bool,
}

/// An order document as stored in the orders index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub courier_id: String,
    /// Creation time, Unix milliseconds.
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub end_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Location>,
}

/// A region hit enriched with a human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSuggestion {
    #[serde(flatten)]
    pub region: RegionIdentifier,
    pub name: String,
}

/// The merged answer to a free-text suggestion query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub couriers: Vec<Courier>,
    pub orders: Vec<Order>,
    pub regions: Vec<RegionSuggestion>,
}
