//! Backend-agnostic results: normalized hits and per-engine result sets.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::HashSet;

use bytes::Bytes;
use georest_core::EngineKey;
use serde::de::DeserializeOwned;

use crate::error::EngineFailure;

/// One backend hit: its document id and the raw document bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedHit {
    pub id: String,
    pub payload: Bytes,
}

impl NormalizedHit {
    #[must_use]
    pub fn new(id: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
        }
    }

    /// Serializes `document` as the payload.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `document` cannot be written as JSON.
    pub fn from_json<T: serde::Serialize>(
        id: impl Into<String>,
        document: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(id, serde_json::to_vec(document)?))
    }

    /// Decodes the payload as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error if the payload is not a valid `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// One engine's contribution to a round.
///
/// An engine that failed carries its failure and no hits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineEntry {
    pub hits: Vec<NormalizedHit>,
    pub failure: Option<EngineFailure>,
}

impl EngineEntry {
    #[must_use]
    pub fn ok(hits: Vec<NormalizedHit>) -> Self {
        Self {
            hits,
            failure: None,
        }
    }

    #[must_use]
    pub fn failed(failure: EngineFailure) -> Self {
        Self {
            hits: Vec::new(),
            failure: Some(failure),
        }
    }

    /// Appends `other`'s hits whose ids are not already present, keeping order.
    fn absorb(&mut self, other: EngineEntry) {
        let mut seen: HashSet<String> = self.hits.iter().map(|hit| hit.id.clone()).collect();
        self.hits.extend(
            other
                .hits
                .into_iter()
                .filter(|hit| seen.insert(hit.id.clone())),
        );
        if self.failure.is_none() {
            self.failure = other.failure;
        }
    }
}

/// Results of one suggestion round keyed by engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineResultSet {
    entries: BTreeMap<EngineKey, EngineEntry>,
}

impl EngineResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: EngineKey, entry: EngineEntry) {
        self.entries.insert(key, entry);
    }

    #[must_use]
    pub fn get(&self, key: EngineKey) -> Option<&EngineEntry> {
        self.entries.get(&key)
    }

    /// Hits of `key`, or an empty slice if the engine is absent.
    #[must_use]
    pub fn hits(&self, key: EngineKey) -> &[NormalizedHit] {
        self.entries
            .get(&key)
            .map(|entry| entry.hits.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = EngineKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, EngineKey, EngineEntry> {
        self.entries.iter()
    }

    /// Engines that recorded a failure this round.
    pub fn failures(&self) -> impl Iterator<Item = (EngineKey, &EngineFailure)> + '_ {
        self.entries
            .iter()
            .filter_map(|(key, entry)| entry.failure.as_ref().map(|f| (*key, f)))
    }

    /// Adds `entry` under `key`, unioning it by hit id with an entry already
    /// there. The first recorded failure wins.
    pub fn absorb(&mut self, key: EngineKey, entry: EngineEntry) {
        match self.entries.entry(key) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            btree_map::Entry::Occupied(mut slot) => slot.get_mut().absorb(entry),
        }
    }

    /// Folds `other` into `self`. Entries under the same key are unioned by
    /// hit id, first occurrence first.
    pub fn merge(&mut self, other: EngineResultSet) {
        for (key, entry) in other.entries {
            self.absorb(key, entry);
        }
    }
}

impl<'a> IntoIterator for &'a EngineResultSet {
    type Item = (&'a EngineKey, &'a EngineEntry);
    type IntoIter = btree_map::Iter<'a, EngineKey, EngineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
