//! Suggestion engine variants.

mod completion;
mod fuzzy_match;
mod region_search;

pub use completion::CompletionEngine;
pub use fuzzy_match::FuzzyMatchEngine;
pub use region_search::RegionSearchEngine;

use georest_core::EngineKey;
use serde::Deserialize;

use crate::error::SuggestError;
use crate::hits::NormalizedHit;

/// A stored document as returned inside search hits and suggest options.
#[derive(Debug, Deserialize)]
struct SourceDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: serde_json::Value,
}

impl SourceDocument {
    fn into_hit(self, engine: EngineKey) -> Result<NormalizedHit, SuggestError> {
        NormalizedHit::from_json(self.id, &self.source).map_err(|e| parse_error(engine, &e))
    }
}

fn parse_error(engine: EngineKey, err: &impl std::fmt::Display) -> SuggestError {
    SuggestError::Parse {
        engine,
        reason: err.to_string(),
    }
}
