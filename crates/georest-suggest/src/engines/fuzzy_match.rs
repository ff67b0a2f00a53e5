use async_trait::async_trait;
use georest_core::{EngineKey, FuzzyMatchSpec};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use super::{parse_error, SourceDocument};
use crate::error::SuggestError;
use crate::family::{DocumentSearch, SearchRequest, SuggestEngine};
use crate::hits::NormalizedHit;

/// Multi-term "and" match over a free-text field.
///
/// Fuzziness is applied only when the input has at least `threshold`
/// characters.
#[derive(Debug, Clone)]
pub struct FuzzyMatchEngine {
    key: EngineKey,
    spec: FuzzyMatchSpec,
}

#[derive(Debug, Deserialize)]
struct MatchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<SourceDocument>,
}

impl FuzzyMatchEngine {
    #[must_use]
    pub fn new(key: EngineKey, spec: FuzzyMatchSpec) -> Self {
        Self { key, spec }
    }
}

#[async_trait]
impl SuggestEngine<DocumentSearch> for FuzzyMatchEngine {
    fn build_request(&self, text: &str) -> SearchRequest {
        let mut clause = Map::new();
        clause.insert("query".to_string(), Value::String(text.to_string()));
        clause.insert("operator".to_string(), Value::String("and".to_string()));
        if text.chars().count() >= self.spec.threshold {
            clause.insert(
                "fuzziness".to_string(),
                Value::String(self.spec.fuzziness.to_string()),
            );
        }

        SearchRequest {
            index: self.spec.index.clone(),
            body: json!({
                "query": { "match": { self.spec.field.clone(): clause } },
                "size": self.spec.limit,
            }),
        }
    }

    async fn parse_response(
        &self,
        response: Value,
        _cancel: &CancellationToken,
    ) -> Result<Vec<NormalizedHit>, SuggestError> {
        let parsed: MatchResponse =
            serde_json::from_value(response).map_err(|e| parse_error(self.key, &e))?;
        parsed
            .hits
            .hits
            .into_iter()
            .map(|doc| doc.into_hit(self.key))
            .collect()
    }
}
