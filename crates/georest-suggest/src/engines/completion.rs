use std::collections::HashMap;

use async_trait::async_trait;
use georest_core::{CompletionSpec, EngineKey};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use super::{parse_error, SourceDocument};
use crate::error::SuggestError;
use crate::family::{DocumentSearch, SearchRequest, SuggestEngine};
use crate::hits::NormalizedHit;

/// Prefix autocomplete over a completion field.
///
/// The prefix is lower-cased. Fuzzy options always set `unicode_aware`; the
/// edit distance is sent only when configured and `min_length` only when
/// non-zero.
#[derive(Debug, Clone)]
pub struct CompletionEngine {
    key: EngineKey,
    spec: CompletionSpec,
    suggester: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    suggest: HashMap<String, Vec<SuggestEntry>>,
}

#[derive(Debug, Deserialize)]
struct SuggestEntry {
    #[serde(default)]
    options: Vec<SourceDocument>,
}

impl CompletionEngine {
    #[must_use]
    pub fn new(key: EngineKey, spec: CompletionSpec) -> Self {
        Self {
            key,
            suggester: format!("{key}-suggest"),
            spec,
        }
    }

    /// Name of the suggester in requests and responses.
    #[must_use]
    pub fn suggester_name(&self) -> &str {
        &self.suggester
    }
}

#[async_trait]
impl SuggestEngine<DocumentSearch> for CompletionEngine {
    fn build_request(&self, text: &str) -> SearchRequest {
        let mut fuzzy = Map::new();
        fuzzy.insert("unicode_aware".to_string(), Value::Bool(true));
        if let Some(fuzziness) = self.spec.fuzziness {
            fuzzy.insert("fuzziness".to_string(), Value::String(fuzziness.to_string()));
        }
        if self.spec.min_length > 0 {
            fuzzy.insert("min_length".to_string(), json!(self.spec.min_length));
        }

        let body = json!({
            "suggest": {
                self.suggester.clone(): {
                    "prefix": text.to_lowercase(),
                    "completion": {
                        "field": self.spec.field,
                        "size": self.spec.limit,
                        "fuzzy": fuzzy,
                    }
                }
            }
        });

        SearchRequest {
            index: self.spec.index.clone(),
            body,
        }
    }

    async fn parse_response(
        &self,
        response: Value,
        _cancel: &CancellationToken,
    ) -> Result<Vec<NormalizedHit>, SuggestError> {
        let mut parsed: CompletionResponse =
            serde_json::from_value(response).map_err(|e| parse_error(self.key, &e))?;
        let Some(entries) = parsed.suggest.remove(&self.suggester) else {
            return Ok(Vec::new());
        };
        entries
            .into_iter()
            .flat_map(|entry| entry.options)
            .map(|option| option.into_hit(self.key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use georest_core::Fuzziness;

    use super::*;

    fn spec(fuzziness: Option<Fuzziness>, min_length: usize) -> CompletionSpec {
        CompletionSpec {
            index: "couriers".to_string(),
            field: "suggestions".to_string(),
            fuzziness,
            min_length,
            limit: 15,
        }
    }

    #[test]
    fn request_lowercases_prefix_and_names_suggester_after_key() {
        let engine = CompletionEngine::new(EngineKey::Couriers, spec(Some(Fuzziness::Auto), 0));
        let request = engine.build_request("ABC");
        assert_eq!(request.index, "couriers");
        assert_eq!(
            request.body,
            json!({
                "suggest": {
                    "couriers-suggest": {
                        "prefix": "abc",
                        "completion": {
                            "field": "suggestions",
                            "size": 15,
                            "fuzzy": { "unicode_aware": true, "fuzziness": "AUTO" }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn request_includes_min_length_and_omits_unset_fuzziness() {
        let engine = CompletionEngine::new(EngineKey::OrdersPrefix, spec(None, 3));
        let fuzzy = &engine.build_request("x").body["suggest"]["orders-prefix-suggest"]
            ["completion"]["fuzzy"];
        assert_eq!(fuzzy, &json!({ "unicode_aware": true, "min_length": 3 }));
    }

    #[tokio::test]
    async fn parses_options_in_order() {
        let engine = CompletionEngine::new(EngineKey::Couriers, spec(None, 0));
        let response = json!({
            "suggest": {
                "couriers-suggest": [{
                    "text": "abc",
                    "options": [
                        { "_id": "c2", "_source": { "name": "ABCname" } },
                        { "_id": "c1", "_source": { "name": "ABCother" } }
                    ]
                }]
            }
        });
        let hits = engine
            .parse_response(response, &CancellationToken::new())
            .await
            .unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["c2", "c1"]);
        let doc: Value = hits[0].decode().unwrap();
        assert_eq!(doc["name"], "ABCname");
    }

    #[tokio::test]
    async fn malformed_option_is_parse_error() {
        let engine = CompletionEngine::new(EngineKey::Couriers, spec(None, 0));
        let response = json!({ "suggest": { "couriers-suggest": [{ "options": [{ "_source": {} }] }] } });
        let err = engine
            .parse_response(response, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestError::Parse { engine: EngineKey::Couriers, .. }));
    }
}
