//! Suggestion engine registry: typed engine keys and their YAML configuration.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Identifies a registered suggestion engine. Result sets are keyed by this
/// type, so engines and the suggestion assembler agree on names at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKey {
    Couriers,
    Orders,
    OrdersPrefix,
    Regions,
}

impl EngineKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EngineKey::Couriers => "couriers",
            EngineKey::Orders => "orders",
            EngineKey::OrdersPrefix => "orders-prefix",
            EngineKey::Regions => "regions",
        }
    }

    /// The suggestion category this engine's hits are decoded into.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            EngineKey::Couriers => Category::Couriers,
            EngineKey::Orders | EngineKey::OrdersPrefix => Category::Orders,
            EngineKey::Regions => Category::Regions,
        }
    }
}

impl std::fmt::Display for EngineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Couriers,
    Orders,
    Regions,
}

/// Edit-distance budget for fuzzy matching.
///
/// Serialized the way the search backend expects it: `"AUTO"` or a decimal
/// edit count such as `"1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FuzzinessRepr", into = "String")]
pub enum Fuzziness {
    Auto,
    Edits(u8),
}

impl std::fmt::Display for Fuzziness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fuzziness::Auto => f.write_str("AUTO"),
            Fuzziness::Edits(n) => write!(f, "{n}"),
        }
    }
}

impl From<Fuzziness> for String {
    fn from(value: Fuzziness) -> Self {
        value.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FuzzinessRepr {
    Number(u8),
    Text(String),
}

impl TryFrom<FuzzinessRepr> for Fuzziness {
    type Error = String;

    fn try_from(value: FuzzinessRepr) -> Result<Self, Self::Error> {
        match value {
            FuzzinessRepr::Number(n) => Ok(Fuzziness::Edits(n)),
            FuzzinessRepr::Text(s) if s.eq_ignore_ascii_case("auto") => Ok(Fuzziness::Auto),
            FuzzinessRepr::Text(s) => s
                .trim()
                .parse::<u8>()
                .map(Fuzziness::Edits)
                .map_err(|_| format!("invalid fuzziness '{s}'; expected AUTO or an edit count")),
        }
    }
}

/// Prefix completion over a pre-indexed completion field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSpec {
    pub index: String,
    pub field: String,
    /// Omitted from the query when unset.
    #[serde(default)]
    pub fuzziness: Option<Fuzziness>,
    /// Prefixes shorter than this are matched exactly. `0` leaves the backend default.
    #[serde(default)]
    pub min_length: usize,
    pub limit: usize,
}

/// Multi-term "and" match over a free-text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyMatchSpec {
    pub index: String,
    pub field: String,
    pub fuzziness: Fuzziness,
    /// Inputs shorter than this many characters are matched without fuzziness.
    pub threshold: usize,
    pub limit: usize,
}

/// Free-text place search against the external map-search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSearchSpec {
    /// `key:value` tag filters forwarded to the provider.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Entity kinds kept after the search, e.g. `R` for relations.
    pub kinds: Vec<String>,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineSettings {
    Completion(CompletionSpec),
    FuzzyMatch(FuzzyMatchSpec),
    RegionSearch(RegionSearchSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSpec {
    pub key: EngineKey,
    /// Written as a one-entry map, e.g. `engine: { completion: { ... } }`.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnginesFile {
    pub engines: Vec<EngineSpec>,
}

impl EnginesFile {
    /// Points every document-search engine at the given index for its
    /// category. `None` keeps the index the registry names. Region search
    /// has no index and is left alone.
    pub fn override_indexes(
        &mut self,
        couriers_index: Option<&str>,
        orders_index: Option<&str>,
    ) {
        for spec in &mut self.engines {
            let wanted = match spec.key.category() {
                Category::Couriers => couriers_index,
                Category::Orders => orders_index,
                Category::Regions => None,
            };
            let Some(wanted) = wanted else { continue };
            match &mut spec.engine {
                EngineSettings::Completion(c) => c.index = wanted.to_string(),
                EngineSettings::FuzzyMatch(m) => m.index = wanted.to_string(),
                EngineSettings::RegionSearch(_) => {}
            }
        }
    }
}

/// The engine set of the original deployment.
#[must_use]
pub fn default_engines(couriers_index: &str, orders_index: &str) -> EnginesFile {
    EnginesFile {
        engines: vec![
            EngineSpec {
                key: EngineKey::Orders,
                engine: EngineSettings::FuzzyMatch(FuzzyMatchSpec {
                    index: orders_index.to_string(),
                    field: "destination.address".to_string(),
                    fuzziness: Fuzziness::Edits(1),
                    threshold: 5,
                    limit: 15,
                }),
            },
            EngineSpec {
                key: EngineKey::Couriers,
                engine: EngineSettings::Completion(CompletionSpec {
                    index: couriers_index.to_string(),
                    field: "suggestions".to_string(),
                    fuzziness: Some(Fuzziness::Auto),
                    min_length: 0,
                    limit: 15,
                }),
            },
            EngineSpec {
                key: EngineKey::OrdersPrefix,
                engine: EngineSettings::Completion(CompletionSpec {
                    index: orders_index.to_string(),
                    field: "order_suggestions".to_string(),
                    fuzziness: Some(Fuzziness::Edits(0)),
                    min_length: 0,
                    limit: 15,
                }),
            },
            EngineSpec {
                key: EngineKey::Regions,
                engine: EngineSettings::RegionSearch(RegionSearchSpec {
                    tags: vec![
                        "place:city".to_string(),
                        "boundary:administrative".to_string(),
                    ],
                    kinds: vec!["R".to_string()],
                    limit: 10,
                }),
            },
        ],
    }
}

/// Load and validate the engine registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_engines(path: &Path) -> Result<EnginesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::EnginesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let engines_file: EnginesFile = serde_yaml::from_str(&content)?;
    validate_engines(&engines_file)?;

    Ok(engines_file)
}

fn validate_engines(engines_file: &EnginesFile) -> Result<(), ConfigError> {
    if engines_file.engines.is_empty() {
        return Err(ConfigError::Validation(
            "at least one engine must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for spec in &engines_file.engines {
        if !seen.insert(spec.key) {
            return Err(ConfigError::Validation(format!(
                "duplicate engine key: '{}'",
                spec.key
            )));
        }

        let limit = match &spec.engine {
            EngineSettings::Completion(c) => {
                require_non_empty(spec.key, "index", &c.index)?;
                require_non_empty(spec.key, "field", &c.field)?;
                c.limit
            }
            EngineSettings::FuzzyMatch(m) => {
                require_non_empty(spec.key, "index", &m.index)?;
                require_non_empty(spec.key, "field", &m.field)?;
                m.limit
            }
            EngineSettings::RegionSearch(r) => {
                if r.kinds.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "engine '{}' must keep at least one entity kind",
                        spec.key
                    )));
                }
                r.limit
            }
        };

        if limit == 0 {
            return Err(ConfigError::Validation(format!(
                "engine '{}' has limit 0; must be at least 1",
                spec.key
            )));
        }
    }

    Ok(())
}

fn require_non_empty(key: EngineKey, name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "engine '{key}' has an empty {name}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "engines_test.rs"]
mod tests;
