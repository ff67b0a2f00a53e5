//! Domain types and configuration shared by the georest crates.

pub mod app_config;
pub mod config;
pub mod engines;
pub mod error;
pub mod geo;
pub mod models;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use engines::{
    default_engines, load_engines, Category, CompletionSpec, EngineKey, EngineSettings,
    EngineSpec, EnginesFile, Fuzziness, FuzzyMatchSpec, RegionSearchSpec,
};
pub use error::ConfigError;
pub use geo::{GeoPoint, Location, Polygon, RegionIdentifier};
pub use models::{Courier, Order, RegionSuggestion, Suggestion};
