//! Multi-engine suggestion aggregation for georest.
//!
//! Engines of one backend family share a [`SuggestExecutor`], which sends
//! all of their requests to the backend as one batch. A [`SuggestionService`]
//! runs every executor concurrently for the same text and merges the per-engine
//! hits; [`build_suggestion`] decodes them into a [`georest_core::Suggestion`].

pub mod assemble;
pub mod elastic;
pub mod engines;
pub mod error;
pub mod executor;
pub mod family;
pub mod hits;
pub mod lookup;
pub mod photon;
pub mod registry;
pub mod service;

pub use assemble::build_suggestion;
pub use elastic::ElasticsearchClient;
pub use engines::{CompletionEngine, FuzzyMatchEngine, RegionSearchEngine};
pub use error::{EngineFailure, FailureKind, SuggestError};
pub use executor::{Executor, SuggestExecutor};
pub use family::{
    BackendFamily, DocumentSearch, MapSearch, MapSearchProvider, MapSearchQuery,
    MultiQueryBackend, SearchRequest, SuggestEngine,
};
pub use hits::{EngineEntry, EngineResultSet, NormalizedHit};
pub use lookup::ConcurrentLookupService;
pub use photon::{MapSearchBatch, PhotonClient};
pub use registry::build_service;
pub use service::SuggestionService;
