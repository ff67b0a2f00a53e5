//! Backend families and the engine/backend seams.
//!
//! A family fixes the request and response types shared by every engine and
//! backend in it, so an engine built for one family cannot be handed to an
//! executor of another.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::error::SuggestError;
use crate::hits::NormalizedHit;

pub trait BackendFamily: Send + Sync + 'static {
    type Request: Send + Sync + std::fmt::Debug;
    type Response: Send;

    /// Used in logs.
    const NAME: &'static str;
}

/// Query-DSL searches against the document index.
#[derive(Debug, Clone, Copy)]
pub struct DocumentSearch;

/// One search within a document multi-search batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub index: String,
    pub body: serde_json::Value,
}

impl BackendFamily for DocumentSearch {
    type Request = SearchRequest;
    type Response = serde_json::Value;

    const NAME: &'static str = "document-search";
}

/// Free-text place searches against the map-search provider.
#[derive(Debug, Clone, Copy)]
pub struct MapSearch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSearchQuery {
    pub text: String,
    pub limit: usize,
    /// `key:value` filters, e.g. `place:city`.
    pub tags: Vec<String>,
}

impl BackendFamily for MapSearch {
    type Request = MapSearchQuery;
    type Response = Bytes;

    const NAME: &'static str = "map-search";
}

/// Runs a batch of requests in one round trip.
///
/// The outer error fails the whole batch. Otherwise the result has one slot
/// per request, in request order; an `Err` slot is that request's own failure.
#[async_trait]
pub trait MultiQueryBackend<F: BackendFamily>: Send + Sync {
    async fn multi_query(
        &self,
        requests: Vec<F::Request>,
    ) -> Result<Vec<Result<F::Response, String>>, SuggestError>;
}

/// A single free-text search against a map-search provider.
#[async_trait]
pub trait MapSearchProvider: Send + Sync {
    async fn search(&self, query: &MapSearchQuery) -> Result<Bytes, SuggestError>;
}

/// A stateless strategy turning free text into a backend request and the
/// backend's answer into hits.
#[async_trait]
pub trait SuggestEngine<F: BackendFamily>: Send + Sync {
    fn build_request(&self, text: &str) -> F::Request;

    /// Hits in backend relevance order.
    async fn parse_response(
        &self,
        response: F::Response,
        cancel: &CancellationToken,
    ) -> Result<Vec<NormalizedHit>, SuggestError>;
}
