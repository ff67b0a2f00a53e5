use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::hits::{EngineEntry, NormalizedHit};

/// Returns fixed hits for its keys after an optional delay.
struct FixedExecutor {
    family: &'static str,
    hits: Vec<(EngineKey, Vec<&'static str>)>,
    delay_ms: u64,
    fail: bool,
    panic: bool,
}

impl FixedExecutor {
    fn new(family: &'static str, hits: Vec<(EngineKey, Vec<&'static str>)>) -> Self {
        Self {
            family,
            hits,
            delay_ms: 0,
            fail: false,
            panic: false,
        }
    }
}

#[async_trait]
impl Executor for FixedExecutor {
    fn family(&self) -> &'static str {
        self.family
    }

    fn engine_keys(&self) -> Vec<EngineKey> {
        self.hits.iter().map(|(key, _)| *key).collect()
    }

    async fn suggest(
        &self,
        _text: &str,
        _cancel: &CancellationToken,
    ) -> Result<EngineResultSet, SuggestError> {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        assert!(!self.panic, "executor blew up");
        if self.fail {
            return Err(SuggestError::Backend {
                backend: self.family,
                message: "connection refused".to_string(),
            });
        }
        let mut set = EngineResultSet::new();
        for (key, ids) in &self.hits {
            let hits = ids
                .iter()
                .map(|id| NormalizedHit::new(*id, format!(r#"{{"name":"{id}"}}"#)))
                .collect();
            set.insert(*key, EngineEntry::ok(hits));
        }
        Ok(set)
    }
}

fn service(executors: Vec<FixedExecutor>) -> SuggestionService {
    let mut service = SuggestionService::new();
    for executor in executors {
        service.add(Arc::new(executor));
    }
    service
}

#[tokio::test]
async fn merges_results_of_every_executor() {
    let mut slow = FixedExecutor::new("document-search", vec![
        (EngineKey::Couriers, vec!["c1"]),
        (EngineKey::Orders, vec!["o1", "o2"]),
    ]);
    slow.delay_ms = 20;
    let fast = FixedExecutor::new("map-search", vec![(EngineKey::Regions, vec!["R1"])]);
    let service = service(vec![slow, fast]);

    let merged = service
        .suggest("moscow", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(merged.len(), 3);
    assert_eq!(merged.hits(EngineKey::Orders).len(), 2);
    assert_eq!(merged.hits(EngineKey::Regions)[0].id, "R1");
}

#[tokio::test]
async fn same_key_from_two_executors_is_unioned_in_registration_order() {
    let mut first = FixedExecutor::new("a", vec![(EngineKey::Orders, vec!["1", "2"])]);
    first.delay_ms = 20;
    let second = FixedExecutor::new("b", vec![(EngineKey::Orders, vec!["2", "3"])]);

    let merged = service(vec![first, second])
        .suggest("x", &CancellationToken::new())
        .await
        .unwrap();

    let ids: Vec<_> = merged
        .hits(EngineKey::Orders)
        .iter()
        .map(|hit| hit.id.as_str())
        .collect();
    assert_eq!(ids, ["1", "2", "3"]);
}

#[tokio::test]
async fn first_error_fails_the_request() {
    let mut slow = FixedExecutor::new("document-search", vec![(EngineKey::Orders, vec!["o1"])]);
    slow.delay_ms = 200;
    let mut broken = FixedExecutor::new("map-search", vec![(EngineKey::Regions, vec![])]);
    broken.fail = true;

    let err = service(vec![slow, broken])
        .suggest("x", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SuggestError::Backend { backend: "map-search", .. }));
}

#[tokio::test]
async fn panicking_executor_is_task_error() {
    let mut broken = FixedExecutor::new("a", vec![(EngineKey::Couriers, vec![])]);
    broken.panic = true;

    let err = service(vec![broken])
        .suggest("x", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SuggestError::Task(_)));
}

#[tokio::test]
async fn empty_service_returns_empty_set() {
    let merged = SuggestionService::new()
        .suggest("x", &CancellationToken::new())
        .await
        .unwrap();
    assert!(merged.is_empty());
}

#[tokio::test]
async fn suggest_all_assembles_categories() {
    let service = service(vec![FixedExecutor::new("document-search", vec![
        (EngineKey::Couriers, vec!["c1"]),
        (EngineKey::Orders, vec!["o1"]),
        (EngineKey::OrdersPrefix, vec!["o1", "o2"]),
    ])]);

    let suggestion = service
        .suggest_all("x", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(suggestion.couriers[0].id, "c1");
    assert_eq!(suggestion.couriers[0].name, "c1");
    let orders: Vec<_> = suggestion.orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(orders, ["o1", "o2"]);
    assert!(suggestion.regions.is_empty());
}

#[test]
fn engine_keys_follow_registration() {
    let service = service(vec![
        FixedExecutor::new("a", vec![(EngineKey::Orders, vec![]), (EngineKey::Couriers, vec![])]),
        FixedExecutor::new("b", vec![(EngineKey::Regions, vec![])]),
    ]);
    assert_eq!(
        service.engine_keys(),
        [EngineKey::Orders, EngineKey::Couriers, EngineKey::Regions]
    );
    assert_eq!(service.len(), 2);
}
