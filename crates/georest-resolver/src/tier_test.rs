use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::*;

#[derive(Default)]
struct FakeStore {
    entries: Mutex<HashMap<String, u32>>,
    fail_get: bool,
    fail_put: bool,
    puts: AtomicUsize,
}

#[async_trait]
impl CacheStore<String, u32> for FakeStore {
    async fn get(&self, key: &String) -> Result<Option<u32>, ResolveError> {
        if self.fail_get {
            return Err(ResolveError::Backend {
                backend: "fake-store",
                message: "connection refused".to_string(),
            });
        }
        Ok(self.entries.lock().unwrap().get(key).copied())
    }

    async fn put(&self, key: &String, value: &u32) -> Result<(), ResolveError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put {
            return Err(ResolveError::Backend {
                backend: "fake-store",
                message: "read-only".to_string(),
            });
        }
        self.entries.lock().unwrap().insert(key.clone(), *value);
        Ok(())
    }
}

struct CountingProvider {
    calls: AtomicUsize,
    answer: Option<u32>,
}

impl CountingProvider {
    fn answering(answer: u32) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer: Some(answer),
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer: None,
        }
    }
}

#[async_trait]
impl Fallback<String, u32> for CountingProvider {
    async fn fetch(&self, _key: &String) -> Result<u32, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.ok_or_else(|| ResolveError::Provider {
            provider: "counting",
            message: "ZERO_RESULTS".to_string(),
        })
    }
}

struct PendingProvider;

#[async_trait]
impl Fallback<String, u32> for PendingProvider {
    async fn fetch(&self, _key: &String) -> Result<u32, ResolveError> {
        std::future::pending().await
    }
}

fn resolver(
    store: &Arc<FakeStore>,
    provider: &Arc<CountingProvider>,
) -> TwoTierResolver<String, u32> {
    let cache: Arc<dyn CacheStore<String, u32>> = store.clone();
    let fallback: Arc<dyn Fallback<String, u32>> = provider.clone();
    TwoTierResolver::new("test", cache, fallback)
}

#[tokio::test]
async fn cache_hit_skips_provider() {
    let store = Arc::new(FakeStore::default());
    store.entries.lock().unwrap().insert("k".to_string(), 7);
    let provider = Arc::new(CountingProvider::answering(1));

    let value = resolver(&store, &provider)
        .resolve(&"k".to_string(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(value, 7);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.puts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn miss_then_fallback_populates_cache_for_next_read() {
    let store = Arc::new(FakeStore::default());
    let provider = Arc::new(CountingProvider::answering(42));
    let resolver = resolver(&store, &provider);
    let cancel = CancellationToken::new();

    assert_eq!(resolver.resolve(&"k".to_string(), &cancel).await.unwrap(), 42);
    assert_eq!(resolver.resolve(&"k".to_string(), &cancel).await.unwrap(), 42);

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1, "second read is a cache hit");
    assert_eq!(store.entries.lock().unwrap().get("k"), Some(&42));
}

#[tokio::test]
async fn cache_backend_error_propagates_without_fallback() {
    let store = Arc::new(FakeStore {
        fail_get: true,
        ..FakeStore::default()
    });
    let provider = Arc::new(CountingProvider::answering(1));

    let err = resolver(&store, &provider)
        .resolve(&"k".to_string(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_transport(), "got {err:?}");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn writeback_failure_does_not_fail_resolve() {
    let store = Arc::new(FakeStore {
        fail_put: true,
        ..FakeStore::default()
    });
    let provider = Arc::new(CountingProvider::answering(9));

    let value = resolver(&store, &provider)
        .resolve(&"k".to_string(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(value, 9);
    assert_eq!(store.puts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn provider_error_is_returned_and_nothing_is_written() {
    let store = Arc::new(FakeStore::default());
    let provider = Arc::new(CountingProvider::failing());

    let err = resolver(&store, &provider)
        .resolve(&"k".to_string(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::Provider { .. }));
    assert_eq!(store.puts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancelled_token_interrupts_pending_provider() {
    let cache: Arc<dyn CacheStore<String, u32>> = Arc::new(FakeStore::default());
    let fallback: Arc<dyn Fallback<String, u32>> = Arc::new(PendingProvider);
    let resolver = TwoTierResolver::new("test", cache, fallback);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = resolver.resolve(&"k".to_string(), &cancel).await.unwrap_err();
    assert!(matches!(err, ResolveError::Cancelled));
}

#[tokio::test]
async fn concurrent_misses_tolerate_duplicate_writebacks() {
    let store = Arc::new(FakeStore::default());
    let provider = Arc::new(CountingProvider::answering(5));
    let resolver = resolver(&store, &provider);
    let cancel = CancellationToken::new();
    let key = "k".to_string();

    let (a, b) = tokio::join!(resolver.resolve(&key, &cancel), resolver.resolve(&key, &cancel));

    assert_eq!(a.unwrap(), 5);
    assert_eq!(b.unwrap(), 5);
    assert!(provider.calls.load(Ordering::SeqCst) >= 1);
    assert_eq!(store.entries.lock().unwrap().get("k"), Some(&5));
}
