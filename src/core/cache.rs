use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.fetched_at) <= self.ttl
    }
}

type Slot<V> = Arc<Mutex<Option<CacheEntry<V>>>>;

/// Time-bounded in-memory cache.
///
/// Each key owns a slot guarded by its own lock, so readers of the same key wait
/// for a single in-flight fetch while other keys proceed independently. Entries
/// are never evicted; an expired entry is replaced on the next read.
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its result
    /// for `ttl`. A failed fetch leaves the slot untouched and hands the error
    /// back, so the next call retries.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, ttl: Duration, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let mut entry = slot.lock().await;
        if let Some(cached) = entry.as_ref() {
            if cached.is_fresh(Instant::now()) {
                debug!("Cache HIT for key: {:?}", key);
                return Ok(cached.value.clone());
            }
            debug!("Cache entry expired for key: {:?}", key);
        } else {
            debug!("Cache MISS for key: {:?}", key);
        }

        let value = fetch().await?;
        *entry = Some(CacheEntry {
            value: value.clone(),
            fetched_at: Instant::now(),
            ttl,
        });
        debug!("Cache PUT for key: {:?}", key);
        Ok(value)
    }

    /// Returns the value for `key` if present and not expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let slot = self.slots.lock().await.get(key).cloned()?;
        let entry = slot.lock().await;
        entry
            .as_ref()
            .filter(|e| e.is_fresh(Instant::now()))
            .map(|e| e.value.clone())
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(30);

    async fn counted(calls: &AtomicUsize, value: i32) -> Result<i32, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_once_within_ttl() {
        let cache = Cache::<String, i32>::new();
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch("key1".to_string(), TTL, || counted(&calls, 123))
            .await;
        assert_eq!(first, Ok(123));

        tokio::time::advance(Duration::from_secs(29)).await;
        let second = cache
            .get_or_fetch("key1".to_string(), TTL, || counted(&calls, 456))
            .await;
        assert_eq!(second, Ok(123));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetches_after_expiry() {
        let cache = Cache::<String, i32>::new();
        let calls = AtomicUsize::new(0);

        cache
            .get_or_fetch("key1".to_string(), TTL, || counted(&calls, 123))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());

        let refreshed = cache
            .get_or_fetch("key1".to_string(), TTL, || counted(&calls, 456))
            .await;
        assert_eq!(refreshed, Ok(456));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get(&"key1".to_string()).await, Some(456));
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = Cache::<String, i32>::new();
        let calls = AtomicUsize::new(0);

        let failed: Result<i32, String> = cache
            .get_or_fetch("key1".to_string(), TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("provider down".to_string())
            })
            .await;
        assert_eq!(failed, Err("provider down".to_string()));
        assert!(cache.get(&"key1".to_string()).await.is_none());

        let recovered = cache
            .get_or_fetch("key1".to_string(), TTL, || counted(&calls, 7))
            .await;
        assert_eq!(recovered, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = Cache::<String, i32>::new();
        let calls = AtomicUsize::new(0);

        cache
            .get_or_fetch("a".to_string(), TTL, || counted(&calls, 1))
            .await
            .unwrap();
        let b = cache
            .get_or_fetch("b".to_string(), TTL, || counted(&calls, 2))
            .await;
        assert_eq!(b, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_fetch() {
        let cache = Arc::new(Cache::<String, i32>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let readers = (0..8).map(|_| {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .get_or_fetch("shared".to_string(), TTL, || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, String>(42)
                    })
                    .await
            })
        });

        for result in futures::future::join_all(readers).await {
            assert_eq!(result.unwrap(), Ok(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
