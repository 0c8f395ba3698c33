use std::{
    collections::HashMap,
    future::Future,
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::time::Instant;

struct CacheEntry<V> {
    data: Arc<V>,
    fetched_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Memoizes fetched values per key for a fixed time-to-live.
///
/// There is no size bound and no eviction besides expiry and explicit
/// invalidation. The lock is never held across a fetch, so two concurrent
/// misses for the same key both hit the network and the later one wins.
pub struct ExpiringCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(ttl: Duration) -> Self {
        ExpiringCache {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        // entries are replaced whole, a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// fresh value for `key`, if any
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.get_with_ttl(key, self.ttl)
    }

    fn get_with_ttl(&self, key: &K, ttl: Duration) -> Option<Arc<V>> {
        self.entries()
            .get(key)
            .filter(|entry| entry.is_fresh(ttl))
            .map(|entry| entry.data.clone())
    }

    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        self.store(key, value, Instant::now())
    }

    fn store(&self, key: K, value: V, fetched_at: Instant) -> Arc<V> {
        let data = Arc::new(value);
        self.entries().insert(
            key,
            CacheEntry {
                data: data.clone(),
                fetched_at,
            },
        );
        data
    }

    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetcher: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_fetch_with_ttl(key, self.ttl, fetcher).await
    }

    /// Returns the cached value while `now - fetched_at < ttl`, otherwise runs
    /// `fetcher` and stores its result stamped with the time the fetch started.
    /// Errors are handed back untouched and not cached.
    pub async fn get_or_fetch_with_ttl<F, Fut, E>(
        &self,
        key: K,
        ttl: Duration,
        fetcher: F,
    ) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get_with_ttl(&key, ttl) {
            return Ok(hit);
        }

        let started = Instant::now();
        let value = fetcher().await?;
        Ok(self.store(key, value, started))
    }

    /// skips the lookup but still stores the fresh value
    pub async fn refresh<F, Fut, E>(&self, key: K, fetcher: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let started = Instant::now();
        let value = fetcher().await?;
        Ok(self.store(key, value, started))
    }

    pub fn remove(&self, key: &K) -> bool {
        self.entries().remove(key).is_some()
    }

    /// Drops every entry whose key matches, returns how many went.
    pub fn invalidate<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&K) -> bool,
    {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    /// number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
