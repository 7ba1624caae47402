//! Bounded in-memory cache store with least-recently-used eviction.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

pub const DEFAULT_MAX_CACHE_SIZE: usize = 100;

/// A cached value with the wall-clock time it was stored and an optional TTL.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub data: T,
    pub stored_at_epoch_ms: u64,
    pub ttl: Option<Duration>,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, ttl: Option<Duration>) -> Self {
        Self {
            data,
            stored_at_epoch_ms: now_epoch_ms(),
            ttl,
        }
    }

    /// `ttl is set AND now - stored_at > ttl`. Entries without a TTL never expire.
    pub fn is_expired_at(&self, now_epoch_ms: u64) -> bool {
        match self.ttl {
            Some(ttl) => {
                now_epoch_ms.saturating_sub(self.stored_at_epoch_ms) > ttl.as_millis() as u64
            }
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_epoch_ms())
    }
}

pub fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Key→entry map and recency order, updated together under one lock.
///
/// Expiry is not enforced here: `get` returns (and promotes) stale entries and the
/// caller decides whether to `remove` them.
pub struct CacheStore<T> {
    entries: Mutex<LruCache<String, CacheEntry<T>>>,
    max_size: usize,
}

impl<T: Clone> CacheStore<T> {
    /// A `max_size` of zero falls back to [`DEFAULT_MAX_CACHE_SIZE`].
    pub fn new(max_size: usize) -> Self {
        let size = if max_size == 0 {
            DEFAULT_MAX_CACHE_SIZE
        } else {
            max_size
        };
        let cap = NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            max_size: cap.get(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry<T>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up `key`, promoting it to most-recently-used.
    pub fn get(&self, key: &str) -> Option<CacheEntry<T>> {
        self.lock().get(key).cloned()
    }

    /// Insert or overwrite. Inserting a new key at capacity evicts the single LRU key first;
    /// overwriting never evicts.
    pub fn set(&self, key: impl Into<String>, entry: CacheEntry<T>) {
        let key = key.into();
        let mut entries = self.lock();
        if let Some((evicted, _)) = entries.push(key.clone(), entry) {
            if evicted != key {
                debug!(evicted_key = evicted.as_str(), "cache entry evicted");
            }
        }
    }

    pub fn remove(&self, key: &str) -> Option<CacheEntry<T>> {
        self.lock().pop(key)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Keys from most- to least-recently-used. Does not change recency.
    pub fn keys(&self) -> Vec<String> {
        self.lock().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }
}

impl<T: Clone> Default for CacheStore<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CACHE_SIZE)
    }
}
