//! 响应缓存模块：带 LRU 淘汰与 TTL 的内存缓存。
//!
//! # Response Caching Module
//!
//! Each [`HttpClient`](crate::HttpClient) owns one [`CacheStore`]; stores are never
//! shared across instances.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheStore`] | Bounded key→entry map with least-recently-used eviction |
//! | [`CacheEntry`] | Cached data, store timestamp and optional TTL |
//! | [`CacheKeyGenerator`] | Derives keys from URL + query params, scoped by source tag |
//!
//! ## Expiry
//!
//! The store does not expire entries on its own. The client checks
//! `ttl is set AND now - stored_at > ttl` after a lookup and removes stale
//! entries before going to the network.
//!
//! ```rust
//! use trade_http::cache::{CacheEntry, CacheStore};
//!
//! let store = CacheStore::new(2);
//! store.set("a", CacheEntry::new(1, None));
//! store.set("b", CacheEntry::new(2, None));
//! store.get("a"); // promote "a"
//! store.set("c", CacheEntry::new(3, None)); // evicts "b"
//! assert!(store.contains("a"));
//! assert!(!store.contains("b"));
//! ```

mod key;
mod store;

pub use key::{string_hash, CacheKeyGenerator, MAX_CANONICAL_KEY_LEN};
pub use store::{now_epoch_ms, CacheEntry, CacheStore, DEFAULT_MAX_CACHE_SIZE};
