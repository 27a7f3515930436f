//! Cache-aside access layer
//!
//! [`CacheAccessor`] is the only path from the experiment to the cache
//! backend. It counts hits and misses and turns every backend failure into a
//! cold-cache outcome: a failed `get` is a miss, a failed `set` or `delete`
//! is a no-op. The record store stays the source of truth, so a cache outage
//! never aborts an experiment.
//!
//! Values are stored as JSON strings, the way a networked key-value store
//! would hold them.
//!
//! # Example
//!
//! ```
//! use cachepulse::cache::{CacheAccessor, memory::MemoryCache};
//! use std::sync::Arc;
//!
//! # tokio_test_block_on(async {
//! let cache = CacheAccessor::new(Arc::new(MemoryCache::new()), None);
//! assert_eq!(cache.get::<String>("record:1").await, None);
//! cache.set("record:1", &"payload".to_string(), None).await;
//! assert_eq!(cache.get::<String>("record:1").await.as_deref(), Some("payload"));
//!
//! let stats = cache.statistics();
//! assert_eq!((stats.hits, stats.misses), (1, 1));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

pub mod memory;

use crate::error::BackendResult;
use crate::stats::{CacheCounters, CacheStatistics};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Key-value cache backend
///
/// Every call may fail transiently (the backend normally sits across a
/// network boundary). Expiry and eviction are the backend's business.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a value, `None` if absent or expired
    async fn get(&self, key: &str) -> BackendResult<Option<String>>;

    /// Store a value, optionally with a per-key time-to-live
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> BackendResult<()>;

    /// Remove a single key
    async fn delete(&self, key: &str) -> BackendResult<()>;

    /// Remove every key
    async fn clear(&self) -> BackendResult<()>;

    /// Number of live entries
    async fn len(&self) -> BackendResult<usize>;
}

/// Cache accessor with hit/miss accounting
pub struct CacheAccessor {
    backend: Arc<dyn CacheBackend>,
    /// TTL used when `set` is called without one
    default_ttl: Option<Duration>,
    counters: CacheCounters,
}

impl CacheAccessor {
    pub fn new(backend: Arc<dyn CacheBackend>, default_ttl: Option<Duration>) -> Self {
        Self {
            backend,
            default_ttl,
            counters: CacheCounters::new(),
        }
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    /// Look up a key
    ///
    /// A present, decodable value counts as a hit. Absent values, backend
    /// failures and undecodable values count as misses and return `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    self.counters.record_hit();
                    debug!(key, "cache HIT");
                    Some(value)
                }
                Err(e) => {
                    self.counters.record_miss();
                    error!(key, error = %e, "cached value could not be decoded, treating as miss");
                    None
                }
            },
            Ok(None) => {
                self.counters.record_miss();
                debug!(key, "cache MISS");
                None
            }
            Err(e) => {
                self.counters.record_miss();
                error!(key, error = %e, "cache get failed, treating as miss");
                None
            }
        }
    }

    /// Store a value (best effort)
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                error!(key, error = %e, "could not encode value for cache");
                return;
            }
        };
        debug!(key, "cache SET");
        if let Err(e) = self.backend.set(key, raw, ttl.or(self.default_ttl)).await {
            error!(key, error = %e, "cache set failed");
        }
    }

    /// Remove a key (best effort)
    pub async fn delete(&self, key: &str) {
        debug!(key, "cache DELETE");
        match self.backend.delete(key).await {
            Ok(()) => debug!(key, "removed from cache"),
            Err(e) => error!(key, error = %e, "cache delete failed"),
        }
    }

    /// Current hit/miss counts
    pub fn statistics(&self) -> CacheStatistics {
        self.counters.snapshot()
    }

    /// Zero the counters, then empty the backend
    ///
    /// Safe on an empty backend and idempotent. A failing `clear` is logged;
    /// the counters are zeroed regardless.
    pub async fn reset_and_clear(&self) {
        let previous = self.counters.reset();
        info!(
            hits = previous.hits,
            misses = previous.misses,
            "resetting cache statistics"
        );
        match self.backend.clear().await {
            Ok(()) => info!("cache cleared"),
            Err(e) => error!(error = %e, "cache clear failed"),
        }
    }
}
