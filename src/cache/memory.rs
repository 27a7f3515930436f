//! In-process cache backend
//!
//! A `HashMap` behind a mutex with per-key expiry. Expired entries read as
//! absent and are dropped lazily. `clear` swaps the whole map under the lock,
//! so no reader sees a half-cleared cache.
//!
//! Outages can be simulated with [`MemoryCache::set_unavailable`], which makes
//! every call fail until switched back.

use super::CacheBackend;
use crate::error::{BackendError, BackendResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-memory cache backend with TTL support
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    unavailable: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> BackendResult<MutexGuard<'_, HashMap<String, Entry>>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::unavailable("memory cache marked unavailable"));
        }
        self.entries
            .lock()
            .map_err(|_| BackendError::Other("memory cache lock poisoned".to_string()))
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let mut entries = self.lock()?;
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> BackendResult<()> {
        let expires_at = ttl.filter(|t| !t.is_zero()).map(|t| Instant::now() + t);
        self.lock()?
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn clear(&self) -> BackendResult<()> {
        let mut entries = self.lock()?;
        *entries = HashMap::new();
        Ok(())
    }

    async fn len(&self) -> BackendResult<usize> {
        let now = Instant::now();
        Ok(self.lock()?.values().filter(|e| e.is_live(now)).count())
    }
}
