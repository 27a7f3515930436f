//! Cache statistics
//!
//! Hit/miss accounting for the cache accessor and the per-run interval
//! histogram.
//!
//! Counters are plain atomics so the accessor can be shared behind an `Arc`
//! without a lock. They are only ever zeroed through an explicit reset at an
//! experiment boundary.
//!
//! # Example
//!
//! ```
//! use cachepulse::stats::CacheCounters;
//!
//! let counters = CacheCounters::new();
//! counters.record_hit();
//! counters.record_miss();
//! counters.record_miss();
//!
//! let stats = counters.snapshot();
//! assert_eq!(stats.total(), 3);
//! assert_eq!(stats.hit_rate_display(), "33.33%");
//! ```

pub mod histogram;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache-line aligned atomic counter
///
/// Hits and misses are bumped on every simulated query; keeping each counter
/// on its own cache line stops them from invalidating each other.
#[repr(align(64))]
#[derive(Debug)]
pub struct AlignedCounter {
    value: AtomicU64,
    _padding: [u8; 56],
}

impl AlignedCounter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
            _padding: [0; 56],
        }
    }

    #[inline]
    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Zero the counter, returning the previous value
    #[inline]
    pub fn reset(&self) -> u64 {
        self.value.swap(0, Ordering::Relaxed)
    }
}

impl Default for AlignedCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Live hit/miss counters owned by a cache accessor
#[derive(Debug, Default)]
pub struct CacheCounters {
    hits: AlignedCounter,
    misses: AlignedCounter,
}

impl CacheCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&self) {
        self.hits.increment();
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.increment();
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> CacheStatistics {
        CacheStatistics {
            hits: self.hits.get(),
            misses: self.misses.get(),
        }
    }

    /// Zero both counters, returning what they held
    pub fn reset(&self) -> CacheStatistics {
        CacheStatistics {
            hits: self.hits.reset(),
            misses: self.misses.reset(),
        }
    }
}

/// Snapshot of cache hit/miss counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStatistics {
    /// Total lookups (hits + misses)
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of lookups that hit, 0.0 when nothing was looked up
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Hit rate as a percentage with two decimals, e.g. `"66.67%"`
    pub fn hit_rate_display(&self) -> String {
        format!("{:.2}%", self.hit_rate() * 100.0)
    }
}

impl fmt::Display for CacheStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} total={} hit_rate={}",
            self.hits,
            self.misses,
            self.total(),
            self.hit_rate_display()
        )
    }
}
