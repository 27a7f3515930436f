//! CachePulse - synthetic query load for cache hit-rate experiments
//!
//! CachePulse replays random record lookups against a cache-aside layer at
//! intervals drawn from configurable inter-arrival distributions, and reports
//! how the cache behaved under each one.
//!
//! # Architecture
//!
//! - **Interval samplers**: Poisson (exponential waits) and uniform waits
//! - **Cache accessor**: cache-aside get/set/delete with hit/miss accounting
//! - **Readiness gate**: polls the record store until the corpus reaches a target size
//! - **Traffic generator**: sequential simulated queries per distribution
//! - **Experiment coordinator**: waits for readiness, runs every distribution, reports
//!
//! The record store, acquisition service and cache backend are collaborators
//! reached through traits (`store::RecordStore`, `acquire::Acquirer`,
//! `cache::CacheBackend`). In-memory implementations are provided so the
//! binary runs standalone.

pub mod acquire;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod distribution;
pub mod error;
pub mod output;
pub mod readiness;
pub mod record;
pub mod stats;
pub mod store;
pub mod traffic;
pub mod util;

// Re-export commonly used types
pub use config::Config;
pub use record::AlertRecord;

/// Result type used throughout CachePulse
pub type Result<T> = anyhow::Result<T>;
