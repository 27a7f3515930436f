//! Record store seam
//!
//! The experiment only reads from the record store: how many records exist,
//! and one record picked uniformly at random. Both calls happen often (once
//! per poll iteration and once per simulated query).

pub mod memory;
pub mod mock;

use crate::error::BackendResult;
use crate::record::AlertRecord;
use async_trait::async_trait;

/// Read access to the persisted corpus
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Number of stored records
    async fn count_all(&self) -> BackendResult<u64>;

    /// A uniformly random record, `None` when the store is empty
    async fn find_random(&self) -> BackendResult<Option<AlertRecord>>;
}
