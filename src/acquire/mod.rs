//! Acquisition service seam
//!
//! The readiness gate calls [`Acquirer::acquire_batch`] once per poll
//! iteration while the corpus is below target. Acquisition is best effort:
//! a failed batch is logged by the gate and retried on the next iteration.

pub mod synthetic;

use crate::error::BackendResult;
use async_trait::async_trait;

/// Fetches one batch of new records into the record store
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Run one acquisition cycle, returning how many records were stored
    async fn acquire_batch(&self) -> BackendResult<usize>;
}
