//! Scripted record store for testing
//!
//! `MockRecordStore` replays a fixed sequence of `count_all` answers and
//! tracks how often each method was called, so tests can assert on polling
//! behaviour without real timing.
//!
//! # Example
//!
//! ```
//! use cachepulse::store::{RecordStore, mock::MockRecordStore};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MockRecordStore::with_counts(vec![0, 2, 5]);
//! assert_eq!(store.count_all().await.unwrap(), 0);
//! assert_eq!(store.count_all().await.unwrap(), 2);
//! assert_eq!(store.count_all().await.unwrap(), 5);
//! // The last answer repeats once the script runs out
//! assert_eq!(store.count_all().await.unwrap(), 5);
//! assert_eq!(store.count_calls(), 4);
//! # });
//! ```

use super::RecordStore;
use crate::error::{BackendError, BackendResult};
use crate::record::AlertRecord;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock record store
///
/// `count_all` answers come from a script; `None` entries simulate a store
/// failure. When the script is exhausted the last answer repeats (or the
/// number of records, if no script was given). `find_random` cycles through
/// the configured records in order.
#[derive(Debug, Default)]
pub struct MockRecordStore {
    counts: Mutex<VecDeque<Option<u64>>>,
    last_count: Mutex<Option<Option<u64>>>,
    records: Vec<AlertRecord>,
    next_record: AtomicUsize,
    fail_find: AtomicBool,
    count_calls: AtomicUsize,
    find_calls: AtomicUsize,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `count_all` answers follow `counts`
    pub fn with_counts(counts: Vec<u64>) -> Self {
        Self::with_script(counts.into_iter().map(Some).collect())
    }

    /// Store whose `count_all` answers follow `script` (`None` = failure)
    pub fn with_script(script: Vec<Option<u64>>) -> Self {
        Self {
            counts: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// Store serving `records` from `find_random`
    pub fn with_records(records: Vec<AlertRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Make `find_random` fail
    pub fn set_fail_find(&self, fail: bool) {
        self.fail_find.store(fail, Ordering::SeqCst);
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    fn next_count(&self) -> Option<u64> {
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        let mut last = self.last_count.lock().unwrap_or_else(|e| e.into_inner());
        match counts.pop_front() {
            Some(answer) => {
                *last = Some(answer);
                answer
            }
            None => last.unwrap_or(Some(self.records.len() as u64)),
        }
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn count_all(&self) -> BackendResult<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.next_count()
            .ok_or_else(|| BackendError::unavailable("scripted count failure"))
    }

    async fn find_random(&self) -> BackendResult<Option<AlertRecord>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(BackendError::unavailable("scripted find failure"));
        }
        if self.records.is_empty() {
            return Ok(None);
        }
        let index = self.next_record.fetch_add(1, Ordering::SeqCst) % self.records.len();
        Ok(self.records.get(index).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_record;

    #[tokio::test]
    async fn test_script_failure_entries() {
        let store = MockRecordStore::with_script(vec![Some(1), None, Some(3)]);
        assert_eq!(store.count_all().await.unwrap(), 1);
        assert!(store.count_all().await.is_err());
        assert_eq!(store.count_all().await.unwrap(), 3);
        assert_eq!(store.count_calls(), 3);
    }

    #[tokio::test]
    async fn test_records_cycle() {
        let store = MockRecordStore::with_records(vec![sample_record("a"), sample_record("b")]);
        let ids: Vec<String> = collect_ids(&store, 3).await;
        assert_eq!(ids, vec!["a", "b", "a"]);
        assert_eq!(store.count_all().await.unwrap(), 2);
    }

    async fn collect_ids(store: &MockRecordStore, n: usize) -> Vec<String> {
        let mut ids = Vec::new();
        for _ in 0..n {
            ids.push(store.find_random().await.unwrap().unwrap().alert_id);
        }
        ids
    }
}
