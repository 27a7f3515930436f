//! In-memory record store
//!
//! Holds the corpus in a vector with a set of known identifiers so repeated
//! acquisition batches do not create duplicates.

use super::RecordStore;
use crate::error::{BackendError, BackendResult};
use crate::record::AlertRecord;
use async_trait::async_trait;
use rand::Rng;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct Corpus {
    records: Vec<AlertRecord>,
    ids: HashSet<String>,
}

/// Record store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    corpus: RwLock<Corpus>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `records` (duplicates dropped)
    pub fn with_records(records: Vec<AlertRecord>) -> Self {
        let store = Self::new();
        // A fresh lock cannot be poisoned
        let _ = store.insert_many(records);
        store
    }

    /// Load a JSON array of records from disk
    pub fn load_json_file(&self, path: &Path) -> BackendResult<usize> {
        let contents = fs::read_to_string(path)?;
        let records: Vec<AlertRecord> = serde_json::from_str(&contents)?;
        let inserted = self.insert_many(records)?;
        info!(path = %path.display(), inserted, "seeded record store from file");
        Ok(inserted)
    }

    /// Insert records, skipping identifiers already present
    ///
    /// Returns the number actually inserted.
    pub fn insert_many(&self, records: Vec<AlertRecord>) -> BackendResult<usize> {
        if records.is_empty() {
            warn!("no records to insert in this batch");
            return Ok(0);
        }
        let offered = records.len();
        let mut corpus = self.write()?;
        let mut inserted = 0;
        for record in records {
            if corpus.ids.insert(record.alert_id.clone()) {
                corpus.records.push(record);
                inserted += 1;
            }
        }
        if inserted < offered {
            warn!(duplicates = offered - inserted, "duplicate records skipped");
        }
        debug!(inserted, total = corpus.records.len(), "records inserted");
        Ok(inserted)
    }

    fn read(&self) -> BackendResult<RwLockReadGuard<'_, Corpus>> {
        self.corpus
            .read()
            .map_err(|_| BackendError::Other("record store lock poisoned".to_string()))
    }

    fn write(&self) -> BackendResult<RwLockWriteGuard<'_, Corpus>> {
        self.corpus
            .write()
            .map_err(|_| BackendError::Other("record store lock poisoned".to_string()))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn count_all(&self) -> BackendResult<u64> {
        let count = self.read()?.records.len() as u64;
        debug!(count, "records in store");
        Ok(count)
    }

    async fn find_random(&self) -> BackendResult<Option<AlertRecord>> {
        let corpus = self.read()?;
        if corpus.records.is_empty() {
            return Ok(None);
        }
        let index = rand::thread_rng().gen_range(0..corpus.records.len());
        Ok(corpus.records.get(index).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_record;
    use std::io::Write;

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryRecordStore::new();
        assert_eq!(store.count_all().await.unwrap(), 0);
        assert!(store.find_random().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_dedups_by_id() {
        let store = MemoryRecordStore::new();
        let inserted = store
            .insert_many(vec![sample_record("a"), sample_record("b"), sample_record("a")])
            .unwrap();
        assert_eq!(inserted, 2);

        let again = store.insert_many(vec![sample_record("b"), sample_record("c")]).unwrap();
        assert_eq!(again, 1);
        assert_eq!(store.count_all().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_find_random_returns_stored_record() {
        let store = MemoryRecordStore::with_records(vec![sample_record("x"), sample_record("y")]);
        for _ in 0..20 {
            let record = store.find_random().await.unwrap().unwrap();
            assert!(record.alert_id == "x" || record.alert_id == "y");
        }
    }

    #[tokio::test]
    async fn test_load_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let records = vec![sample_record("f1"), sample_record("f2")];
        write!(file, "{}", serde_json::to_string(&records).unwrap()).unwrap();

        let store = MemoryRecordStore::new();
        assert_eq!(store.load_json_file(file.path()).unwrap(), 2);
        assert_eq!(store.count_all().await.unwrap(), 2);
    }

    #[test]
    fn test_load_json_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not an array").unwrap();

        let store = MemoryRecordStore::new();
        assert!(matches!(
            store.load_json_file(file.path()),
            Err(BackendError::Serialization(_))
        ));
    }
}
