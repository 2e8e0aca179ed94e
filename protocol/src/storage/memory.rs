//! In-memory world state backed by an ordered `BTreeMap`.
//!
//! Used by tests and by nodes started with `--in-memory`. Every operation
//! takes the lock for its own duration only; `commit_batch` validates and
//! applies under a single write lock, so batches are atomic with respect to
//! every other caller.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::store::{LedgerStore, ReadVersion, ScanIter, StoreError, StoreResult, WriteOp};

/// Ordered in-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Return `true` if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl LedgerStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        match self.entries.write().remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    /// Iterates a copy of the map taken when the scan starts, so the result
    /// reflects exactly the state committed at that moment.
    fn scan(&self) -> ScanIter<'_> {
        let snapshot: Vec<(String, Vec<u8>)> = self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Box::new(snapshot.into_iter().map(Ok))
    }

    fn commit_batch(&self, reads: &[ReadVersion], writes: &[(String, WriteOp)]) -> StoreResult<()> {
        let mut entries = self.entries.write();

        for (key, observed) in reads {
            if entries.get(key).map(Vec::as_slice) != observed.as_deref() {
                return Err(StoreError::Conflict { key: key.clone() });
            }
        }

        for (key, op) in writes {
            match op {
                WriteOp::Put(value) => {
                    entries.insert(key.clone(), value.clone());
                }
                WriteOp::Delete => {
                    entries.remove(key);
                }
            }
        }

        Ok(())
    }
}
