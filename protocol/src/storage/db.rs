//! # LedgerDB — Persistent World State
//!
//! The persistence layer for the credential ledger, built on sled's
//! embedded key-value store. All on-disk data flows through this module.
//!
//! ## Tree Layout
//!
//! | Tree          | Key                      | Value                         |
//! |---------------|--------------------------|-------------------------------|
//! | `credentials` | `credentialID` (UTF-8)   | canonical record bytes        |
//!
//! sled orders keys lexicographically, which is exactly the key order a
//! full scan must follow.
//!
//! ## Atomicity
//!
//! Batch commits run as a sled transaction over the credentials tree. The
//! read set is checked inside the transaction and the whole batch is
//! aborted on the first stale key, so either every write lands or none do.

use sled::transaction::{abort, TransactionError};
use sled::{Db, Tree};
use std::path::Path;

use super::store::{
    LedgerStore, ReadVersion, ScanItem, ScanIter, StoreError, StoreResult, WriteOp,
};
use crate::config::CREDENTIAL_TREE;

// ---------------------------------------------------------------------------
// LedgerDB
// ---------------------------------------------------------------------------

/// Persistent world-state store.
///
/// # Thread Safety
///
/// sled trees support lock-free concurrent reads and serialized writes, so
/// `LedgerDB` can be shared via `Arc<LedgerDB>` without extra locking.
#[derive(Debug, Clone)]
pub struct LedgerDB {
    /// The underlying sled database handle.
    db: Db,
    /// Credential records keyed by credential ID.
    credentials: Tree,
}

impl LedgerDB {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let credentials = db.open_tree(CREDENTIAL_TREE)?;
        Ok(Self { db, credentials })
    }

    /// Number of entries in the credentials tree.
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Return `true` if the credentials tree is empty.
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Block until every pending write is durable.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl LedgerStore for LedgerDB {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.credentials.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.credentials.insert(key.as_bytes(), value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        match self.credentials.remove(key.as_bytes())? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    fn scan(&self) -> ScanIter<'_> {
        Box::new(self.credentials.iter().map(|item| -> ScanItem {
            let (key, value) = item?;
            Ok((String::from_utf8_lossy(&key).into_owned(), value.to_vec()))
        }))
    }

    fn commit_batch(&self, reads: &[ReadVersion], writes: &[(String, WriteOp)]) -> StoreResult<()> {
        let result = self.credentials.transaction(|tx| {
            for (key, observed) in reads {
                let current = tx.get(key.as_bytes())?;
                if current.as_deref() != observed.as_deref() {
                    return abort(StoreError::Conflict { key: key.clone() });
                }
            }

            for (key, op) in writes {
                match op {
                    WriteOp::Put(value) => {
                        tx.insert(key.as_bytes(), value.as_slice())?;
                    }
                    WriteOp::Delete => {
                        tx.remove(key.as_bytes())?;
                    }
                }
            }

            Ok(())
        });

        match result {
            Ok(()) => {}
            Err(TransactionError::Abort(e)) => return Err(e),
            Err(TransactionError::Storage(e)) => return Err(StoreError::Sled(e)),
        }

        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
