//! # Ledger Store Contract
//!
//! The world state is an opaque, ordered key-value store. Everything above
//! this module sees it only through [`LedgerStore`]: point reads, point
//! writes, deletes, an ordered full scan, and an atomic batch commit that
//! validates a read set before applying a write set.
//!
//! Implementations never interpret the stored bytes.

use std::sync::Arc;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during world-state operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("key not found: {0}")]
    NotFound(String),

    /// A key in the read set changed between the read and the commit.
    #[error("write conflict on key {key}: value changed since it was read")]
    Conflict { key: String },

    /// Failure reported by a non-sled backend.
    #[error("store backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Scan & Batch Types
// ---------------------------------------------------------------------------

/// One `(key, value)` pair yielded by a scan.
pub type ScanItem = StoreResult<(String, Vec<u8>)>;

/// Lazy, key-ordered iterator over the world state.
pub type ScanIter<'a> = Box<dyn Iterator<Item = ScanItem> + 'a>;

/// A key together with the value a transaction observed for it.
/// `None` means the key was absent at read time.
pub type ReadVersion = (String, Option<Vec<u8>>);

/// A buffered mutation applied at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Set the key to the given bytes.
    Put(Vec<u8>),
    /// Remove the key.
    Delete,
}

// ---------------------------------------------------------------------------
// LedgerStore
// ---------------------------------------------------------------------------

/// Ordered key-value world state.
///
/// All methods take `&self`: backends are expected to be internally
/// synchronized so one handle can be shared across request handlers.
pub trait LedgerStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Remove `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the key is absent.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Iterate every entry in ascending key order.
    ///
    /// Each call starts a fresh traversal. Whether writes committed while
    /// the iterator is live become visible depends on the backend.
    fn scan(&self) -> ScanIter<'_>;

    /// Atomically check that every key in `reads` still holds the observed
    /// value, then apply `writes`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] naming the first stale key, in which
    /// case nothing is written.
    fn commit_batch(&self, reads: &[ReadVersion], writes: &[(String, WriteOp)]) -> StoreResult<()>;
}

impl<T: LedgerStore + ?Sized> LedgerStore for &T {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn scan(&self) -> ScanIter<'_> {
        (**self).scan()
    }

    fn commit_batch(&self, reads: &[ReadVersion], writes: &[(String, WriteOp)]) -> StoreResult<()> {
        (**self).commit_batch(reads, writes)
    }
}

impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn scan(&self) -> ScanIter<'_> {
        (**self).scan()
    }

    fn commit_batch(&self, reads: &[ReadVersion], writes: &[(String, WriteOp)]) -> StoreResult<()> {
        (**self).commit_batch(reads, writes)
    }
}
