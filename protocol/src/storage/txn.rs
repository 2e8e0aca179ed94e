//! # Read/Write-Set Transactions
//!
//! A [`Transaction`] overlays a base [`LedgerStore`] with optimistic
//! concurrency control, the same model endorsing peers use: reads are
//! served from the base store and their observed values are recorded,
//! writes are buffered, and `commit` hands both sets to
//! [`LedgerStore::commit_batch`], which rejects the batch if any observed
//! key has changed in the meantime.
//!
//! ```text
//! begin ─► get/put/delete (buffered) ─► commit ─► commit_batch(reads, writes)
//!                                                   │
//!                                                   └─► Conflict if a read is stale
//! ```
//!
//! Reads see the transaction's own buffered writes. Scans pass straight
//! through to the base store: they neither see buffered writes nor add to
//! the read set, so phantom protection is whatever the base store offers.

use parking_lot::Mutex;
use std::collections::BTreeMap;

use super::store::{LedgerStore, ReadVersion, ScanIter, StoreError, StoreResult, WriteOp};

#[derive(Debug, Default)]
struct TxState {
    /// First value observed for each key read from the base store.
    reads: BTreeMap<String, Option<Vec<u8>>>,
    /// Pending mutations, last write per key wins.
    writes: BTreeMap<String, WriteOp>,
}

/// A unit of work over a base store. Dropping it without calling
/// [`commit`](Self::commit) discards every buffered write.
#[derive(Debug)]
pub struct Transaction<S: LedgerStore> {
    base: S,
    state: Mutex<TxState>,
}

impl<S: LedgerStore> Transaction<S> {
    /// Start a transaction against `base`.
    pub fn begin(base: S) -> Self {
        Self {
            base,
            state: Mutex::new(TxState::default()),
        }
    }

    /// Number of distinct keys read from the base store.
    pub fn read_set_len(&self) -> usize {
        self.state.lock().reads.len()
    }

    /// Number of distinct keys with a pending write.
    pub fn write_set_len(&self) -> usize {
        self.state.lock().writes.len()
    }

    /// Net change in the number of stored entries once this transaction
    /// commits: +1 for each put to an absent key, -1 for each delete.
    ///
    /// Keys written without a prior read are looked up in the base store
    /// and join the read set, so `commit` rejects the batch if their
    /// presence changes in the meantime.
    pub fn entry_delta(&self) -> StoreResult<i64> {
        let mut state = self.state.lock();
        let unread: Vec<String> = state
            .writes
            .keys()
            .filter(|key| !state.reads.contains_key(*key))
            .cloned()
            .collect();
        for key in unread {
            let value = self.base.get(&key)?;
            state.reads.insert(key, value);
        }

        let delta: i64 = state
            .writes
            .iter()
            .map(|(key, op)| {
                let present = matches!(state.reads.get(key), Some(Some(_)));
                match (op, present) {
                    (WriteOp::Put(_), false) => 1,
                    (WriteOp::Delete, true) => -1,
                    _ => 0,
                }
            })
            .sum();
        Ok(delta)
    }

    /// Apply the buffered writes to the base store.
    ///
    /// A transaction without writes commits trivially.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if a key read by this transaction
    /// was modified by someone else before the commit.
    pub fn commit(self) -> StoreResult<()> {
        let TxState { reads, writes } = self.state.into_inner();
        if writes.is_empty() {
            return Ok(());
        }

        let reads: Vec<ReadVersion> = reads.into_iter().collect();
        let writes: Vec<(String, WriteOp)> = writes.into_iter().collect();

        tracing::debug!(
            reads = reads.len(),
            writes = writes.len(),
            "committing transaction"
        );
        self.base.commit_batch(&reads, &writes)
    }
}

impl<S: LedgerStore> LedgerStore for Transaction<S> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut state = self.state.lock();
        if let Some(op) = state.writes.get(key) {
            return Ok(match op {
                WriteOp::Put(value) => Some(value.clone()),
                WriteOp::Delete => None,
            });
        }
        if let Some(observed) = state.reads.get(key) {
            return Ok(observed.clone());
        }

        let value = self.base.get(key)?;
        state.reads.insert(key.to_string(), value.clone());
        Ok(value)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.state
            .lock()
            .writes
            .insert(key.to_string(), WriteOp::Put(value));
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        if self.get(key)?.is_none() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        self.state
            .lock()
            .writes
            .insert(key.to_string(), WriteOp::Delete);
        Ok(())
    }

    fn scan(&self) -> ScanIter<'_> {
        self.base.scan()
    }

    fn commit_batch(&self, reads: &[ReadVersion], writes: &[(String, WriteOp)]) -> StoreResult<()> {
        self.base.commit_batch(reads, writes)
    }
}
