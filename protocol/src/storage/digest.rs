//! World-state fingerprint.
//!
//! Replicas that executed the same transactions must hold byte-identical
//! state. [`state_root`] condenses the whole store into one BLAKE3 Merkle
//! root so two replicas can compare state without shipping it:
//!
//! ```text
//! leaves = [ BLAKE3(len(key) || key || value) for (key, value) in scan() ]
//! root   = merkle_root(leaves)
//! ```
//!
//! Leaves follow the store's key order, so the root does not depend on the
//! order in which entries were written.

use super::store::{LedgerStore, StoreResult};
use crate::crypto::hash::{blake3_hash_multi, merkle_root};

/// Hash of a single world-state entry. The key length prefix keeps
/// `("ab", "c")` and `("a", "bc")` apart.
pub fn leaf_hash(key: &str, value: &[u8]) -> [u8; 32] {
    let key_len = (key.len() as u64).to_be_bytes();
    blake3_hash_multi(&[&key_len, key.as_bytes(), value])
}

/// Merkle root over every entry in `store`. An empty store yields
/// `[0u8; 32]`.
pub fn state_root<S: LedgerStore + ?Sized>(store: &S) -> StoreResult<[u8; 32]> {
    let leaves = store
        .scan()
        .map(|item| item.map(|(key, value)| leaf_hash(&key, &value)))
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(merkle_root(&leaves))
}

/// Number of entries currently in `store`.
pub fn entry_count<S: LedgerStore + ?Sized>(store: &S) -> StoreResult<usize> {
    store.scan().try_fold(0usize, |n, item| item.map(|_| n + 1))
}
