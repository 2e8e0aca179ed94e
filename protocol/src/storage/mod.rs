//! # Storage Module
//!
//! The world state of the credential ledger. Everything above this module
//! treats storage as an ordered key-value store reachable only through the
//! [`LedgerStore`] trait.
//!
//! ## Architecture
//!
//! ```text
//! store.rs   — LedgerStore trait, StoreError, scan and batch types
//! memory.rs  — BTreeMap-backed store for tests and ephemeral nodes
//! db.rs      — sled-backed persistent store
//! txn.rs     — read/write-set transactions with optimistic conflict checks
//! digest.rs  — BLAKE3 Merkle root over the world state
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! contract ─► Transaction ─► commit_batch ─► LedgerDB / MemoryStore
//!                 │
//!                 └─ reads served from the base store, writes buffered
//! ```

pub mod db;
pub mod digest;
pub mod memory;
pub mod store;
pub mod txn;

pub use db::LedgerDB;
pub use digest::state_root;
pub use memory::MemoryStore;
pub use store::{LedgerStore, ScanIter, StoreError, StoreResult, WriteOp};
pub use txn::Transaction;
