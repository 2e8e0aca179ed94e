// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # CredLedger Protocol — Core Library
//!
//! The shared foundation of the credential ledger: the world-state storage
//! layer every contract runs against, the hashing used to fingerprint that
//! state across replicas, and the constants that fix the record layout.
//!
//! ## Architecture
//!
//! - **storage** — The `LedgerStore` contract, sled and in-memory backends,
//!   optimistic read/write-set transactions, and the state root.
//! - **crypto** — BLAKE3 hashing and Merkle roots.
//! - **config** — Protocol constants and defaults.
//!
//! Consensus, ordering and endorsement are someone else's problem: this
//! crate assumes they happen above `commit_batch`.

pub mod config;
pub mod crypto;
pub mod storage;
