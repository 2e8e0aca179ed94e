//! # Hashing Primitives
//!
//! Thin wrappers around BLAKE3 shared by the storage digest and the record
//! codec.

pub mod hash;

pub use hash::{blake3_hash, blake3_hash_multi, digest_hex, merkle_root};
