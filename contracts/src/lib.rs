//! # CredLedger Contracts
//!
//! Ledger logic for academic credentials: issuance, lookup, status updates,
//! revocation and verification, plus the attribute queries that walk the
//! whole world state.
//!
//! - **credential** — The record type, its lifecycle status and the
//!   verification verdict derived from it.
//! - **codec** — Canonical byte encoding so every replica writes identical
//!   bytes for identical records.
//! - **registry** — The engine. Runs each operation against an injected
//!   `LedgerStore` and reports failures as typed errors.
//!
//! Callers that need conflict detection run the registry over a
//! `Transaction` and commit it when the operation succeeds.

pub mod codec;
pub mod credential;
pub mod registry;

pub use codec::{CodecError, ScanEntry};
pub use credential::{CredentialRecord, CredentialStatus, InvalidStatus, VerificationResult};
pub use registry::{CredentialRegistry, RegistryError, RegistryResult, ScanFilter};
