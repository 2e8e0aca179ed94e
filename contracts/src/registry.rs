//! # Credential Registry Contract
//!
//! The ledger engine for academic credentials. Every operation runs against
//! an injected [`LedgerStore`]: point operations read at most one key and
//! write at most one key, queries walk the whole world state.
//!
//! ## Operations
//!
//! | Operation          | Store effect                | Failure                        |
//! |--------------------|-----------------------------|--------------------------------|
//! | `init_ledger`      | writes the seed records     | store failure                  |
//! | `create`           | 1 read, 1 write             | `AlreadyExists`                |
//! | `read`             | 1 read                      | `NotFound`, `Decode`           |
//! | `update`           | 1 read, 1 write             | `InvalidStatus`, `NotFound`    |
//! | `delete`           | 1 read, 1 delete            | `NotFound`                     |
//! | `exists`           | 1 read                      | never                          |
//! | `scan_all`         | full scan                   | store failure only             |
//! | `find_by_student`  | full scan                   | store failure only             |
//! | `find_by_issuer`   | full scan                   | store failure only             |
//! | `verify`           | 1 read                      | `NotFound`, `Decode`           |
//!
//! ## Concurrency
//!
//! The registry holds no locks and never retries. Atomicity of the
//! read-then-write in `create`, `update` and `delete` is the store's job:
//! run the registry over a [`credledger_protocol::storage::Transaction`]
//! and two racing creates of one key cannot both commit. Scans see whatever
//! the store's iterator shows them.

use thiserror::Error;

use credledger_protocol::storage::{LedgerStore, StoreError};

use crate::codec::{self, CodecError, ScanEntry};
use crate::credential::{CredentialRecord, CredentialStatus, InvalidStatus, VerificationResult};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No record is stored under the key.
    #[error("The credential {0} does not exist")]
    NotFound(String),

    /// A record is already stored under the key.
    #[error("The credential {0} already exists")]
    AlreadyExists(String),

    /// Update was asked to write a status outside `{active, revoked}`.
    #[error("invalid status '{status}' for credential {id}: expected 'active' or 'revoked'")]
    InvalidStatus {
        /// Credential the update targeted.
        id: String,
        /// The rejected status value.
        status: String,
    },

    /// The stored bytes under the key are not a credential record.
    #[error("failed to decode credential {id}: {source}")]
    Decode {
        /// Key of the undecodable entry.
        id: String,
        source: CodecError,
    },

    /// A record could not be encoded.
    #[error("failed to encode credential {id}: {source}")]
    Encode {
        /// Key of the record being written.
        id: String,
        source: CodecError,
    },

    /// The underlying store failed.
    #[error("{op} failed for credential {id}: {source}")]
    Store {
        /// Operation that hit the failure.
        op: &'static str,
        /// Key involved, empty for scans.
        id: String,
        source: StoreError,
    },
}

impl RegistryError {
    fn store(op: &'static str, id: &str) -> impl FnOnce(StoreError) -> Self {
        let id = id.to_string();
        move |source| RegistryError::Store { op, id, source }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

// ---------------------------------------------------------------------------
// Scan filter
// ---------------------------------------------------------------------------

/// Which entries a full scan returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanFilter {
    /// Every entry in the store, decodable or not.
    #[default]
    All,
    /// Only decoded records tagged with the credential doc type.
    CredentialsOnly,
}

impl ScanFilter {
    fn admits(&self, entry: &ScanEntry) -> bool {
        match self {
            ScanFilter::All => true,
            ScanFilter::CredentialsOnly => entry.as_record().is_some_and(|r| r.is_credential()),
        }
    }
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// Records written by [`CredentialRegistry::init_ledger`].
pub fn seed_credentials() -> Vec<CredentialRecord> {
    vec![
        CredentialRecord::new(
            "cred001",
            "stu1001",
            "PUP",
            "BS in Computer Engineering",
            "2024-06-19",
        ),
        CredentialRecord::new("cred002", "stu1002", "University B", "pup", "2024-06-19"),
    ]
}

// ---------------------------------------------------------------------------
// CredentialRegistry
// ---------------------------------------------------------------------------

/// Credential ledger engine over an injected world-state store.
#[derive(Debug)]
pub struct CredentialRegistry<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> CredentialRegistry<S> {
    /// Wrap a store. The registry keeps no other state.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back, e.g. to commit a transaction.
    pub fn into_store(self) -> S {
        self.store
    }

    // -- Bootstrap ----------------------------------------------------------

    /// Write the seed credentials.
    ///
    /// Skips the existence check, so running it again overwrites the seed
    /// keys with their initial values.
    ///
    /// # Errors
    ///
    /// Propagates the first store write failure.
    pub fn init_ledger(&self) -> RegistryResult<()> {
        for record in seed_credentials() {
            self.write("init_ledger", &record)?;
        }
        tracing::info!("ledger initialized with seed credentials");
        Ok(())
    }

    // -- Point operations ---------------------------------------------------

    /// Return `true` if a non-empty value is stored under `id`.
    ///
    /// Never fails: a store read error is logged and reported as absent.
    pub fn exists(&self, id: &str) -> bool {
        match self.lookup("exists", id) {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::warn!(credential_id = %id, error = %e, "existence check failed");
                false
            }
        }
    }

    /// Create a new `active` credential.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyExists`] if `id` is taken.
    pub fn create(
        &self,
        id: &str,
        student_id: &str,
        issuer: &str,
        degree: &str,
        date_issued: &str,
    ) -> RegistryResult<CredentialRecord> {
        tracing::debug!(
            credential_id = %id,
            student_id = %student_id,
            issuer = %issuer,
            "create credential requested"
        );

        if self.lookup("create", id)?.is_some() {
            return Err(RegistryError::AlreadyExists(id.to_string()));
        }

        let record = CredentialRecord::new(id, student_id, issuer, degree, date_issued);
        self.write("create", &record)?;

        tracing::info!(credential_id = %id, "credential created");
        Ok(record)
    }

    /// Read the stored credential.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if nothing is stored under `id`,
    /// or [`RegistryError::Decode`] if the stored bytes are not a record.
    pub fn read(&self, id: &str) -> RegistryResult<CredentialRecord> {
        let bytes = self
            .lookup("read", id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        codec::decode(&bytes).map_err(|source| RegistryError::Decode {
            id: id.to_string(),
            source,
        })
    }

    /// Replace every field of an existing credential.
    ///
    /// This is a total overwrite: unchanged fields must be resupplied.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidStatus`] if `status` is not `active`
    /// or `revoked` (checked before touching the store), then
    /// [`RegistryError::NotFound`] if `id` is absent.
    pub fn update(
        &self,
        id: &str,
        student_id: &str,
        issuer: &str,
        degree: &str,
        date_issued: &str,
        status: &str,
    ) -> RegistryResult<CredentialRecord> {
        let status: CredentialStatus =
            status
                .parse()
                .map_err(|InvalidStatus(status)| RegistryError::InvalidStatus {
                    id: id.to_string(),
                    status,
                })?;

        if self.lookup("update", id)?.is_none() {
            return Err(RegistryError::NotFound(id.to_string()));
        }

        let record = CredentialRecord::new(id, student_id, issuer, degree, date_issued)
            .with_status(status);
        self.write("update", &record)?;

        tracing::info!(credential_id = %id, status = %status, "credential updated");
        Ok(record)
    }

    /// Remove a credential from the world state.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if `id` is absent.
    pub fn delete(&self, id: &str) -> RegistryResult<()> {
        if self.lookup("delete", id)?.is_none() {
            return Err(RegistryError::NotFound(id.to_string()));
        }

        self.store.delete(id).map_err(|e| match e {
            StoreError::NotFound(key) => RegistryError::NotFound(key),
            other => RegistryError::store("delete", id)(other),
        })?;

        tracing::info!(credential_id = %id, "credential deleted");
        Ok(())
    }

    /// Derive the verification verdict from the stored status.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn verify(&self, id: &str) -> RegistryResult<VerificationResult> {
        let record = self.read(id)?;
        Ok(record.status.verification())
    }

    // -- Queries ------------------------------------------------------------

    /// Lazily walk the world state in key order.
    ///
    /// Undecodable entries come back as [`ScanEntry::Raw`]; only store
    /// failures surface as errors.
    pub fn scan(&self, filter: ScanFilter) -> impl Iterator<Item = RegistryResult<ScanEntry>> + '_ {
        self.store.scan().filter_map(move |item| {
            let entry = match item {
                Ok((key, bytes)) => {
                    let entry = codec::decode_lenient(&bytes);
                    if entry.is_raw() {
                        tracing::warn!(
                            key = %key,
                            "entry did not decode as a credential, returning raw content"
                        );
                    }
                    entry
                }
                Err(e) => return Some(Err(RegistryError::store("scan", "")(e))),
            };
            filter.admits(&entry).then_some(Ok(entry))
        })
    }

    /// Every entry in the world state, in key order.
    pub fn scan_all(&self, filter: ScanFilter) -> RegistryResult<Vec<ScanEntry>> {
        self.scan(filter).collect()
    }

    /// Every credential whose student ID equals `student_id`, in key order.
    pub fn find_by_student(&self, student_id: &str) -> RegistryResult<Vec<CredentialRecord>> {
        self.find_where(|record| record.student_id == student_id)
    }

    /// Every credential whose issuer equals `issuer`, in key order.
    pub fn find_by_issuer(&self, issuer: &str) -> RegistryResult<Vec<CredentialRecord>> {
        self.find_where(|record| record.issuer == issuer)
    }

    fn find_where<F>(&self, predicate: F) -> RegistryResult<Vec<CredentialRecord>>
    where
        F: Fn(&CredentialRecord) -> bool,
    {
        let mut matches = Vec::new();
        for entry in self.scan(ScanFilter::All) {
            if let Some(record) = entry?.into_record() {
                if predicate(&record) {
                    matches.push(record);
                }
            }
        }
        Ok(matches)
    }

    // -- Internals ----------------------------------------------------------

    /// Stored bytes under `id`, treating an empty value as absent.
    fn lookup(&self, op: &'static str, id: &str) -> RegistryResult<Option<Vec<u8>>> {
        let value = self.store.get(id).map_err(RegistryError::store(op, id))?;
        Ok(value.filter(|bytes| !bytes.is_empty()))
    }

    fn write(&self, op: &'static str, record: &CredentialRecord) -> RegistryResult<()> {
        let id = record.credential_id.as_str();
        let bytes = codec::encode(record).map_err(|source| RegistryError::Encode {
            id: id.to_string(),
            source,
        })?;
        self.store.put(id, bytes).map_err(RegistryError::store(op, id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
