//! Integration tests for the credential registry.
//!
//! These tests drive the registry through full credential lifecycles over
//! every store backend: the in-memory store, a temporary sled database, and
//! transactions layered on top of either. A failing store covers error
//! propagation on the write path.

use std::sync::Arc;
use std::thread;

use credledger_contracts::codec;
use credledger_contracts::credential::{CredentialRecord, CredentialStatus, VerificationResult};
use credledger_contracts::registry::{CredentialRegistry, RegistryError, ScanFilter};
use credledger_protocol::storage::{
    LedgerDB, LedgerStore, MemoryStore, ScanIter, StoreError, StoreResult, Transaction, WriteOp,
};

/// Helper: a registry over a fresh in-memory store.
fn memory_registry() -> CredentialRegistry<MemoryStore> {
    CredentialRegistry::new(MemoryStore::new())
}

/// Helper: issues the two sample credentials used across scenarios.
fn issue_samples<S: LedgerStore>(reg: &CredentialRegistry<S>) {
    reg.create(
        "cred001",
        "stu1001",
        "University A",
        "BSc Computer Science",
        "2021-06-15",
    )
    .unwrap();
    reg.create(
        "cred002",
        "stu1002",
        "University B",
        "MA English Literature",
        "2022-01-20",
    )
    .unwrap();
}

/// A store whose reads succeed on an empty state and whose writes always fail.
struct FailingStore;

impl LedgerStore for FailingStore {
    fn get(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(None)
    }

    fn put(&self, _key: &str, _value: Vec<u8>) -> StoreResult<()> {
        Err(StoreError::Backend("disk full".into()))
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        Err(StoreError::NotFound(key.to_string()))
    }

    fn scan(&self) -> ScanIter<'_> {
        Box::new(std::iter::once(Err(StoreError::Backend(
            "iterator unavailable".into(),
        ))))
    }

    fn commit_batch(
        &self,
        _reads: &[(String, Option<Vec<u8>>)],
        _writes: &[(String, WriteOp)],
    ) -> StoreResult<()> {
        Err(StoreError::Backend("disk full".into()))
    }
}

// ---------------------------------------------------------------------------
// Lifecycle Tests
// ---------------------------------------------------------------------------

#[test]
fn full_lifecycle_happy_path() {
    let reg = memory_registry();

    // 1. Issue
    let created = reg
        .create("cred001", "stu1001", "University A", "BSc Computer Science", "2021-06-15")
        .unwrap();
    assert_eq!(created.status, CredentialStatus::Active);
    assert!(reg.exists("cred001"));
    assert_eq!(reg.verify("cred001").unwrap(), VerificationResult::Valid);

    // 2. Revoke
    reg.update(
        "cred001",
        "stu1001",
        "University A",
        "BSc Computer Science",
        "2021-06-15",
        "revoked",
    )
    .unwrap();
    let verdict = reg.verify("cred001").unwrap();
    assert_eq!(verdict, VerificationResult::Revoked);
    assert_eq!(verdict.message(), "Credential is revoked");

    // 3. Delete
    reg.delete("cred001").unwrap();
    assert!(!reg.exists("cred001"));
    assert!(matches!(reg.read("cred001"), Err(RegistryError::NotFound(_))));
}

#[test]
fn issue_verify_revoke_delete_scenario() {
    let reg = memory_registry();
    reg.create("cred001", "stu1001", "PUP", "BS in CompE", "2024-06-19")
        .unwrap();

    assert!(reg.exists("cred001"));
    assert_eq!(reg.verify("cred001").unwrap(), VerificationResult::Valid);

    reg.update("cred001", "stu1001", "PUP", "BS in CompE", "2024-06-19", "revoked")
        .unwrap();
    assert_eq!(reg.verify("cred001").unwrap(), VerificationResult::Revoked);

    reg.delete("cred001").unwrap();
    let err = reg.read("cred001").unwrap_err();
    assert_eq!(err.to_string(), "The credential cred001 does not exist");
}

#[test]
fn scan_after_n_creates_returns_n_parsed_entries() {
    let reg = memory_registry();
    for i in 0..25 {
        reg.create(&format!("cred{i:03}"), "stu", "PUP", "BS", "2024-06-19")
            .unwrap();
    }

    let entries = reg.scan_all(ScanFilter::All).unwrap();
    assert_eq!(entries.len(), 25);
    assert!(entries.iter().all(|e| !e.is_raw()));
}

#[test]
fn stored_bytes_are_canonical() {
    let reg = memory_registry();
    let record = reg
        .create("cred001", "stu1001", "University A", "BSc Computer Science", "2021-06-15")
        .unwrap();

    let stored = reg.store().get("cred001").unwrap().unwrap();
    assert_eq!(stored, codec::encode(&record).unwrap());
    assert!(String::from_utf8(stored).unwrap().starts_with(r#"{"credentialID":"cred001","#));
}

#[test]
fn recreate_after_delete_is_allowed() {
    let reg = memory_registry();
    reg.create("cred001", "stu1001", "A", "BSc", "2021-06-15").unwrap();
    reg.delete("cred001").unwrap();

    let again = reg.create("cred001", "stu7777", "B", "MSc", "2023-03-03").unwrap();
    assert_eq!(reg.read("cred001").unwrap(), again);
}

// ---------------------------------------------------------------------------
// Query Tests
// ---------------------------------------------------------------------------

#[test]
fn scan_returns_every_entry_in_key_order() {
    let reg = memory_registry();
    issue_samples(&reg);
    reg.store().put("cred003", b"non-json-value".to_vec()).unwrap();

    let entries = reg.scan_all(ScanFilter::All).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].as_record().unwrap().credential_id, "cred001");
    assert_eq!(entries[1].as_record().unwrap().credential_id, "cred002");
    assert!(entries[2].is_raw());
    assert_eq!(entries[2].raw_text().as_deref(), Some("non-json-value"));
}

#[test]
fn scan_of_empty_state_is_empty() {
    let reg = memory_registry();
    assert!(reg.scan_all(ScanFilter::All).unwrap().is_empty());
    assert!(reg.find_by_student("stu1001").unwrap().is_empty());
}

#[test]
fn find_by_student_matches_exactly() {
    let reg = memory_registry();
    issue_samples(&reg);
    reg.create("cred003", "stu1001", "University C", "PhD Physics", "2024-05-01")
        .unwrap();
    reg.store().put("junk", b"non-json-value".to_vec()).unwrap();

    let found = reg.find_by_student("stu1001").unwrap();
    let ids: Vec<&str> = found.iter().map(|r| r.credential_id.as_str()).collect();
    assert_eq!(ids, vec!["cred001", "cred003"]);

    assert!(reg.find_by_student("STU1001").unwrap().is_empty());
}

#[test]
fn find_by_issuer_matches_exactly() {
    let reg = memory_registry();
    issue_samples(&reg);

    let found = reg.find_by_issuer("University B").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].credential_id, "cred002");

    assert!(reg.find_by_issuer("University").unwrap().is_empty());
}

#[test]
fn revoked_credentials_still_appear_in_queries() {
    let reg = memory_registry();
    issue_samples(&reg);
    reg.update("cred002", "stu1002", "University B", "MA English Literature", "2022-01-20", "revoked")
        .unwrap();

    let found = reg.find_by_issuer("University B").unwrap();
    assert_eq!(found[0].status, CredentialStatus::Revoked);
    assert_eq!(reg.scan_all(ScanFilter::CredentialsOnly).unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Store Failure Tests
// ---------------------------------------------------------------------------

#[test]
fn write_failure_propagates_from_create_and_init() {
    let reg = CredentialRegistry::new(FailingStore);

    let err = reg.create("cred001", "s", "i", "d", "t").unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Store { op: "create", source: StoreError::Backend(_), .. }
    ));

    assert!(matches!(
        reg.init_ledger(),
        Err(RegistryError::Store { op: "init_ledger", .. })
    ));
}

#[test]
fn scan_failure_propagates_from_queries() {
    let reg = CredentialRegistry::new(FailingStore);
    assert!(matches!(
        reg.scan_all(ScanFilter::All),
        Err(RegistryError::Store { op: "scan", .. })
    ));
    assert!(reg.find_by_issuer("PUP").is_err());
}

// ---------------------------------------------------------------------------
// Backend & Transaction Tests
// ---------------------------------------------------------------------------

#[test]
fn registry_over_sled_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let reg = CredentialRegistry::new(LedgerDB::open(dir.path()).unwrap());
        issue_samples(&reg);
        reg.store().flush().unwrap();
    }

    let reg = CredentialRegistry::new(LedgerDB::open(dir.path()).unwrap());
    assert_eq!(reg.read("cred002").unwrap().degree, "MA English Literature");
    assert_eq!(reg.scan_all(ScanFilter::All).unwrap().len(), 2);
}

#[test]
fn transaction_writes_are_invisible_until_commit() {
    let base = Arc::new(MemoryStore::new());
    let reg = CredentialRegistry::new(Transaction::begin(Arc::clone(&base)));

    reg.create("cred001", "stu1001", "A", "BSc", "2021-06-15").unwrap();
    assert!(reg.exists("cred001"));
    assert!(base.get("cred001").unwrap().is_none());

    reg.into_store().commit().unwrap();
    assert!(CredentialRegistry::new(Arc::clone(&base)).exists("cred001"));
}

#[test]
fn failed_operation_leaves_nothing_to_commit() {
    let base = Arc::new(MemoryStore::new());
    let reg = CredentialRegistry::new(Transaction::begin(Arc::clone(&base)));

    assert!(reg.update("cred001", "s", "i", "d", "t", "revoked").is_err());
    assert_eq!(reg.store().write_set_len(), 0);
}

#[test]
fn concurrent_creates_of_one_id_admit_one_winner() {
    let base: Arc<dyn LedgerStore> = Arc::new(LedgerDB::open_temporary().unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let base = Arc::clone(&base);
            thread::spawn(move || {
                let reg = CredentialRegistry::new(Transaction::begin(base));
                let student = format!("stu{i}");
                if reg.create("cred001", &student, "A", "BSc", "2021-06-15").is_err() {
                    return false;
                }
                reg.into_store().commit().is_ok()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    let reg = CredentialRegistry::new(base);
    assert_eq!(reg.scan_all(ScanFilter::All).unwrap().len(), 1);
}

#[test]
fn seed_then_verify_through_transaction() {
    let base = Arc::new(MemoryStore::new());
    let tx = Transaction::begin(Arc::clone(&base));
    CredentialRegistry::new(&tx).init_ledger().unwrap();
    tx.commit().unwrap();

    let reg = CredentialRegistry::new(base);
    let seeded: Vec<CredentialRecord> = reg
        .scan_all(ScanFilter::CredentialsOnly)
        .unwrap()
        .into_iter()
        .filter_map(|e| e.into_record())
        .collect();
    assert_eq!(seeded.len(), 2);
    assert_eq!(reg.verify("cred002").unwrap(), VerificationResult::Valid);
}
