//! # Record Codec
//!
//! Canonical byte encoding for credential records.
//!
//! Every replica executes the same transaction independently and the
//! resulting write sets are compared byte for byte, so two records with the
//! same field values must always encode to the same bytes. The encoding is
//! compact JSON with object keys sorted recursively and no insignificant
//! whitespace.
//!
//! Decoding is tolerant: any JSON object carrying the record fields parses,
//! whatever its key order or spacing. [`decode_lenient`] goes further and
//! never fails, handing back the raw bytes when they are not a record so a
//! full scan survives foreign or corrupt entries.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use thiserror::Error;

use credledger_protocol::crypto::blake3_hash;

use crate::credential::CredentialRecord;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while encoding or decoding a record.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes are not a well-formed credential record.
    #[error("malformed credential record: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Scan entries
// ---------------------------------------------------------------------------

/// One world-state entry as seen by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    /// The entry decoded as a credential record.
    Parsed(CredentialRecord),
    /// The entry could not be decoded; its bytes are passed through untouched.
    Raw(Vec<u8>),
}

impl ScanEntry {
    /// The decoded record, if any.
    pub fn as_record(&self) -> Option<&CredentialRecord> {
        match self {
            ScanEntry::Parsed(record) => Some(record),
            ScanEntry::Raw(_) => None,
        }
    }

    /// Consume the entry, keeping only a decoded record.
    pub fn into_record(self) -> Option<CredentialRecord> {
        match self {
            ScanEntry::Parsed(record) => Some(record),
            ScanEntry::Raw(_) => None,
        }
    }

    /// Return `true` for undecodable entries.
    pub fn is_raw(&self) -> bool {
        matches!(self, ScanEntry::Raw(_))
    }

    /// Raw content as text, with invalid UTF-8 replaced.
    pub fn raw_text(&self) -> Option<Cow<'_, str>> {
        match self {
            ScanEntry::Raw(bytes) => Some(String::from_utf8_lossy(bytes)),
            ScanEntry::Parsed(_) => None,
        }
    }
}

/// Parsed entries serialize as the record object, raw entries as a string.
impl Serialize for ScanEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScanEntry::Parsed(record) => record.serialize(serializer),
            ScanEntry::Raw(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a record into its canonical bytes.
pub fn encode(record: &CredentialRecord) -> Result<Vec<u8>, CodecError> {
    let value = canonicalize(serde_json::to_value(record)?);
    Ok(serde_json::to_vec(&value)?)
}

/// BLAKE3 digest of a record's canonical encoding.
pub fn digest(record: &CredentialRecord) -> Result<[u8; 32], CodecError> {
    Ok(blake3_hash(&encode(record)?))
}

/// Rebuild `value` with every object's keys in ascending order.
///
/// Insertion into a fresh map in sorted order keeps the result sorted
/// whether or not `serde_json` is built with `preserve_order`.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            let mut out = Map::with_capacity(sorted.len());
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode stored bytes into a record.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if the bytes are not JSON, lack a
/// required field, or carry a status outside `{active, revoked}`.
pub fn decode(bytes: &[u8]) -> Result<CredentialRecord, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decode stored bytes, falling back to [`ScanEntry::Raw`] on failure.
pub fn decode_lenient(bytes: &[u8]) -> ScanEntry {
    match decode(bytes) {
        Ok(record) => ScanEntry::Parsed(record),
        Err(_) => ScanEntry::Raw(bytes.to_vec()),
    }
}
