//! # Credential Records
//!
//! The single entity stored by the ledger: an academic credential keyed by
//! its credential ID. Field names on the wire are camelCase because replicas
//! and gateways written before this crate already persist them that way.
//!
//! ## Status
//!
//! ```text
//! active ◄──── Update ────► revoked
//! ```
//!
//! Every record starts `active`. Only an explicit update changes it, in
//! either direction; nothing expires on its own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use credledger_protocol::config::{CREDENTIAL_DOC_TYPE, STATUS_ACTIVE, STATUS_REVOKED};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// A status string outside the `{active, revoked}` domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid credential status '{0}': expected 'active' or 'revoked'")]
pub struct InvalidStatus(pub String);

/// Lifecycle status of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    /// The credential verifies successfully.
    Active,
    /// The credential has been withdrawn by its issuer.
    Revoked,
}

impl CredentialStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialStatus::Active => STATUS_ACTIVE,
            CredentialStatus::Revoked => STATUS_REVOKED,
        }
    }

    /// Outcome of verifying a credential in this status.
    pub fn verification(&self) -> VerificationResult {
        match self {
            CredentialStatus::Active => VerificationResult::Valid,
            CredentialStatus::Revoked => VerificationResult::Revoked,
        }
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialStatus {
    type Err = InvalidStatus;

    /// Exact, case-sensitive match on the wire values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_ACTIVE => Ok(CredentialStatus::Active),
            STATUS_REVOKED => Ok(CredentialStatus::Revoked),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Result of verifying a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationResult {
    Valid,
    Revoked,
}

impl VerificationResult {
    /// Human-readable verdict returned to gateway callers.
    pub fn message(&self) -> &'static str {
        match self {
            VerificationResult::Valid => "Credential is valid",
            VerificationResult::Revoked => "Credential is revoked",
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A credential as stored in the world state.
///
/// The store key is always `credential_id`. `date_issued` is kept as the
/// caller supplied it; the ledger never parses dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Primary key. Immutable once created.
    #[serde(rename = "credentialID")]
    pub credential_id: String,
    /// Subject of the credential. One student may hold many credentials.
    #[serde(rename = "studentID")]
    pub student_id: String,
    /// Issuing authority.
    pub issuer: String,
    /// Qualification name, free text.
    pub degree: String,
    /// Issue date, opaque string.
    #[serde(rename = "dateIssued")]
    pub date_issued: String,
    /// Lifecycle status.
    pub status: CredentialStatus,
    /// Record kind tag. `None` on records written without one.
    #[serde(rename = "docType", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

impl CredentialRecord {
    /// Build an `active` credential tagged with the credential doc type.
    pub fn new(
        credential_id: impl Into<String>,
        student_id: impl Into<String>,
        issuer: impl Into<String>,
        degree: impl Into<String>,
        date_issued: impl Into<String>,
    ) -> Self {
        Self {
            credential_id: credential_id.into(),
            student_id: student_id.into(),
            issuer: issuer.into(),
            degree: degree.into(),
            date_issued: date_issued.into(),
            status: CredentialStatus::Active,
            doc_type: Some(CREDENTIAL_DOC_TYPE.to_string()),
        }
    }

    /// Same record with a different status.
    pub fn with_status(mut self, status: CredentialStatus) -> Self {
        self.status = status;
        self
    }

    /// Return `true` if the record carries the credential doc type tag.
    pub fn is_credential(&self) -> bool {
        self.doc_type.as_deref() == Some(CREDENTIAL_DOC_TYPE)
    }
}
