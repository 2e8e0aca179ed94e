//! # Protocol Configuration & Constants
//!
//! Every magic value the ledger depends on lives here. Record layout,
//! storage names and default ports are part of the contract between
//! replicas and gateways, so changing any of them after a network is
//! running means migrating every peer's world state.

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Major version — bump on breaking changes to the record layout.
pub const PROTOCOL_VERSION_MAJOR: u16 = 0;

/// Minor version — bump on backward-compatible additions.
pub const PROTOCOL_VERSION_MINOR: u16 = 1;

/// Patch version — bump on fixes that leave stored bytes untouched.
pub const PROTOCOL_VERSION_PATCH: u16 = 0;

/// The full version string.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Record Layout
// ---------------------------------------------------------------------------

/// Document type tag written on every credential record. Lets a shared
/// world state hold other record kinds next to credentials.
pub const CREDENTIAL_DOC_TYPE: &str = "credential";

/// Status value of a credential that verifies successfully.
pub const STATUS_ACTIVE: &str = "active";

/// Status value of a credential that no longer verifies.
pub const STATUS_REVOKED: &str = "revoked";

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Name of the sled tree holding the credential world state.
pub const CREDENTIAL_TREE: &str = "credentials";

/// Subdirectory of the node data directory that holds the sled database.
pub const DB_DIR_NAME: &str = "db";

// ---------------------------------------------------------------------------
// Network Parameters
// ---------------------------------------------------------------------------

/// Default port for the gateway HTTP API.
pub const DEFAULT_API_PORT: u16 = 3001;

/// Default metrics (Prometheus) port.
pub const DEFAULT_METRICS_PORT: u16 = 3002;
