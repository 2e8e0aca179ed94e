//! # REST Gateway
//!
//! Builds the axum router that exposes the credential ledger over HTTP.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                                   | Kind     |
//! |--------|----------------------------------------|----------|
//! | GET    | `/health`                              | -        |
//! | GET    | `/status`                              | evaluate |
//! | POST   | `/api/initLedger`                      | submit   |
//! | GET    | `/api/credentials`                     | evaluate |
//! | POST   | `/api/createCredential`                | submit   |
//! | GET    | `/api/credential/:id`                  | evaluate |
//! | GET    | `/api/credential/:id/exists`           | evaluate |
//! | GET    | `/api/credential/:id/verify`           | evaluate |
//! | PUT    | `/api/updateCredential/:id`            | submit   |
//! | DELETE | `/api/deleteCredential/:id`            | submit   |
//! | GET    | `/api/credentials/student/:studentId`  | evaluate |
//! | GET    | `/api/credentials/issuer/:issuer`      | evaluate |
//!
//! Submit endpoints run the engine inside a [`Transaction`] and commit it;
//! a concurrent writer touching the same key makes the commit fail with 409.
//! Evaluate endpoints read the store directly and never write.

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use credledger_contracts::codec::ScanEntry;
use credledger_contracts::credential::{CredentialRecord, VerificationResult};
use credledger_contracts::registry::{CredentialRegistry, RegistryError, RegistryResult, ScanFilter};
use credledger_protocol::crypto::digest_hex;
use credledger_protocol::storage::digest::entry_count;
use credledger_protocol::storage::{state_root, LedgerStore, StoreError, Transaction};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// World-state handle shared by every request.
pub type SharedStore = Arc<dyn LedgerStore>;

/// Shared application state available to all request handlers.
///
/// Cheap to clone, everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// The world state.
    pub store: SharedStore,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/api/initLedger", post(init_ledger_handler))
        .route("/api/credentials", get(list_credentials_handler))
        .route("/api/createCredential", post(create_credential_handler))
        .route("/api/credential/:id", get(read_credential_handler))
        .route("/api/credential/:id/exists", get(credential_exists_handler))
        .route("/api/credential/:id/verify", get(verify_credential_handler))
        .route("/api/updateCredential/:id", put(update_credential_handler))
        .route("/api/deleteCredential/:id", delete(delete_credential_handler))
        .route(
            "/api/credentials/student/:student_id",
            get(credentials_by_student_handler),
        )
        .route(
            "/api/credentials/issuer/:issuer",
            get(credentials_by_issuer_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request & Response Types
// ---------------------------------------------------------------------------

/// Body of `POST /api/createCredential`. Missing fields read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCredentialRequest {
    pub credential_id: String,
    pub student_id: String,
    pub issuer: String,
    pub degree: String,
    pub date_issued: String,
}

impl CreateCredentialRequest {
    fn is_complete(&self) -> bool {
        [
            &self.credential_id,
            &self.student_id,
            &self.issuer,
            &self.degree,
            &self.date_issued,
        ]
        .iter()
        .all(|field| !field.is_empty())
    }
}

/// Body of `PUT /api/updateCredential/:id`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCredentialRequest {
    pub student_id: String,
    pub issuer: String,
    pub degree: String,
    pub date_issued: String,
    pub status: String,
}

/// Query string of `GET /api/credentials`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    /// Keep only records tagged as credentials.
    pub credentials_only: bool,
}

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Node software version.
    pub version: String,
    /// Number of entries in the world state.
    pub entries: usize,
    /// Hex-encoded BLAKE3 Merkle root of the world state.
    pub state_root: String,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Response payload for `GET /api/credential/:id/exists`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExistsResponse {
    #[serde(rename = "credentialID")]
    pub credential_id: String,
    pub exists: bool,
}

/// Response payload for `GET /api/credential/:id/verify`.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(rename = "credentialID")]
    pub credential_id: String,
    pub result: VerificationResult,
    pub message: String,
}

/// Confirmation body returned by submit endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn json(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Generic error body returned by REST endpoints on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a gateway request.
#[derive(Debug)]
pub enum ApiError {
    /// The request was rejected before reaching the engine.
    BadRequest(String),
    /// The engine rejected the operation.
    Registry(RegistryError),
    /// The transaction could not be committed.
    Commit(StoreError),
    /// A direct store read failed.
    Store(StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Registry(RegistryError::AlreadyExists(_)) => StatusCode::CONFLICT,
            ApiError::Registry(RegistryError::InvalidStatus { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Commit(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
            ApiError::Commit(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Registry(e) => e.to_string(),
            ApiError::Commit(e) => format!("Failed to commit transaction: {}", e),
            ApiError::Store(e) => format!("Store error: {}", e),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        ApiError::Registry(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.message(), "request failed");
        }
        (status, Json(ErrorResponse { error: self.message() })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Submit / Evaluate
// ---------------------------------------------------------------------------

type TxRegistry = CredentialRegistry<Transaction<SharedStore>>;

/// Run a writing operation in a fresh transaction and commit it.
fn submit<T, F>(state: &AppState, op: &'static str, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&TxRegistry) -> RegistryResult<T>,
{
    let metrics = &state.metrics;
    let timer = metrics.operation_latency_seconds.start_timer();
    let registry = CredentialRegistry::new(Transaction::begin(Arc::clone(&state.store)));

    let out = match f(&registry) {
        Ok(out) => out,
        Err(e) => {
            metrics.operations_failed_total.inc();
            return Err(e.into());
        }
    };

    let tx = registry.into_store();
    let committed = tx.entry_delta().and_then(|delta| tx.commit().map(|()| delta));
    let delta = match committed {
        Ok(delta) => delta,
        Err(e) => {
            metrics.operations_failed_total.inc();
            if matches!(e, StoreError::Conflict { .. }) {
                metrics.commit_conflicts_total.inc();
                tracing::warn!(op, error = %e, "commit rejected");
            }
            return Err(ApiError::Commit(e));
        }
    };

    metrics.operations_submitted_total.inc();
    metrics.stored_entries.add(delta);
    timer.observe_duration();
    tracing::debug!(op, "transaction committed");
    Ok(out)
}

/// Run a read-only operation against the store.
fn evaluate<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&CredentialRegistry<SharedStore>) -> RegistryResult<T>,
{
    let metrics = &state.metrics;
    let timer = metrics.operation_latency_seconds.start_timer();
    let registry = CredentialRegistry::new(Arc::clone(&state.store));

    let out = f(&registry).map_err(|e| {
        metrics.operations_failed_total.inc();
        ApiError::from(e)
    })?;

    metrics.operations_evaluated_total.inc();
    timer.observe_duration();
    Ok(out)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` — returns 200 if the node is alive.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status` — entry count and state root of the world state.
async fn status_handler(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let store = state.store.as_ref();
    let entries = entry_count(store).map_err(ApiError::Store)?;
    let root = state_root(store).map_err(ApiError::Store)?;

    Ok(Json(StatusResponse {
        version: state.version.clone(),
        entries,
        state_root: digest_hex(&root),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// `POST /api/initLedger` — writes the seed credentials.
async fn init_ledger_handler(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    submit(&state, "init_ledger", |reg| reg.init_ledger())?;
    Ok(MessageResponse::json("Ledger initialized successfully."))
}

/// `GET /api/credentials` — every entry in the world state.
async fn list_credentials_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ScanEntry>>, ApiError> {
    let filter = if query.credentials_only {
        ScanFilter::CredentialsOnly
    } else {
        ScanFilter::All
    };
    evaluate(&state, |reg| reg.scan_all(filter)).map(Json)
}

/// `POST /api/createCredential` — issues a new credential.
async fn create_credential_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateCredentialRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !req.is_complete() {
        return Err(ApiError::BadRequest("All fields are required.".into()));
    }

    submit(&state, "create", |reg| {
        reg.create(
            &req.credential_id,
            &req.student_id,
            &req.issuer,
            &req.degree,
            &req.date_issued,
        )
    })?;
    Ok(MessageResponse::json("Credential created successfully."))
}

/// `GET /api/credential/:id` — one credential.
async fn read_credential_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CredentialRecord>, ApiError> {
    evaluate(&state, |reg| reg.read(&id)).map(Json)
}

/// `GET /api/credential/:id/exists` — whether a credential is stored.
async fn credential_exists_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExistsResponse>, ApiError> {
    let exists = evaluate(&state, |reg| Ok(reg.exists(&id)))?;
    Ok(Json(ExistsResponse {
        credential_id: id,
        exists,
    }))
}

/// `GET /api/credential/:id/verify` — verdict derived from the status.
async fn verify_credential_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let result = evaluate(&state, |reg| reg.verify(&id))?;
    Ok(Json(VerifyResponse {
        credential_id: id,
        result,
        message: result.message().to_string(),
    }))
}

/// `PUT /api/updateCredential/:id` — overwrites every field.
async fn update_credential_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCredentialRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    submit(&state, "update", |reg| {
        reg.update(
            &id,
            &req.student_id,
            &req.issuer,
            &req.degree,
            &req.date_issued,
            &req.status,
        )
    })?;
    Ok(MessageResponse::json("Credential updated successfully."))
}

/// `DELETE /api/deleteCredential/:id` — removes a credential.
async fn delete_credential_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    submit(&state, "delete", |reg| reg.delete(&id))?;
    Ok(MessageResponse::json("Credential deleted successfully."))
}

/// `GET /api/credentials/student/:studentId` — credentials held by a student.
async fn credentials_by_student_handler(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<CredentialRecord>>, ApiError> {
    evaluate(&state, |reg| reg.find_by_student(&student_id)).map(Json)
}

/// `GET /api/credentials/issuer/:issuer` — credentials from one issuer.
async fn credentials_by_issuer_handler(
    State(state): State<AppState>,
    Path(issuer): Path<String>,
) -> Result<Json<Vec<CredentialRecord>>, ApiError> {
    evaluate(&state, |reg| reg.find_by_issuer(&issuer)).map(Json)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use credledger_protocol::storage::store::ReadVersion;
    use credledger_protocol::storage::{MemoryStore, ScanIter, StoreResult, WriteOp};
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    /// Creates a test AppState backed by an empty in-memory store.
    fn test_app_state() -> AppState {
        AppState {
            version: "0.1.0-test".into(),
            store: Arc::new(MemoryStore::new()),
            metrics: Arc::new(crate::metrics::NodeMetrics::new().expect("metrics")),
        }
    }

    /// Creates a test AppState holding the seed credentials.
    fn test_app_state_seeded() -> AppState {
        let state = test_app_state();
        CredentialRegistry::new(Arc::clone(&state.store))
            .init_ledger()
            .expect("seed ledger");
        state
    }

    /// Sends a request with an optional JSON body and returns (status, body_bytes).
    async fn send(
        router: &Router,
        method: &str,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(path);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        (status, body)
    }

    async fn get(router: &Router, path: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = send(router, "GET", path, None).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn create_body(id: &str) -> serde_json::Value {
        serde_json::json!({
            "credentialId": id,
            "studentId": "stu1001",
            "issuer": "University A",
            "degree": "BSc Computer Science",
            "dateIssued": "2021-06-15",
        })
    }

    // -- Liveness & status ----------------------------------------------------

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let router = create_router(test_app_state());
        let (status, json) = get(&router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn status_reports_entries_and_root() {
        let router = create_router(test_app_state_seeded());
        let (status, json) = get(&router, "/status").await;

        assert_eq!(status, StatusCode::OK);
        let resp: StatusResponse = serde_json::from_value(json).unwrap();
        assert_eq!(resp.entries, 2);
        assert_eq!(resp.state_root.len(), 64);
        assert_ne!(resp.state_root, "0".repeat(64));
    }

    // -- Submit endpoints -----------------------------------------------------

    #[tokio::test]
    async fn init_ledger_seeds_credentials() {
        let state = test_app_state();
        let router = create_router(state.clone());

        let (status, _) = send(&router, "POST", "/api/initLedger", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = get(&router, "/api/credential/cred001").await;
        assert_eq!(json["issuer"], "PUP");
        assert_eq!(state.metrics.stored_entries.get(), 2);
    }

    #[tokio::test]
    async fn create_then_read_round_trips_over_http() {
        let router = create_router(test_app_state());

        let (status, _) =
            send(&router, "POST", "/api/createCredential", Some(create_body("cred001"))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = get(&router, "/api/credential/cred001").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["credentialID"], "cred001");
        assert_eq!(json["studentID"], "stu1001");
        assert_eq!(json["status"], "active");
    }

    #[tokio::test]
    async fn create_with_missing_field_is_bad_request() {
        let state = test_app_state();
        let router = create_router(state.clone());
        let mut body = create_body("cred001");
        body["degree"] = "".into();

        let (status, bytes) = send(&router, "POST", "/api/createCredential", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.error, "All fields are required.");
        assert!(state.store.get("cred001").unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_create_is_conflict() {
        let state = test_app_state();
        let router = create_router(state.clone());
        send(&router, "POST", "/api/createCredential", Some(create_body("cred001"))).await;

        let (status, bytes) =
            send(&router, "POST", "/api/createCredential", Some(create_body("cred001"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.error, "The credential cred001 already exists");
        assert_eq!(state.metrics.operations_failed_total.get(), 1);
    }

    #[tokio::test]
    async fn update_revokes_and_verify_reports_it() {
        let router = create_router(test_app_state_seeded());
        let body = serde_json::json!({
            "studentId": "stu1001",
            "issuer": "PUP",
            "degree": "BS in Computer Engineering",
            "dateIssued": "2024-06-19",
            "status": "revoked",
        });

        let (status, _) = send(&router, "PUT", "/api/updateCredential/cred001", Some(body)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = get(&router, "/api/credential/cred001/verify").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"], "Revoked");
        assert_eq!(json["message"], "Credential is revoked");
    }

    #[tokio::test]
    async fn update_with_bad_status_is_bad_request() {
        let router = create_router(test_app_state_seeded());
        let body = serde_json::json!({
            "studentId": "stu1001",
            "issuer": "PUP",
            "degree": "BS",
            "dateIssued": "2024-06-19",
            "status": "suspended",
        });

        let (status, _) = send(&router, "PUT", "/api/updateCredential/cred001", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_then_lookups_are_not_found() {
        let router = create_router(test_app_state_seeded());

        let (status, _) = send(&router, "DELETE", "/api/deleteCredential/cred002", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = get(&router, "/api/credential/cred002").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "The credential cred002 does not exist");

        let (status, _) = send(&router, "DELETE", "/api/deleteCredential/cred002", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, json) = get(&router, "/api/credential/cred002/exists").await;
        assert_eq!(json["exists"], false);
    }

    /// Store wrapper that counts full scans of the world state.
    struct ScanCountingStore {
        inner: MemoryStore,
        scans: AtomicUsize,
    }

    impl LedgerStore for ScanCountingStore {
        fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
            self.inner.put(key, value)
        }

        fn delete(&self, key: &str) -> StoreResult<()> {
            self.inner.delete(key)
        }

        fn scan(&self) -> ScanIter<'_> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            self.inner.scan()
        }

        fn commit_batch(&self, reads: &[ReadVersion], writes: &[(String, WriteOp)]) -> StoreResult<()> {
            self.inner.commit_batch(reads, writes)
        }
    }

    #[tokio::test]
    async fn writes_keep_entry_gauge_without_scanning() {
        let store = Arc::new(ScanCountingStore {
            inner: MemoryStore::new(),
            scans: AtomicUsize::new(0),
        });
        for i in 0..1_000 {
            store.put(&format!("bulk{i:04}"), b"{}".to_vec()).unwrap();
        }
        let mut state = test_app_state();
        state.store = store.clone();
        state.metrics.stored_entries.set(1_000);
        let router = create_router(state.clone());

        let (status, _) =
            send(&router, "POST", "/api/createCredential", Some(create_body("cred001"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.metrics.stored_entries.get(), 1_001);

        send(&router, "POST", "/api/initLedger", None).await;
        assert_eq!(state.metrics.stored_entries.get(), 1_002);

        let (status, _) = send(&router, "DELETE", "/api/deleteCredential/cred002", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.metrics.stored_entries.get(), 1_001);

        assert_eq!(store.scans.load(Ordering::SeqCst), 0);
        assert_eq!(entry_count(store.as_ref()).unwrap(), 1_001);
    }

    // -- Evaluate endpoints ---------------------------------------------------

    #[tokio::test]
    async fn list_surfaces_raw_entries_unless_filtered() {
        let state = test_app_state_seeded();
        state.store.put("junk", b"non-json-value".to_vec()).unwrap();
        let router = create_router(state);

        let (status, json) = get(&router, "/api/credentials").await;
        assert_eq!(status, StatusCode::OK);
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2], "non-json-value");

        let (_, json) = get(&router, "/api/credentials?credentialsOnly=true").await;
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn queries_by_student_and_issuer() {
        let router = create_router(test_app_state_seeded());

        let (status, json) = get(&router, "/api/credentials/student/stu1002").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["credentialID"], "cred002");

        let (_, json) = get(&router, "/api/credentials/issuer/PUP").await;
        assert_eq!(json.as_array().unwrap().len(), 1);

        let (_, json) = get(&router, "/api/credentials/issuer/Nobody").await;
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn evaluate_never_writes() {
        let state = test_app_state_seeded();
        let router = create_router(state.clone());
        let before = state_root(state.store.as_ref()).unwrap();

        get(&router, "/api/credentials").await;
        get(&router, "/api/credential/cred001/verify").await;
        get(&router, "/api/credential/missing/exists").await;

        assert_eq!(state_root(state.store.as_ref()).unwrap(), before);
        assert_eq!(state.metrics.operations_submitted_total.get(), 0);
        assert_eq!(state.metrics.operations_evaluated_total.get(), 3);
    }
}
