// pokedex-server/src/server.rs
// ============================================================================
// Module: API Server
// Description: HTTP handlers and bootstrap for the Pokedex search log.
// Purpose: Map JSON requests onto the credential check and history service.
// Dependencies: pokedex-core, pokedex-config, pokedex-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! The API server binds one axum router with three routes:
//! - `POST /api/login` checks the submitted pair against the configured
//!   credentials. No session or token is issued.
//! - `POST /api/search` records a search term and answers `201` with its id.
//! - `GET /api/history` lists the newest records, newest first.
//!
//! Every response uses the `{ success, ... }` envelope, including `404` for
//! unknown paths and `405` for known paths hit with the wrong method. Request bodies are read as raw bytes and parsed here so
//! size limits and malformed JSON map onto the same envelope. Store calls run
//! in a blocking section because `SQLite` access is synchronous.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use pokedex_config::HistoryStoreType;
use pokedex_config::PokedexConfig;
use pokedex_config::ServerAuditConfig;
use pokedex_core::Credentials;
use pokedex_core::DEFAULT_HISTORY_LIMIT;
use pokedex_core::HistoryEntry;
use pokedex_core::HistoryError;
use pokedex_core::HistoryService;
use pokedex_core::InMemoryHistoryStore;
use pokedex_core::RecordId;
use pokedex_core::SearchRecord;
use pokedex_core::SearchTerm;
use pokedex_core::SharedHistoryStore;
use pokedex_core::TermError;
use pokedex_store_sqlite::SqliteHistoryStore;
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;

use crate::audit::ApiAuditEvent;
use crate::audit::ApiAuditEventParams;
use crate::audit::ApiAuditSink;
use crate::audit::ApiFileAuditSink;
use crate::audit::ApiNoopAuditSink;
use crate::audit::ApiOutcome;
use crate::audit::ApiRoute;
use crate::audit::ApiStderrAuditSink;
use crate::audit::LifecycleAuditEvent;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Login route path.
pub const LOGIN_PATH: &str = "/api/login";
/// Search logging route path.
pub const SEARCH_PATH: &str = "/api/search";
/// History listing route path.
pub const HISTORY_PATH: &str = "/api/history";

/// Default request body limit when none is configured.
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Longest submitted username copied into audit events.
const MAX_AUDIT_USERNAME_CHARS: usize = 64;

/// Successful login message.
const LOGIN_OK_MESSAGE: &str = "Login successful";
/// Successful search logging message.
const SEARCH_LOGGED_MESSAGE: &str = "Search logged";
/// Missing or blank search term message.
const TERM_REQUIRED_MESSAGE: &str = "Search term is required";
/// Search logging store failure message.
const SEARCH_FAILED_MESSAGE: &str = "Failed to log search";
/// History listing store failure message.
const HISTORY_FAILED_MESSAGE: &str = "Failed to retrieve history";

// ============================================================================
// SECTION: API Server
// ============================================================================

/// API server instance.
pub struct ApiServer {
    /// Address to bind when serving.
    bind: SocketAddr,
    /// Shared handler state.
    state: ApiState,
}

impl ApiServer {
    /// Builds a new API server from configuration, opening the history store.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when the configuration is invalid or the
    /// store or audit log cannot be opened.
    pub fn from_config(config: PokedexConfig) -> Result<Self, ApiServerError> {
        config.validate().map_err(|err| ApiServerError::Config(err.to_string()))?;
        let bind = config.server.bind_addr().map_err(|err| ApiServerError::Config(err.to_string()))?;
        let audit = build_audit_sink(&config.server.audit)?;
        let store = build_history_store(&config, audit.as_ref())?;
        let cors_origin =
            config.server.cors.enabled.then_some(config.server.cors.allowed_origin.trim());
        let state = ApiState::new(
            HistoryService::new(store),
            config.login.to_credentials(),
            audit,
        )
        .with_max_body_bytes(config.server.max_body_bytes)
        .with_log_search_terms(config.server.audit.log_search_terms)
        .with_cors_origin(cors_origin)?;
        Ok(Self {
            bind,
            state,
        })
    }

    /// Builds an API server from prepared handler state.
    #[must_use]
    pub const fn from_state(bind: SocketAddr, state: ApiState) -> Self {
        Self {
            bind,
            state,
        }
    }

    /// Returns the configured bind address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Returns the axum router for this server.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Binds the configured address and serves until the process exits.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ApiServerError> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when binding or serving fails.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<(), ApiServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.bind)
            .await
            .map_err(|err| ApiServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_on(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when the server fails.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ApiServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener
            .local_addr()
            .map_err(|err| ApiServerError::Transport(format!("http bind failed: {err}")))?;
        let audit = Arc::clone(&self.state.audit);
        audit.record_lifecycle(&LifecycleAuditEvent::new(
            "server_listening",
            Some(local.to_string()),
        ));
        let app = build_router(self.state);
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|err| ApiServerError::Transport(format!("http server failed: {err}")))?;
        audit.record_lifecycle(&LifecycleAuditEvent::new("server_stopped", None));
        Ok(())
    }
}

/// Builds the audit sink selected by configuration.
fn build_audit_sink(config: &ServerAuditConfig) -> Result<Arc<dyn ApiAuditSink>, ApiServerError> {
    if !config.enabled {
        return Ok(Arc::new(ApiNoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = ApiFileAuditSink::new(Path::new(path.trim()))
                .map_err(|err| ApiServerError::Init(format!("audit log open failed: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(ApiStderrAuditSink)),
    }
}

/// Builds the history store from configuration.
fn build_history_store(
    config: &PokedexConfig,
    audit: &dyn ApiAuditSink,
) -> Result<SharedHistoryStore, ApiServerError> {
    let (store, detail) = match config.history_store.store_type {
        HistoryStoreType::Memory => {
            (SharedHistoryStore::from_store(InMemoryHistoryStore::new()), "memory".to_string())
        }
        HistoryStoreType::Sqlite => {
            let store = SqliteHistoryStore::new(config.history_store.sqlite_store_config())
                .map_err(|err| ApiServerError::Init(err.to_string()))?;
            store.readiness().map_err(|err| ApiServerError::Init(err.to_string()))?;
            let detail = format!("sqlite:{}", store.path().display());
            (SharedHistoryStore::from_store(store), detail)
        }
    };
    audit.record_lifecycle(&LifecycleAuditEvent::new("history_store_ready", Some(detail)));
    Ok(store)
}

// ============================================================================
// SECTION: Handler State
// ============================================================================

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    /// History service over the shared store.
    history: HistoryService,
    /// Expected login credentials.
    credentials: Credentials,
    /// Audit sink for request and lifecycle events.
    audit: Arc<dyn ApiAuditSink>,
    /// Maximum accepted request body size.
    max_body_bytes: usize,
    /// `Access-Control-Allow-Origin` value; CORS is off when `None`.
    cors_origin: Option<HeaderValue>,
    /// Include search terms in audit events.
    log_search_terms: bool,
}

impl ApiState {
    /// Creates handler state with default limits and permissive CORS.
    #[must_use]
    pub fn new(
        history: HistoryService,
        credentials: Credentials,
        audit: Arc<dyn ApiAuditSink>,
    ) -> Self {
        Self {
            history,
            credentials,
            audit,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors_origin: Some(HeaderValue::from_static("*")),
            log_search_terms: true,
        }
    }

    /// Sets the maximum accepted request body size.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Sets whether search terms are copied into audit events.
    #[must_use]
    pub fn with_log_search_terms(mut self, enabled: bool) -> Self {
        self.log_search_terms = enabled;
        self
    }

    /// Sets the allowed CORS origin, or disables CORS with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError::Config`] when the origin is not a valid
    /// header value.
    pub fn with_cors_origin(mut self, origin: Option<&str>) -> Result<Self, ApiServerError> {
        self.cors_origin = origin
            .map(|value| {
                HeaderValue::from_str(value).map_err(|_| {
                    ApiServerError::Config(format!("invalid cors origin: {value}"))
                })
            })
            .transpose()?;
        Ok(self)
    }

    /// Records the audit event for a finished request and returns the response.
    fn finish(&self, audit: RequestAudit, result: Result<Response, ApiError>) -> Response {
        let (response, outcome, error_kind, error_detail) = match result {
            Ok(response) => (response, ApiOutcome::Success, None, None),
            Err(err) => {
                let outcome = if matches!(err, ApiError::AuthFailed) {
                    ApiOutcome::Rejected
                } else {
                    ApiOutcome::Error
                };
                let kind = err.kind();
                let detail = err.detail();
                (err.into_response(), outcome, Some(kind), detail)
            }
        };
        self.audit.record(&ApiAuditEvent::new(ApiAuditEventParams {
            route: audit.route,
            status: response.status().as_u16(),
            outcome,
            error_kind,
            error_detail,
            peer_ip: audit.peer_ip,
            request_bytes: audit.request_bytes,
            record_id: audit.record_id,
            username: audit.username,
            term: audit.term,
        }));
        response
    }
}

/// Per-request audit details gathered while handling.
struct RequestAudit {
    /// Route classification.
    route: ApiRoute,
    /// Peer IP address.
    peer_ip: Option<String>,
    /// Request body size in bytes.
    request_bytes: usize,
    /// Created record id.
    record_id: Option<i64>,
    /// Submitted username.
    username: Option<String>,
    /// Logged search term.
    term: Option<String>,
}

impl RequestAudit {
    /// Starts an audit record for a request from `peer`.
    fn new(route: ApiRoute, peer: SocketAddr, request_bytes: usize) -> Self {
        Self {
            route,
            peer_ip: Some(peer.ip().to_string()),
            request_bytes,
            record_id: None,
            username: None,
            term: None,
        }
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the API router over `state`.
#[must_use]
pub fn build_router(state: ApiState) -> Router {
    let cors_origin = state.cors_origin.clone();
    let router = Router::new()
        .route(LOGIN_PATH, post(handle_login))
        .route(SEARCH_PATH, post(handle_search))
        .route(HISTORY_PATH, get(handle_history))
        .fallback(handle_not_found)
        .method_not_allowed_fallback(handle_method_not_allowed)
        .with_state(Arc::new(state));
    match cors_origin {
        Some(origin) => router.layer(middleware::from_fn_with_state(origin, apply_cors)),
        None => router,
    }
}

/// Adds CORS headers to every response and answers preflight requests.
async fn apply_cors(State(origin): State<HeaderValue>, request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        insert_cors_headers(response.headers_mut(), origin);
        return response;
    }
    let mut response = next.run(request).await;
    insert_cors_headers(response.headers_mut(), origin);
    response
}

/// Writes the CORS response headers.
fn insert_cors_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers
        .insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, POST, OPTIONS"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `POST /api/login`.
async fn handle_login(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    bytes: Bytes,
) -> Response {
    let mut audit = RequestAudit::new(ApiRoute::Login, peer, bytes.len());
    let result = login(&state, &bytes, &mut audit);
    state.finish(audit, result)
}

/// Handles `POST /api/search`.
async fn handle_search(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    bytes: Bytes,
) -> Response {
    let mut audit = RequestAudit::new(ApiRoute::Search, peer, bytes.len());
    let result = log_search(&state, &bytes, &mut audit);
    state.finish(audit, result)
}

/// Handles `GET /api/history`.
async fn handle_history(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Response {
    let audit = RequestAudit::new(ApiRoute::History, peer, 0);
    let result = list_history(&state);
    state.finish(audit, result)
}

/// Handles a known path requested with the wrong method.
async fn handle_method_not_allowed(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> Response {
    let route = match uri.path() {
        LOGIN_PATH => ApiRoute::Login,
        SEARCH_PATH => ApiRoute::Search,
        HISTORY_PATH => ApiRoute::History,
        _ => ApiRoute::Unknown,
    };
    let audit = RequestAudit::new(route, peer, 0);
    state.finish(audit, Err(ApiError::MethodNotAllowed))
}

/// Handles any unmatched path.
async fn handle_not_found(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Response {
    let audit = RequestAudit::new(ApiRoute::Unknown, peer, 0);
    state.finish(audit, Err(ApiError::NotFound))
}

/// Checks submitted credentials.
fn login(state: &ApiState, bytes: &Bytes, audit: &mut RequestAudit) -> Result<Response, ApiError> {
    let body = parse_body(bytes, state.max_body_bytes)?;
    let username = body.get("username").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    audit.username = username.map(|name| name.chars().take(MAX_AUDIT_USERNAME_CHARS).collect());
    match (username, password) {
        (Some(username), Some(password)) if state.credentials.authenticate(username, password) => {
            Ok(message_response(StatusCode::OK, LOGIN_OK_MESSAGE))
        }
        _ => Err(ApiError::AuthFailed),
    }
}

/// Validates and records a search term.
fn log_search(
    state: &ApiState,
    bytes: &Bytes,
    audit: &mut RequestAudit,
) -> Result<Response, ApiError> {
    let body = parse_body(bytes, state.max_body_bytes)?;
    let raw = body
        .get("term")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::InvalidArgument(TERM_REQUIRED_MESSAGE.to_string()))?;
    let term = SearchTerm::parse(raw).map_err(|err| match err {
        TermError::Empty => ApiError::InvalidArgument(TERM_REQUIRED_MESSAGE.to_string()),
        TermError::TooLong {
            max_bytes, ..
        } => ApiError::InvalidArgument(format!("Search term must be at most {max_bytes} bytes")),
    })?;
    if state.log_search_terms {
        audit.term = Some(term.as_str().to_string());
    }
    let record = run_blocking(|| state.history.record(term.as_str()))
        .map_err(|err| history_error(err, SEARCH_FAILED_MESSAGE))?;
    audit.record_id = Some(record.id.get());
    let body = SearchLoggedBody {
        success: true,
        message: SEARCH_LOGGED_MESSAGE,
        id: record.id,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// Lists the newest history entries.
fn list_history(state: &ApiState) -> Result<Response, ApiError> {
    let records = run_blocking(|| state.history.recent(DEFAULT_HISTORY_LIMIT))
        .map_err(|err| history_error(err, HISTORY_FAILED_MESSAGE))?;
    let body = HistoryBody {
        success: true,
        history: records.iter().map(SearchRecord::to_entry).collect(),
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Runs a synchronous store call, shifting to a blocking context when available.
fn run_blocking<T>(operation: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(operation)
        }
        _ => operation(),
    }
}

/// Parses a request body, treating an empty body as no fields.
fn parse_body(bytes: &Bytes, max_body_bytes: usize) -> Result<Value, ApiError> {
    if bytes.len() > max_body_bytes {
        return Err(ApiError::PayloadTooLarge {
            max_bytes: max_body_bytes,
            actual_bytes: bytes.len(),
        });
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|_| ApiError::InvalidJson)
}

/// Maps a history service failure onto the API error taxonomy.
fn history_error(error: HistoryError, message: &'static str) -> ApiError {
    match error {
        HistoryError::InvalidArgument(detail) => ApiError::InvalidArgument(detail),
        HistoryError::StorageUnavailable(detail) => ApiError::StorageUnavailable {
            message,
            detail,
        },
    }
}

// ============================================================================
// SECTION: Response Bodies
// ============================================================================

/// Envelope carrying only a message.
#[derive(Debug, Serialize)]
struct MessageBody {
    /// Whether the request succeeded.
    success: bool,
    /// Human-readable message.
    message: String,
}

/// Body returned after a search is logged.
#[derive(Debug, Serialize)]
struct SearchLoggedBody {
    /// Always true.
    success: bool,
    /// Human-readable message.
    message: &'static str,
    /// Created record id.
    id: RecordId,
}

/// Body returned by the history listing.
#[derive(Debug, Serialize)]
struct HistoryBody {
    /// Always true.
    success: bool,
    /// Entries, newest first.
    history: Vec<HistoryEntry>,
}

/// Builds a message envelope response.
fn message_response(status: StatusCode, message: &str) -> Response {
    let body = MessageBody {
        success: status.is_success(),
        message: message.to_string(),
    };
    (status, Json(body)).into_response()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request-level API errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Caller input was rejected.
    #[error("{0}")]
    InvalidArgument(String),
    /// Body was not valid JSON.
    #[error("invalid json body")]
    InvalidJson,
    /// Credentials did not match.
    #[error("Invalid credentials")]
    AuthFailed,
    /// Body exceeded the configured limit.
    #[error("request body too large")]
    PayloadTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual body size in bytes.
        actual_bytes: usize,
    },
    /// No route matched.
    #[error("not found")]
    NotFound,
    /// The path exists but not for this method.
    #[error("method not allowed")]
    MethodNotAllowed,
    /// The history store failed.
    #[error("{message}")]
    StorageUnavailable {
        /// Public message returned to the caller.
        message: &'static str,
        /// Internal failure detail (audit only).
        detail: String,
    },
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) | Self::InvalidJson => StatusCode::BAD_REQUEST,
            Self::AuthFailed => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge {
                ..
            } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::StorageUnavailable {
                ..
            } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the normalized error kind label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InvalidJson => "invalid_json",
            Self::AuthFailed => "auth_failed",
            Self::PayloadTooLarge {
                ..
            } => "payload_too_large",
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::StorageUnavailable {
                ..
            } => "storage_unavailable",
        }
    }

    /// Returns internal detail suitable for audit logs.
    fn detail(&self) -> Option<String> {
        match self {
            Self::StorageUnavailable {
                detail, ..
            } => Some(detail.clone()),
            Self::PayloadTooLarge {
                max_bytes,
                actual_bytes,
            } => Some(format!("{actual_bytes} bytes (max {max_bytes})")),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = MessageBody {
            success: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// API server errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
