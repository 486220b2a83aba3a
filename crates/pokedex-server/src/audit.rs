// pokedex-server/src/audit.rs
// ============================================================================
// Module: API Audit Logging
// Description: Structured audit events for API request handling.
// Purpose: Emit JSON-lines request and lifecycle logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for API request logging.
//! Each event serializes to one JSON object per line. Passwords are never
//! part of any event; search terms are included only when the server is
//! configured to log them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// API route classification for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiRoute {
    /// `POST /api/login`.
    Login,
    /// `POST /api/search`.
    Search,
    /// `GET /api/history`.
    History,
    /// Any unmatched path.
    Unknown,
}

/// Request outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiOutcome {
    /// Request completed successfully.
    Success,
    /// Request was a normal negative result (failed login).
    Rejected,
    /// Request failed.
    Error,
}

/// API request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ApiAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Route classification.
    pub route: ApiRoute,
    /// HTTP status returned.
    pub status: u16,
    /// Request outcome.
    pub outcome: ApiOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Internal error detail (never returned to the caller).
    pub error_detail: Option<String>,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Created record id (search only).
    pub record_id: Option<i64>,
    /// Submitted username (login only).
    pub username: Option<String>,
    /// Logged search term (search only, when enabled).
    pub term: Option<String>,
}

/// Inputs required to construct a request audit event.
pub struct ApiAuditEventParams {
    /// Route classification.
    pub route: ApiRoute,
    /// HTTP status returned.
    pub status: u16,
    /// Request outcome.
    pub outcome: ApiOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Internal error detail.
    pub error_detail: Option<String>,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Created record id.
    pub record_id: Option<i64>,
    /// Submitted username.
    pub username: Option<String>,
    /// Logged search term.
    pub term: Option<String>,
}

/// Server lifecycle audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Lifecycle stage label.
    pub kind: &'static str,
    /// Optional detail (address, store location).
    pub detail: Option<String>,
}

impl ApiAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ApiAuditEventParams) -> Self {
        Self {
            event: "api_request",
            timestamp_ms: now_ms(),
            route: params.route,
            status: params.status,
            outcome: params.outcome,
            error_kind: params.error_kind,
            error_detail: params.error_detail,
            peer_ip: params.peer_ip,
            request_bytes: params.request_bytes,
            record_id: params.record_id,
            username: params.username,
            term: params.term,
        }
    }
}

impl LifecycleAuditEvent {
    /// Creates a new lifecycle event with a consistent timestamp.
    #[must_use]
    pub fn new(kind: &'static str, detail: Option<String>) -> Self {
        Self {
            event: "lifecycle",
            timestamp_ms: now_ms(),
            kind,
            detail,
        }
    }
}

/// Returns the current time in milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for API events.
pub trait ApiAuditSink: Send + Sync {
    /// Record a request audit event.
    fn record(&self, event: &ApiAuditEvent);

    /// Record a lifecycle audit event.
    fn record_lifecycle(&self, _event: &LifecycleAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct ApiStderrAuditSink;

impl ApiAuditSink for ApiStderrAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_lifecycle(&self, event: &LifecycleAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct ApiFileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl ApiFileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Serializes `event` and appends it as one line.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl ApiAuditSink for ApiFileAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        self.append(event);
    }

    fn record_lifecycle(&self, event: &LifecycleAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct ApiNoopAuditSink;

impl ApiAuditSink for ApiNoopAuditSink {
    fn record(&self, _event: &ApiAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
