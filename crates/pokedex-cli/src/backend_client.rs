// pokedex-cli/src/backend_client.rs
// ============================================================================
// Module: Backend Client
// Description: HTTP client for the Pokedex login, search, and history routes.
// Purpose: Give CLI commands typed access to the search log backend.
// Dependencies: reqwest, serde, pokedex-core
// ============================================================================

//! ## Overview
//! [`BackendClient`] calls the three backend routes and decodes the
//! `{ success, ... }` envelope. A rejected login is a normal outcome
//! ([`LoginOutcome::Rejected`]), not an error. Every other non-success
//! status surfaces as [`BackendClientError::Status`] carrying the server
//! message when the body has one.
//!
//! Server responses are untrusted: bodies are size-limited and decoded
//! strictly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use pokedex_core::HistoryEntry;
use pokedex_core::RecordId;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::http::HttpError;
use crate::http::build_client;
use crate::http::parse_http_url;
use crate::http::read_body_with_limit;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Login route relative to the backend base URL.
const LOGIN_ROUTE: &str = "/api/login";
/// Search logging route relative to the backend base URL.
const SEARCH_ROUTE: &str = "/api/search";
/// History route relative to the backend base URL.
const HISTORY_ROUTE: &str = "/api/history";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct BackendClientConfig {
    /// Base URL of the backend (for example `http://localhost:3000`).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched; carries the server message.
    Accepted(String),
    /// Credentials did not match; carries the server message.
    Rejected(String),
}

/// Backend client errors.
#[derive(Debug, Error)]
pub enum BackendClientError {
    /// Configuration error.
    #[error("backend client config error: {0}")]
    Config(String),
    /// Transport error.
    #[error("backend transport error: {0}")]
    Transport(String),
    /// Response body could not be decoded.
    #[error("backend protocol error: {0}")]
    Protocol(String),
    /// Backend answered with an unexpected status.
    #[error("backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server message or body preview.
        message: String,
    },
    /// Response size exceeds limits.
    #[error("backend response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Actual size in bytes.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
}

impl From<HttpError> for BackendClientError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Config(message) => Self::Config(message),
            HttpError::Transport(message) => Self::Transport(message),
            HttpError::TooLarge {
                actual,
                limit,
            } => Self::ResponseTooLarge {
                actual,
                limit,
            },
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Login request body.
#[derive(Serialize)]
struct LoginRequest<'a> {
    /// Submitted username.
    username: &'a str,
    /// Submitted password.
    password: &'a str,
}

/// Search request body.
#[derive(Serialize)]
struct SearchRequest<'a> {
    /// Search term.
    term: &'a str,
}

/// Envelope carrying a message.
#[derive(Deserialize)]
struct MessageEnvelope {
    /// Server message.
    #[serde(default)]
    message: String,
}

/// Envelope returned after a search is logged.
#[derive(Deserialize)]
struct SearchLoggedEnvelope {
    /// Created record id.
    id: RecordId,
}

/// Envelope returned by the history route.
#[derive(Deserialize)]
struct HistoryEnvelope {
    /// Entries, newest first.
    history: Vec<HistoryEntry>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client for the Pokedex backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// Underlying HTTP client.
    client: Client,
    /// Base URL without a trailing slash.
    base_url: String,
    /// Maximum response body size in bytes.
    max_response_bytes: usize,
}

impl BackendClient {
    /// Builds a backend client.
    ///
    /// # Errors
    ///
    /// Returns [`BackendClientError::Config`] when the base URL is not an
    /// http(s) URL or the HTTP client cannot be constructed.
    pub fn new(config: BackendClientConfig) -> Result<Self, BackendClientError> {
        let url = parse_http_url(&config.base_url)?;
        let client = build_client(config.timeout)?;
        Ok(Self {
            client,
            base_url: url.as_str().trim_end_matches('/').to_string(),
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Returns the backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submits credentials to the login route.
    ///
    /// # Errors
    ///
    /// Returns [`BackendClientError`] when the request fails or the backend
    /// answers with a status other than 200 or 401.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, BackendClientError> {
        let (status, body) = self
            .post_json(LOGIN_ROUTE, &LoginRequest {
                username,
                password,
            })
            .await?;
        match status {
            StatusCode::OK => Ok(LoginOutcome::Accepted(decode::<MessageEnvelope>(&body)?.message)),
            StatusCode::UNAUTHORIZED => {
                Ok(LoginOutcome::Rejected(decode::<MessageEnvelope>(&body)?.message))
            }
            other => Err(status_error(other, &body)),
        }
    }

    /// Logs a search term and returns the created record id.
    ///
    /// # Errors
    ///
    /// Returns [`BackendClientError`] when the request fails or the backend
    /// rejects the term.
    pub async fn log_search(&self, term: &str) -> Result<RecordId, BackendClientError> {
        let (status, body) = self
            .post_json(SEARCH_ROUTE, &SearchRequest {
                term,
            })
            .await?;
        if status != StatusCode::CREATED {
            return Err(status_error(status, &body));
        }
        Ok(decode::<SearchLoggedEnvelope>(&body)?.id)
    }

    /// Fetches the newest history entries.
    ///
    /// # Errors
    ///
    /// Returns [`BackendClientError`] when the request fails or the backend
    /// reports a failure.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, BackendClientError> {
        let response = self
            .client
            .get(self.endpoint(HISTORY_ROUTE))
            .send()
            .await
            .map_err(|err| BackendClientError::Transport(err.to_string()))?;
        let status = response.status();
        let body = read_body_with_limit(response, self.max_response_bytes).await?;
        if status != StatusCode::OK {
            return Err(status_error(status, &body));
        }
        Ok(decode::<HistoryEnvelope>(&body)?.history)
    }

    /// Posts a JSON body and returns the status with the bounded body.
    async fn post_json<T: Serialize>(
        &self,
        route: &str,
        payload: &T,
    ) -> Result<(StatusCode, Vec<u8>), BackendClientError> {
        let bytes = serde_json::to_vec(payload)
            .map_err(|err| BackendClientError::Protocol(format!("request encoding failed: {err}")))?;
        let response = self
            .client
            .post(self.endpoint(route))
            .header(CONTENT_TYPE, "application/json")
            .body(bytes)
            .send()
            .await
            .map_err(|err| BackendClientError::Transport(err.to_string()))?;
        let status = response.status();
        let body = read_body_with_limit(response, self.max_response_bytes).await?;
        Ok((status, body))
    }

    /// Joins a route onto the base URL.
    fn endpoint(&self, route: &str) -> String {
        format!("{}{route}", self.base_url)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a JSON envelope.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, BackendClientError> {
    serde_json::from_slice(body)
        .map_err(|err| BackendClientError::Protocol(format!("invalid response body: {err}")))
}

/// Builds a status error using the envelope message when present.
fn status_error(status: StatusCode, body: &[u8]) -> BackendClientError {
    let message = serde_json::from_slice::<MessageEnvelope>(body)
        .ok()
        .map(|envelope| envelope.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
    BackendClientError::Status {
        status: status.as_u16(),
        message,
    }
}
