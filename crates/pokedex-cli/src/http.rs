// pokedex-cli/src/http.rs
// ============================================================================
// Module: HTTP Helpers
// Description: Shared HTTP client construction and bounded body reads.
// Purpose: Apply one timeout, redirect, and size policy to every outbound call.
// Dependencies: reqwest
// ============================================================================

//! ## Overview
//! Both the backend client and the `PokeAPI` client build their
//! [`reqwest::Client`] here so every outbound call has a timeout and never
//! follows redirects. Response bodies are read chunk by chunk and rejected
//! as soon as they pass the configured byte limit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Client;
use reqwest::Url;
use reqwest::redirect::Policy;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Failures shared by the HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HttpError {
    /// Client construction or URL validation failed.
    Config(String),
    /// Request or body read failed.
    Transport(String),
    /// Body exceeded the byte limit.
    TooLarge {
        /// Bytes read so far.
        actual: usize,
        /// Maximum allowed bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds an HTTP client with a timeout and redirects disabled.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(timeout)
        .redirect(Policy::none())
        .build()
        .map_err(|err| HttpError::Config(err.to_string()))
}

/// Parses `raw` as an absolute `http` or `https` URL.
pub(crate) fn parse_http_url(raw: &str) -> Result<Url, HttpError> {
    let url = Url::parse(raw.trim()).map_err(|err| HttpError::Config(format!("{raw}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HttpError::Config(format!("unsupported url scheme: {other}"))),
    }
}

/// Reads a response body while enforcing a hard byte limit.
pub(crate) async fn read_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, HttpError> {
    let mut body = Vec::new();
    let mut total: usize = 0;
    while let Some(chunk) =
        response.chunk().await.map_err(|err| HttpError::Transport(err.to_string()))?
    {
        let next_total = total.checked_add(chunk.len()).ok_or(HttpError::TooLarge {
            actual: usize::MAX,
            limit,
        })?;
        if next_total > limit {
            return Err(HttpError::TooLarge {
                actual: next_total,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
        total = next_total;
    }
    Ok(body)
}
