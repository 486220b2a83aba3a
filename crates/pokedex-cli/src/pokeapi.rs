// pokedex-cli/src/pokeapi.rs
// ============================================================================
// Module: PokeAPI Client
// Description: Roster listing and single Pokémon lookup against PokeAPI.
// Purpose: Fetch the data rendered by the roster and search commands.
// Dependencies: reqwest, serde, tokio
// ============================================================================

//! ## Overview
//! [`PokeApiClient`] talks to the public `PokeAPI` `pokemon` resource:
//! - [`PokeApiClient::lookup`] fetches `{base}/{name}`; `404` maps to
//!   [`PokeApiError::NotFound`], any other failure status to
//!   [`PokeApiError::Status`].
//! - [`PokeApiClient::roster`] fetches `{base}?limit=N`, then each entry's
//!   detail URL concurrently. Failed detail fetches are dropped and counted;
//!   the surviving Pokémon keep list order.
//!
//! Only the fields the CLI renders are decoded: name, types, and the
//! official artwork URL.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::http::HttpError;
use crate::http::build_client;
use crate::http::parse_http_url;
use crate::http::read_body_with_limit;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// `PokeAPI` client configuration.
#[derive(Debug, Clone)]
pub struct PokeApiConfig {
    /// Base URL of the `pokemon` resource.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
    /// Maximum concurrent detail fetches.
    pub concurrency: usize,
}

// ============================================================================
// SECTION: Data Model
// ============================================================================

/// One Pokémon as rendered by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pokemon {
    /// Pokémon name.
    pub name: String,
    /// Type slots in `PokeAPI` order.
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    /// Sprite URLs.
    #[serde(default)]
    pub sprites: Sprites,
}

impl Pokemon {
    /// Returns type names in slot order.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|slot| slot.kind.name.as_str()).collect()
    }

    /// Returns the official artwork URL when present.
    #[must_use]
    pub fn artwork_url(&self) -> Option<&str> {
        self.sprites.other.official_artwork.front_default.as_deref()
    }
}

/// Type slot entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeSlot {
    /// Referenced type.
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

/// Named `PokeAPI` resource reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedResource {
    /// Resource name.
    pub name: String,
}

/// Sprite collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Sprites {
    /// Alternative sprite sets.
    #[serde(default)]
    pub other: OtherSprites,
}

/// Alternative sprite sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OtherSprites {
    /// Official artwork sprite set.
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Artwork,
}

/// Official artwork sprite set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Artwork {
    /// Front-facing artwork URL.
    #[serde(default)]
    pub front_default: Option<String>,
}

/// Roster list entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    /// Pokémon name.
    pub name: String,
    /// Detail resource URL.
    pub url: String,
}

/// Roster list page.
#[derive(Deserialize)]
struct RosterPage {
    /// Listed entries.
    results: Vec<RosterEntry>,
}

/// Outcome of a roster fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    /// Pokémon whose details loaded, in list order.
    pub pokemon: Vec<Pokemon>,
    /// Number of entries whose details failed to load.
    pub skipped: usize,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `PokeAPI` client errors.
#[derive(Debug, Error)]
pub enum PokeApiError {
    /// Configuration error.
    #[error("pokeapi client config error: {0}")]
    Config(String),
    /// Lookup returned 404.
    #[error("Pokemon not found: {0}")]
    NotFound(String),
    /// Any other failure status.
    #[error("API error: {0}")]
    Status(u16),
    /// Transport error.
    #[error("pokeapi transport error: {0}")]
    Transport(String),
    /// Response body could not be decoded.
    #[error("pokeapi protocol error: {0}")]
    Protocol(String),
    /// Response size exceeds limits.
    #[error("pokeapi response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Actual size in bytes.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
}

impl From<HttpError> for PokeApiError {
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
// SECTION: Client
// ============================================================================

/// HTTP client for the `PokeAPI` `pokemon` resource.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    /// Underlying HTTP client.
    client: Client,
    /// Base URL of the `pokemon` resource.
    base_url: Url,
    /// Maximum response body size in bytes.
    max_response_bytes: usize,
    /// Maximum concurrent detail fetches.
    concurrency: usize,
}

impl PokeApiClient {
    /// Builds a `PokeAPI` client.
    ///
    /// # Errors
    ///
    /// Returns [`PokeApiError::Config`] when the base URL is not an http(s)
    /// URL with a path, or the HTTP client cannot be constructed.
    pub fn new(config: PokeApiConfig) -> Result<Self, PokeApiError> {
        let base_url = parse_http_url(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(PokeApiError::Config(format!("not a base url: {base_url}")));
        }
        let client = build_client(config.timeout)?;
        Ok(Self {
            client,
            base_url,
            max_response_bytes: config.max_response_bytes,
            concurrency: config.concurrency.max(1),
        })
    }

    /// Looks up one Pokémon by name.
    ///
    /// # Errors
    ///
    /// Returns [`PokeApiError::NotFound`] on `404`, [`PokeApiError::Status`]
    /// on any other failure status, and transport or decode errors otherwise.
    pub async fn lookup(&self, name: &str) -> Result<Pokemon, PokeApiError> {
        if name.is_empty() {
            return Err(PokeApiError::Config("pokemon name must be non-empty".to_string()));
        }
        let url = self.detail_url(name)?;
        match self.get_json::<Pokemon>(url).await {
            Err(PokeApiError::Status(404)) => Err(PokeApiError::NotFound(name.to_string())),
            other => other,
        }
    }

    /// Lists the first `limit` roster entries.
    ///
    /// # Errors
    ///
    /// Returns [`PokeApiError`] when the list request fails.
    pub async fn list(&self, limit: u32) -> Result<Vec<RosterEntry>, PokeApiError> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().clear().append_pair("limit", &limit.to_string());
        Ok(self.get_json::<RosterPage>(url).await?.results)
    }

    /// Fetches the roster and each entry's details.
    ///
    /// # Errors
    ///
    /// Returns [`PokeApiError`] only when the list request fails; failed
    /// detail fetches are counted in [`Roster::skipped`].
    pub async fn roster(&self, limit: u32) -> Result<Roster, PokeApiError> {
        let entries = self.list(limit).await?;
        let total = entries.len();
        let mut slots: Vec<Option<Pokemon>> = vec![None; total];
        let mut joins = JoinSet::new();
        for (index, entry) in entries.into_iter().enumerate() {
            if joins.len() >= self.concurrency
                && let Some(joined) = joins.join_next().await
            {
                store_detail(&mut slots, joined);
            }
            let client = self.clone();
            joins.spawn(async move {
                let detail = match parse_http_url(&entry.url) {
                    Ok(url) => client.get_json::<Pokemon>(url).await.ok(),
                    Err(_) => None,
                };
                (index, detail)
            });
        }
        while let Some(joined) = joins.join_next().await {
            store_detail(&mut slots, joined);
        }
        let pokemon: Vec<Pokemon> = slots.into_iter().flatten().collect();
        Ok(Roster {
            skipped: total - pokemon.len(),
            pokemon,
        })
    }

    /// Builds `{base}/{name}` with the name as one escaped path segment.
    fn detail_url(&self, name: &str) -> Result<Url, PokeApiError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| PokeApiError::Config(format!("not a base url: {}", self.base_url)))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    /// Fetches and decodes a JSON resource.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, PokeApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| PokeApiError::Transport(err.to_string()))?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(PokeApiError::Status(status.as_u16()));
        }
        let body = read_body_with_limit(response, self.max_response_bytes).await?;
        serde_json::from_slice(&body)
            .map_err(|err| PokeApiError::Protocol(format!("invalid response body: {err}")))
    }
}

/// Places a joined detail fetch into its list slot.
fn store_detail(
    slots: &mut [Option<Pokemon>],
    joined: Result<(usize, Option<Pokemon>), tokio::task::JoinError>,
) {
    if let Ok((index, Some(pokemon))) = joined
        && let Some(slot) = slots.get_mut(index)
    {
        *slot = Some(pokemon);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
