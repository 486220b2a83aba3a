// pokedex-cli/src/lib.rs
// ============================================================================
// Module: Pokedex CLI Library
// Description: Shared modules behind the `pokedex` binary.
// Purpose: Expose the message catalog, HTTP clients, and renderers for tests.
// Dependencies: reqwest, serde, tokio, pokedex-core
// ============================================================================

//! ## Overview
//! The `pokedex` binary is a thin dispatcher over these modules:
//! - [`backend_client`] calls the login, search, and history routes.
//! - [`pokeapi`] fetches roster and lookup data from `PokeAPI`.
//! - [`render`] formats cards and history lines.
//! - [`i18n`] holds every user-facing string.

pub mod backend_client;
mod http;
pub mod i18n;
pub mod pokeapi;
pub mod render;

pub use backend_client::BackendClient;
pub use backend_client::BackendClientConfig;
pub use backend_client::BackendClientError;
pub use backend_client::LoginOutcome;
pub use pokeapi::PokeApiClient;
pub use pokeapi::PokeApiConfig;
pub use pokeapi::PokeApiError;
pub use pokeapi::Pokemon;
pub use pokeapi::Roster;
