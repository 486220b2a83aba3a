// pokedex-cli/tests/pokeapi_client.rs
// ============================================================================
// Module: PokeAPI Client Tests
// Description: Lookup and roster behavior against a local PokeAPI stub.
// Purpose: Pin not-found mapping, dropped detail failures, and list order.
// Dependencies: pokedex-cli, axum, tokio
// ============================================================================

//! ## Overview
//! Drives [`PokeApiClient`] against the stub in `support`, which serves a
//! five-entry roster where `boom` always fails its detail fetch.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use pokedex_cli::PokeApiClient;
use pokedex_cli::PokeApiConfig;
use pokedex_cli::PokeApiError;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn client(base_url: &str, concurrency: usize) -> PokeApiClient {
    PokeApiClient::new(PokeApiConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        max_response_bytes: 1024,
        concurrency,
    })
    .unwrap()
}

fn names(roster: &pokedex_cli::Roster) -> Vec<&str> {
    roster.pokemon.iter().map(|pokemon| pokemon.name.as_str()).collect()
}

// ============================================================================
// SECTION: Lookup
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn lookup_returns_rendered_fields() {
    let stub = support::spawn_pokeapi_stub().await;
    let pokemon = client(&stub.base_url, 4).lookup("pikachu").await.unwrap();
    assert_eq!(pokemon.name, "pikachu");
    assert_eq!(pokemon.type_names(), vec!["electric"]);
    assert_eq!(pokemon.artwork_url(), Some("https://img.example/pikachu.png"));
}

#[tokio::test(flavor = "multi_thread")]
async fn lookup_maps_404_to_not_found() {
    let stub = support::spawn_pokeapi_stub().await;
    let err = client(&stub.base_url, 4).lookup("missingno").await.unwrap_err();
    match err {
        PokeApiError::NotFound(name) => assert_eq!(name, "missingno"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn lookup_maps_other_failures_to_status() {
    let stub = support::spawn_pokeapi_stub().await;
    let err = client(&stub.base_url, 4).lookup("boom").await.unwrap_err();
    assert!(matches!(err, PokeApiError::Status(500)), "got {err:?}");
    assert_eq!(err.to_string(), "API error: 500");
}

#[tokio::test(flavor = "multi_thread")]
async fn lookup_does_not_follow_redirects() {
    let stub = support::spawn_pokeapi_stub().await;
    let err = client(&stub.base_url, 4).lookup("eevee").await.unwrap_err();
    assert!(matches!(err, PokeApiError::Status(302)), "got {err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn lookup_enforces_response_size_limit() {
    let stub = support::spawn_pokeapi_stub().await;
    let err = client(&stub.base_url, 4).lookup("huge").await.unwrap_err();
    assert!(matches!(err, PokeApiError::ResponseTooLarge { .. }), "got {err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn lookup_reports_transport_failure() {
    let base = format!("{}/api/v2/pokemon", support::closed_port_url().await);
    let err = client(&base, 4).lookup("pikachu").await.unwrap_err();
    assert!(matches!(err, PokeApiError::Transport(_)), "got {err:?}");
}

// ============================================================================
// SECTION: Roster
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn list_honors_limit() {
    let stub = support::spawn_pokeapi_stub().await;
    let entries = client(&stub.base_url, 4).list(2).await.unwrap();
    let listed: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(listed, vec!["bulbasaur", "ivysaur"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn roster_drops_failed_details_and_keeps_order() {
    let stub = support::spawn_pokeapi_stub().await;
    let roster = client(&stub.base_url, 4).roster(5).await.unwrap();
    assert_eq!(names(&roster), vec!["bulbasaur", "ivysaur", "charmander", "pikachu"]);
    assert_eq!(roster.skipped, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn roster_order_is_stable_with_serial_fetches() {
    let stub = support::spawn_pokeapi_stub().await;
    let serial = client(&stub.base_url, 1).roster(5).await.unwrap();
    let parallel = client(&stub.base_url, 16).roster(5).await.unwrap();
    assert_eq!(serial, parallel);
}

#[tokio::test(flavor = "multi_thread")]
async fn roster_fails_when_list_is_unreachable() {
    let base = format!("{}/api/v2/pokemon", support::closed_port_url().await);
    let err = client(&base, 4).roster(3).await.unwrap_err();
    assert!(matches!(err, PokeApiError::Transport(_)), "got {err:?}");
}
