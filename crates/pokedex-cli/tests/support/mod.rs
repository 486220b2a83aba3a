// pokedex-cli/tests/support/mod.rs
// ============================================================================
// Module: CLI Test Support
// Description: Local PokeAPI stub and in-process backend for client tests.
// Purpose: Run client code against real HTTP servers without network access.
// Dependencies: axum, pokedex-server, tokio
// ============================================================================

//! ## Overview
//! [`spawn_pokeapi_stub`] serves a small fixed roster under
//! `/api/v2/pokemon` with one entry whose detail fetch fails (`boom`) and one
//! name that redirects. [`spawn_backend`] runs the real API over an
//! in-memory store.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared helpers; not every test binary uses every helper."
)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use pokedex_core::Credentials;
use pokedex_core::HistoryService;
use pokedex_core::InMemoryHistoryStore;
use pokedex_core::SharedHistoryStore;
use pokedex_server::ApiNoopAuditSink;
use pokedex_server::ApiServer;
use pokedex_server::ApiState;
use serde_json::Value;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// ============================================================================
// SECTION: PokeAPI Stub
// ============================================================================

/// Roster served by the stub, in list order.
pub const STUB_ROSTER: &[&str] = &["bulbasaur", "ivysaur", "boom", "charmander", "pikachu"];

/// Running `PokeAPI` stub.
pub struct PokeApiStub {
    /// Base URL of the stub `pokemon` resource.
    pub base_url: String,
    /// Server task.
    handle: JoinHandle<()>,
}

impl Drop for PokeApiStub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Starts the `PokeAPI` stub on an ephemeral port.
pub async fn spawn_pokeapi_stub() -> PokeApiStub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}/api/v2/pokemon");
    let app = Router::new()
        .route("/api/v2/pokemon", get(list_pokemon))
        .route("/api/v2/pokemon/{name}", get(pokemon_detail))
        .route("/api/v2/pokemon/{name}/", get(pokemon_detail))
        .with_state(Arc::new(base_url.clone()));
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    PokeApiStub {
        base_url,
        handle,
    }
}

/// Serves `?limit=N` roster pages.
async fn list_pokemon(
    State(base_url): State<Arc<String>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let limit = query.get("limit").and_then(|raw| raw.parse::<usize>().ok()).unwrap_or(20);
    let results: Vec<Value> = STUB_ROSTER
        .iter()
        .take(limit)
        .map(|name| json!({"name": name, "url": format!("{base_url}/{name}/")}))
        .collect();
    Json(json!({"count": STUB_ROSTER.len(), "results": results}))
}

/// Serves one Pokémon, a failure, a redirect, or 404.
async fn pokemon_detail(Path(name): Path<String>) -> Response {
    match name.as_str() {
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream failure").into_response(),
        "eevee" => {
            (StatusCode::FOUND, [(header::LOCATION, "/api/v2/pokemon/pikachu")]).into_response()
        }
        "huge" => Json(json!({"name": "huge", "padding": "x".repeat(4096)})).into_response(),
        known if STUB_ROSTER.contains(&known) => Json(pokemon_json(known)).into_response(),
        _ => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Builds a `PokeAPI`-shaped detail document.
fn pokemon_json(name: &str) -> Value {
    let kind = match name {
        "charmander" => "fire",
        "pikachu" => "electric",
        _ => "grass",
    };
    json!({
        "id": 1,
        "name": name,
        "types": [{"slot": 1, "type": {"name": kind, "url": "https://pokeapi.co/api/v2/type/1/"}}],
        "sprites": {
            "front_default": null,
            "other": {"official-artwork": {"front_default": format!("https://img.example/{name}.png")}}
        }
    })
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// Running backend API.
pub struct Backend {
    /// Base URL of the backend.
    pub base_url: String,
    /// Server task.
    handle: JoinHandle<()>,
}

impl Drop for Backend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Starts the real API over an in-memory store on an ephemeral port.
pub async fn spawn_backend() -> Backend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let state = ApiState::new(
        HistoryService::new(SharedHistoryStore::from_store(InMemoryHistoryStore::new())),
        Credentials::default(),
        Arc::new(ApiNoopAuditSink),
    );
    let server = ApiServer::from_state(addr, state);
    let handle = tokio::spawn(async move {
        server.serve_on(listener, std::future::pending()).await.unwrap();
    });
    Backend {
        base_url: format!("http://{addr}"),
        handle,
    }
}

/// Returns a loopback URL with nothing listening on it.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
