// pokedex-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `pokedex config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for Pokedex configuration. The output is deterministic
//! and spells out every default so it doubles as a reference.

/// Returns a canonical example `pokedex.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:3000"
max_body_bytes = 65536

[server.cors]
enabled = true
allowed_origin = "*"

[server.audit]
enabled = true
# path = "pokedex-audit.jsonl"
log_search_terms = true

[history_store]
type = "sqlite"
path = "pokedex.db"
journal_mode = "wal"
sync_mode = "full"
busy_timeout_ms = 5000

[login]
username = "admin"
password = "12345"

[client]
backend_url = "http://localhost:3000"
pokeapi_url = "https://pokeapi.co/api/v2/pokemon"
roster_limit = 151
timeout_ms = 10000
max_response_bytes = 2097152
concurrency = 16
"#,
    )
}
