// pokedex-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite History Store Unit Tests
// Description: Targeted tests for the SQLite history store.
// Purpose: Validate path safety, schema versioning, ordering, persistence,
//          and corruption detection.
// ============================================================================

//! ## Overview
//! Unit-level tests for `SQLite` history store invariants:
//! - Path safety checks (empty/overlong/directory rejection)
//! - Schema version validation
//! - Store-assigned ids and timestamps, newest-first listing
//! - Corrupt row detection
//! - Concurrent appends through a shared handle

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
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use pokedex_core::HistoryStore;
use pokedex_core::RecordedAt;
use pokedex_core::SearchTerm;
use pokedex_core::StoreError;
use pokedex_store_sqlite::SqliteHistoryStore;
use pokedex_store_sqlite::SqliteStoreConfig;
use pokedex_store_sqlite::SqliteStoreError;
use pokedex_store_sqlite::SqliteStoreMode;
use pokedex_store_sqlite::SqliteSyncMode;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const fn config_for_path(path: PathBuf) -> SqliteStoreConfig {
    SqliteStoreConfig {
        path,
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    }
}

fn store_for(path: &Path) -> SqliteHistoryStore {
    SqliteHistoryStore::new(config_for_path(path.to_path_buf())).expect("open store")
}

fn term(value: &str) -> SearchTerm {
    SearchTerm::parse(value).expect("valid term")
}

// ============================================================================
// SECTION: Path Safety
// ============================================================================

#[test]
fn sqlite_store_rejects_directory_path() {
    let temp = TempDir::new().unwrap();
    let result = SqliteHistoryStore::new(config_for_path(temp.path().to_path_buf()));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn sqlite_store_rejects_empty_path() {
    let result = SqliteHistoryStore::new(config_for_path(PathBuf::new()));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn sqlite_store_rejects_overlong_component() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a".repeat(300)).join("store.db");
    let result = SqliteHistoryStore::new(config_for_path(path));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn sqlite_store_creates_missing_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("dir").join("store.db");
    let store = store_for(&path);
    store.readiness().unwrap();
    assert!(path.exists());
    assert_eq!(store.path(), path.as_path());
}

// ============================================================================
// SECTION: Schema
// ============================================================================

#[test]
fn sqlite_store_rejects_unknown_schema_version() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");
    drop(store_for(&path));
    let conn = Connection::open(&path).unwrap();
    conn.execute("UPDATE store_meta SET version = ?1", params![99_i64]).unwrap();
    drop(conn);
    let result = SqliteHistoryStore::new(config_for_path(path));
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

#[test]
fn sqlite_store_rejects_unversioned_datetime_searches_table() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pokedex.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE searches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            term TEXT NOT NULL,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        INSERT INTO searches (term) VALUES ('pikachu');",
    )
    .unwrap();
    drop(conn);

    let result = SqliteHistoryStore::new(config_for_path(path.clone()));
    match result {
        Err(SqliteStoreError::VersionMismatch(message)) => {
            assert!(message.contains("timestamp DATETIME"), "message: {message}");
        }
        other => panic!("expected version mismatch, got {:?}", other.map(|_| ())),
    }

    let conn = Connection::open(&path).unwrap();
    let stamped: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'store_meta'",
            params![],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stamped, 0, "a rejected database must not be stamped");
    let rows: i64 =
        conn.query_row("SELECT COUNT(*) FROM searches", params![], |row| row.get(0)).unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn sqlite_store_adopts_unversioned_table_with_matching_columns() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE searches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            term TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        );
        INSERT INTO searches (term, timestamp) VALUES ('eevee', 1700000000000);",
    )
    .unwrap();
    drop(conn);

    let store = store_for(&path);
    store.append(&term("mew")).unwrap();
    let terms: Vec<String> =
        store.recent(20).unwrap().iter().map(|record| record.term.as_str().to_string()).collect();
    assert_eq!(terms, vec!["mew".to_string(), "eevee".to_string()]);
}

#[test]
fn sqlite_store_reopens_existing_database() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");
    let first = store_for(&path);
    first.append(&term("pikachu")).unwrap();
    drop(first);
    let reopened = store_for(&path);
    let records = reopened.recent(20).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].term.as_str(), "pikachu");
}

// ============================================================================
// SECTION: Append and Listing
// ============================================================================

#[test]
fn sqlite_store_assigns_id_and_timestamp() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    let before = RecordedAt::now().as_unix_millis();
    let record = store.append(&term("bulbasaur")).unwrap();
    let after = RecordedAt::now().as_unix_millis();
    assert!(record.id.get() > 0);
    assert_eq!(record.term.as_str(), "bulbasaur");
    let stamp = record.timestamp.as_unix_millis();
    assert!(stamp >= before - 1_000 && stamp <= after + 1_000, "timestamp {stamp} out of range");
}

#[test]
fn sqlite_store_empty_listing_is_empty() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    assert!(store.recent(20).unwrap().is_empty());
}

#[test]
fn sqlite_store_lists_newest_first_within_limit() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.db"));
    for index in 0 .. 25 {
        store.append(&term(&format!("mon-{index}"))).unwrap();
    }
    let records = store.recent(20).unwrap();
    assert_eq!(records.len(), 20);
    assert_eq!(records[0].term.as_str(), "mon-24");
    assert_eq!(records[19].term.as_str(), "mon-5");
    for pair in records.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
        if pair[0].timestamp == pair[1].timestamp {
            assert!(pair[0].id > pair[1].id);
        }
    }
}

#[test]
fn sqlite_store_orders_by_timestamp_before_id() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");
    let store = store_for(&path);
    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO searches (term, timestamp) VALUES (?1, ?2)",
        params!["late", 2_000_i64],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO searches (term, timestamp) VALUES (?1, ?2)",
        params!["early", 1_000_i64],
    )
    .unwrap();
    drop(conn);
    let terms: Vec<String> =
        store.recent(20).unwrap().into_iter().map(|record| record.term.into_inner()).collect();
    assert_eq!(terms, vec!["late".to_string(), "early".to_string()]);
}

// ============================================================================
// SECTION: Corruption
// ============================================================================

#[test]
fn sqlite_store_detects_empty_term_rows() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");
    let store = store_for(&path);
    let conn = Connection::open(&path).unwrap();
    conn.execute("INSERT INTO searches (term) VALUES (?1)", params!["   "]).unwrap();
    drop(conn);
    let err = store.recent(20).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)), "unexpected error: {err:?}");
}

#[test]
fn sqlite_store_detects_non_positive_ids() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");
    let store = store_for(&path);
    let conn = Connection::open(&path).unwrap();
    conn.execute("INSERT INTO searches (id, term) VALUES (?1, ?2)", params![-3_i64, "mew"])
        .unwrap();
    drop(conn);
    let err = store.recent(20).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)), "unexpected error: {err:?}");
}

// ============================================================================
// SECTION: Concurrency
// ============================================================================

#[test]
fn sqlite_store_concurrent_appends_get_unique_ids() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(store_for(&temp.path().join("store.db")));
    let mut handles = Vec::new();
    for worker in 0 .. 4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            (0 .. 10)
                .map(|index| store.append(&term(&format!("w{worker}-{index}"))).unwrap().id.get())
                .collect::<Vec<_>>()
        }));
    }
    let ids: BTreeSet<i64> =
        handles.into_iter().flat_map(|handle| handle.join().unwrap()).collect();
    assert_eq!(ids.len(), 40);
    assert_eq!(store.recent(100).unwrap().len(), 40);
}
