// pokedex-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite History Store
// Description: Durable HistoryStore backend using SQLite.
// Purpose: Persist search records in a single `searches` table.
// Dependencies: pokedex-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`pokedex_core::HistoryStore`]. The
//! database assigns record ids and insertion timestamps, so callers never
//! supply either. Rows read back are validated and fail closed on corruption.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteHistoryStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
