// pokedex-core/src/interfaces/mod.rs
// ============================================================================
// Module: Pokedex Interfaces
// Description: Backend-agnostic persistence interface for search history.
// Purpose: Let the history service run over SQLite or in-memory stores.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`HistoryStore`] is the only seam between the history service and
//! persistence. Implementations assign record identifiers and timestamps
//! themselves and serialize concurrent writes internally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::model::SearchRecord;
use crate::model::SearchTerm;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// History store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("history store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("history store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("history store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store input or data is invalid.
    #[error("history store invalid data: {0}")]
    Invalid(String),
    /// Store engine reported an error.
    #[error("history store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: History Store
// ============================================================================

/// Persistence for search records.
pub trait HistoryStore {
    /// Appends a record for `term`, assigning its id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn append(&self, term: &SearchTerm) -> Result<SearchRecord, StoreError>;

    /// Returns up to `limit` records, newest timestamp first, ties by id descending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn recent(&self, limit: usize) -> Result<Vec<SearchRecord>, StoreError>;
}
