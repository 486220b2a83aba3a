// pokedex-core/src/runtime/history.rs
// ============================================================================
// Module: History Service
// Description: Records search terms and lists recent searches.
// Purpose: Validate inputs and map store failures onto the service taxonomy.
// Dependencies: crate::{interfaces, model, runtime::store}, thiserror
// ============================================================================

//! ## Overview
//! [`HistoryService`] is the only writer and reader of search history. It
//! validates terms before they reach the store, bounds listing size, and
//! reports every store failure as [`HistoryError::StorageUnavailable`]
//! without retrying. The service holds no cache; every call reaches the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::interfaces::HistoryStore;
use crate::model::SearchRecord;
use crate::model::SearchTerm;
use crate::runtime::store::SharedHistoryStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of records returned by [`HistoryService::recent`] callers.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Largest accepted listing size.
pub const MAX_HISTORY_LIMIT: usize = 1000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// History service errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Caller input was rejected before reaching the store.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The store failed; the operation was not applied.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Search history service over a shared store.
#[derive(Clone)]
pub struct HistoryService {
    /// Backing store.
    store: SharedHistoryStore,
}

impl HistoryService {
    /// Creates a service over the provided store.
    #[must_use]
    pub const fn new(store: SharedHistoryStore) -> Self {
        Self {
            store,
        }
    }

    /// Records a search term and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidArgument`] when the trimmed term is empty
    /// or too long, and [`HistoryError::StorageUnavailable`] when the insert fails.
    pub fn record(&self, raw_term: &str) -> Result<SearchRecord, HistoryError> {
        let term =
            SearchTerm::parse(raw_term).map_err(|err| HistoryError::InvalidArgument(err.to_string()))?;
        self.store.append(&term).map_err(|err| HistoryError::StorageUnavailable(err.to_string()))
    }

    /// Returns up to `limit` records, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidArgument`] when `limit` is zero or above
    /// [`MAX_HISTORY_LIMIT`], and [`HistoryError::StorageUnavailable`] when the
    /// query fails.
    pub fn recent(&self, limit: usize) -> Result<Vec<SearchRecord>, HistoryError> {
        if limit == 0 || limit > MAX_HISTORY_LIMIT {
            return Err(HistoryError::InvalidArgument(format!(
                "history limit must be between 1 and {MAX_HISTORY_LIMIT}"
            )));
        }
        self.store.recent(limit).map_err(|err| HistoryError::StorageUnavailable(err.to_string()))
    }
}
