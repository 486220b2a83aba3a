// pokedex-core/src/runtime/store.rs
// ============================================================================
// Module: Pokedex In-Memory Store
// Description: In-memory history store and shared store wrapper.
// Purpose: Provide a dependency-free store for tests and `type = "memory"`.
// Dependencies: crate::{interfaces, model}
// ============================================================================

//! ## Overview
//! [`InMemoryHistoryStore`] mirrors the SQLite store contract without any
//! external dependency. Timestamps are clamped to be non-decreasing with the
//! assigned id so listings stay stable if the wall clock steps backwards.
//! [`SharedHistoryStore`] wraps any store behind an `Arc` trait object so a
//! single handle can be cloned into every request handler.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use crate::interfaces::HistoryStore;
use crate::interfaces::StoreError;
use crate::model::RecordId;
use crate::model::RecordedAt;
use crate::model::SearchRecord;
use crate::model::SearchTerm;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Mutable state guarded by the in-memory store mutex.
#[derive(Debug, Default)]
struct MemoryState {
    /// Records in insertion order.
    records: Vec<SearchRecord>,
    /// Last identifier handed out.
    last_id: i64,
}

/// In-memory history store for tests and local demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryHistoryStore {
    /// Record log protected by a mutex.
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryHistoryStore {
    /// Creates an empty in-memory history store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the mutex is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        let guard = self.lock()?;
        Ok(guard.records.len())
    }

    /// Returns true when no records are stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Acquires the state lock.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Store("history store mutex poisoned".to_string()))
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(&self, term: &SearchTerm) -> Result<SearchRecord, StoreError> {
        let mut guard = self.lock()?;
        let next = guard
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Store("record id space exhausted".to_string()))?;
        let id = RecordId::from_raw(next)
            .ok_or_else(|| StoreError::Invalid(format!("invalid record id {next}")))?;
        let now = RecordedAt::now();
        let timestamp = guard
            .records
            .last()
            .map_or(now, |last| now.max(last.timestamp));
        let record = SearchRecord {
            id,
            term: term.clone(),
            timestamp,
        };
        guard.last_id = next;
        guard.records.push(record.clone());
        drop(guard);
        Ok(record)
    }

    fn recent(&self, limit: usize) -> Result<Vec<SearchRecord>, StoreError> {
        // `append` keeps the log sorted by (timestamp, id).
        let guard = self.lock()?;
        Ok(guard.records.iter().rev().take(limit).cloned().collect())
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared history store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedHistoryStore {
    /// Inner store implementation.
    inner: Arc<dyn HistoryStore + Send + Sync>,
}

impl SharedHistoryStore {
    /// Wraps a history store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl HistoryStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn HistoryStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl HistoryStore for SharedHistoryStore {
    fn append(&self, term: &SearchTerm) -> Result<SearchRecord, StoreError> {
        self.inner.append(term)
    }

    fn recent(&self, limit: usize) -> Result<Vec<SearchRecord>, StoreError> {
        self.inner.recent(limit)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
