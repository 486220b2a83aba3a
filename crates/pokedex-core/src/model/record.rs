// pokedex-core/src/model/record.rs
// ============================================================================
// Module: Search Records
// Description: Search terms, record identifiers, and persisted search records.
// Purpose: Enforce non-empty terms and store-assigned identity at the type level.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`SearchRecord`] is one logged search: a store-assigned [`RecordId`], a
//! validated [`SearchTerm`], and the store-assigned [`RecordedAt`] timestamp.
//! Records are created only by the store and never mutated afterwards, so the
//! types expose read accessors and no setters.
//!
//! ## Invariants
//! - [`SearchTerm`] is trimmed, non-empty, and at most [`MAX_TERM_BYTES`] bytes.
//! - [`RecordId`] is strictly positive.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use thiserror::Error;

use crate::model::time::RecordedAt;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted search term length in bytes (after trimming).
pub const MAX_TERM_BYTES: usize = 256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Search term validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    /// Term is empty or whitespace only.
    #[error("search term is required")]
    Empty,
    /// Term exceeds [`MAX_TERM_BYTES`].
    #[error("search term exceeds {max_bytes} bytes (got {actual_bytes})")]
    TooLong {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual term size in bytes.
        actual_bytes: usize,
    },
}

// ============================================================================
// SECTION: Search Term
// ============================================================================

/// Validated search term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Parses a raw term, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TermError`] when the trimmed term is empty or too long.
    pub fn parse(raw: &str) -> Result<Self, TermError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TermError::Empty);
        }
        if trimmed.len() > MAX_TERM_BYTES {
            return Err(TermError::TooLong {
                max_bytes: MAX_TERM_BYTES,
                actual_bytes: trimmed.len(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the term as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the term and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for SearchTerm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Record Identifier
// ============================================================================

/// Store-assigned search record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wraps a raw store identifier, rejecting zero and negative values.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        if raw > 0 { Some(Self(raw)) } else { None }
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Self::from_raw(raw).ok_or_else(|| serde::de::Error::custom("record id must be positive"))
    }
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// One logged search as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Logged search term.
    pub term: SearchTerm,
    /// Store-assigned insertion time.
    pub timestamp: RecordedAt,
}

impl SearchRecord {
    /// Returns the history projection of this record.
    #[must_use]
    pub fn to_entry(&self) -> HistoryEntry {
        HistoryEntry {
            term: self.term.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Wire projection of a record returned by the history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Logged search term.
    pub term: SearchTerm,
    /// Store-assigned insertion time.
    pub timestamp: RecordedAt,
}

impl From<SearchRecord> for HistoryEntry {
    fn from(record: SearchRecord) -> Self {
        Self {
            term: record.term,
            timestamp: record.timestamp,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
