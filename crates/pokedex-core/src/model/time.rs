// pokedex-core/src/model/time.rs
// ============================================================================
// Module: Record Timestamps
// Description: Store-assigned insertion time for search records.
// Purpose: Keep a totally ordered millisecond clock value with an RFC 3339 wire form.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! [`RecordedAt`] stores unix epoch milliseconds so ordering is a plain
//! integer comparison inside the store, and renders as an RFC 3339 UTC
//! string on the wire so browser and CLI clients can parse it directly.
//!
//! ## Invariants
//! - Values are assigned by the store at insert time, never by callers.
//! - No monotonicity is enforced; concurrent inserts may share a value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Insertion time of a search record in unix epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordedAt(i64);

impl RecordedAt {
    /// Wraps a unix epoch millisecond value.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        Self(i64::try_from(millis).unwrap_or(i64::MAX))
    }

    /// Returns the value as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Formats the value as an RFC 3339 UTC string.
    ///
    /// # Errors
    ///
    /// Returns a message when the value is outside the representable date range.
    pub fn to_rfc3339(self) -> Result<String, String> {
        let nanos = i128::from(self.0) * 1_000_000;
        let datetime =
            OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|err| err.to_string())?;
        datetime.format(&Rfc3339).map_err(|err| err.to_string())
    }

    /// Parses an RFC 3339 string, truncating to millisecond precision.
    ///
    /// # Errors
    ///
    /// Returns a message when the string is not RFC 3339 or out of range.
    pub fn parse_rfc3339(value: &str) -> Result<Self, String> {
        let datetime = OffsetDateTime::parse(value, &Rfc3339).map_err(|err| err.to_string())?;
        let millis = datetime.unix_timestamp_nanos() / 1_000_000;
        i64::try_from(millis).map(Self).map_err(|_| "timestamp out of range".to_string())
    }
}

impl fmt::Display for RecordedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}ms", self.0),
        }
    }
}

impl Serialize for RecordedAt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = self.to_rfc3339().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for RecordedAt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse_rfc3339(&text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
