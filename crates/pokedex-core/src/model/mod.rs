// pokedex-core/src/model/mod.rs
// ============================================================================
// Module: Pokedex Domain Model
// Description: Canonical search record, term, timestamp, and credential types.
// Purpose: Provide stable, serializable types shared by the store and API.
// Dependencies: serde, subtle, time
// ============================================================================

//! ## Overview
//! Core types are the single source of truth for the wire and storage shape
//! of search records. Construction goes through validating constructors so
//! an empty term or a non-positive id can never exist in memory.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod credentials;
pub mod record;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use credentials::Credentials;
pub use credentials::DEFAULT_PASSWORD;
pub use credentials::DEFAULT_USERNAME;
pub use credentials::authenticate;
pub use record::HistoryEntry;
pub use record::MAX_TERM_BYTES;
pub use record::RecordId;
pub use record::SearchRecord;
pub use record::SearchTerm;
pub use record::TermError;
pub use time::RecordedAt;
