// pokedex-core/src/lib.rs
// ============================================================================
// Module: Pokedex Core Library
// Description: Public API surface for the Pokedex search log core.
// Purpose: Expose domain types, the store interface, and the history service.
// Dependencies: crate::{model, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Pokedex core owns the search-history domain: validated search terms,
//! store-assigned search records, the fixed credential check, and the
//! [`HistoryService`] that records and lists searches through any
//! [`HistoryStore`] backend. Transport and persistence crates build on these
//! types and never re-implement the validation rules.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod interfaces;
pub mod model;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use model::*;

pub use interfaces::HistoryStore;
pub use interfaces::StoreError;
pub use runtime::DEFAULT_HISTORY_LIMIT;
pub use runtime::HistoryError;
pub use runtime::HistoryService;
pub use runtime::InMemoryHistoryStore;
pub use runtime::MAX_HISTORY_LIMIT;
pub use runtime::SharedHistoryStore;
