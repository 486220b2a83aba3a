// pokedex-core/src/runtime/mod.rs
// ============================================================================
// Module: Pokedex Runtime
// Description: History service and reference store implementations.
// Purpose: Run the record/recent operations over any history store.
// Dependencies: crate::{interfaces, model}
// ============================================================================

//! ## Overview
//! The runtime holds the [`HistoryService`] plus the in-memory and shared
//! store wrappers used by tests, demos, and the server bootstrap.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod history;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use history::DEFAULT_HISTORY_LIMIT;
pub use history::HistoryError;
pub use history::HistoryService;
pub use history::MAX_HISTORY_LIMIT;
pub use store::InMemoryHistoryStore;
pub use store::SharedHistoryStore;
