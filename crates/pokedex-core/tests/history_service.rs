// pokedex-core/tests/history_service.rs
// ============================================================================
// Module: History Service Tests
// Description: Validate record/recent behavior over the in-memory store.
// Purpose: Ensure ordering, limits, and error mapping hold for any input.
// Dependencies: pokedex-core, proptest
// ============================================================================

//! History service tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap for clarity."
)]

use pokedex_core::DEFAULT_HISTORY_LIMIT;
use pokedex_core::HistoryError;
use pokedex_core::HistoryService;
use pokedex_core::HistoryStore;
use pokedex_core::InMemoryHistoryStore;
use pokedex_core::MAX_HISTORY_LIMIT;
use pokedex_core::SearchRecord;
use pokedex_core::SearchTerm;
use pokedex_core::SharedHistoryStore;
use pokedex_core::StoreError;
use proptest::prelude::*;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn service() -> (HistoryService, InMemoryHistoryStore) {
    let store = InMemoryHistoryStore::new();
    let service = HistoryService::new(SharedHistoryStore::from_store(store.clone()));
    (service, store)
}

/// Store that fails every call.
struct FailingStore;

impl HistoryStore for FailingStore {
    fn append(&self, _term: &SearchTerm) -> Result<SearchRecord, StoreError> {
        Err(StoreError::Io("disk unplugged".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<SearchRecord>, StoreError> {
        Err(StoreError::Io("disk unplugged".to_string()))
    }
}

// ============================================================================
// SECTION: Record
// ============================================================================

#[test]
fn record_returns_created_record() {
    let (service, _) = service();
    let record = service.record("pikachu").unwrap();
    assert!(record.id.get() > 0);
    assert_eq!(record.term.as_str(), "pikachu");
}

#[test]
fn record_stores_trimmed_term() {
    let (service, _) = service();
    let record = service.record("  charmander  ").unwrap();
    assert_eq!(record.term.as_str(), "charmander");
}

#[test]
fn record_rejects_blank_terms_without_writing() {
    let (service, store) = service();
    for raw in ["", "   ", "\t"] {
        let err = service.record(raw).unwrap_err();
        assert!(matches!(err, HistoryError::InvalidArgument(_)), "{raw:?} -> {err:?}");
    }
    assert!(store.is_empty().unwrap());
}

#[test]
fn record_maps_store_failure() {
    let service = HistoryService::new(SharedHistoryStore::from_store(FailingStore));
    let err = service.record("mew").unwrap_err();
    assert!(matches!(err, HistoryError::StorageUnavailable(_)));
}

// ============================================================================
// SECTION: Recent
// ============================================================================

#[test]
fn recent_on_empty_store_is_empty() {
    let (service, _) = service();
    assert!(service.recent(DEFAULT_HISTORY_LIMIT).unwrap().is_empty());
}

#[test]
fn recent_rejects_out_of_range_limits() {
    let (service, _) = service();
    assert!(matches!(service.recent(0), Err(HistoryError::InvalidArgument(_))));
    assert!(matches!(
        service.recent(MAX_HISTORY_LIMIT + 1),
        Err(HistoryError::InvalidArgument(_))
    ));
    assert!(service.recent(MAX_HISTORY_LIMIT).is_ok());
}

#[test]
fn recent_maps_store_failure() {
    let service = HistoryService::new(SharedHistoryStore::from_store(FailingStore));
    let err = service.recent(DEFAULT_HISTORY_LIMIT).unwrap_err();
    assert!(matches!(err, HistoryError::StorageUnavailable(_)));
}

#[test]
fn repeated_reads_without_writes_are_identical() {
    let (service, _) = service();
    service.record("squirtle").unwrap();
    service.record("psyduck").unwrap();
    let first = service.recent(DEFAULT_HISTORY_LIMIT).unwrap();
    let second = service.recent(DEFAULT_HISTORY_LIMIT).unwrap();
    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn recent_returns_most_recent_terms_newest_first(
        terms in prop::collection::vec("[a-z]{1,12}", 0..45)
    ) {
        let (service, _) = service();
        for term in &terms {
            service.record(term).unwrap();
        }
        let recent = service.recent(DEFAULT_HISTORY_LIMIT).unwrap();
        prop_assert_eq!(recent.len(), terms.len().min(DEFAULT_HISTORY_LIMIT));

        let expected: Vec<&str> =
            terms.iter().rev().take(DEFAULT_HISTORY_LIMIT).map(String::as_str).collect();
        let actual: Vec<&str> = recent.iter().map(|record| record.term.as_str()).collect();
        prop_assert_eq!(actual, expected);

        for pair in recent.windows(2) {
            prop_assert!(pair[0].timestamp >= pair[1].timestamp);
            if pair[0].timestamp == pair[1].timestamp {
                prop_assert!(pair[0].id > pair[1].id);
            }
        }
    }
}
