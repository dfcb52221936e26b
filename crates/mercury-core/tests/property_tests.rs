//! # Property-Based Tests
//!
//! Invariants of the normalizer, the validation rules and the cache guard,
//! checked with proptest.

use mercury_core::validation::{max_count_validation, min_count_validation};
use mercury_core::{
    CacheEntry, CacheKey, CacheStore, Dispatch, dispatch_if_needed, normalize_resource,
};
use proptest::collection::vec;
use proptest::prelude::*;
use serde_json::{Map, Value as JsonValue, json};
use std::cell::Cell;

// =============================================================================
// STRATEGIES
// =============================================================================

/// A single JSON-LD value object, literal or reference.
fn value_object() -> impl Strategy<Value = JsonValue> {
    prop_oneof![
        "[a-z]{0,8}".prop_map(|v| json!({"@value": v})),
        (0u64..1000).prop_map(|v| json!({"@value": v})),
        "[a-z]{1,8}".prop_map(|id| json!({"@id": format!("http://example.com/{id}")})),
    ]
}

/// A node with predicates under a fixed namespace, some possibly empty.
fn node() -> impl Strategy<Value = Map<String, JsonValue>> {
    vec(("[a-z]{1,6}", vec(value_object(), 0..4)), 0..6).prop_map(|predicates| {
        let mut node = Map::new();
        for (name, values) in predicates {
            node.insert(
                format!("http://example.com/ns#{name}"),
                JsonValue::Array(values),
            );
        }
        node
    })
}

fn unwrap(value: &JsonValue) -> JsonValue {
    value
        .get("@value")
        .or_else(|| value.get("@id"))
        .cloned()
        .unwrap_or(JsonValue::Null)
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Plain `@id` and `@type` values pass through untouched.
    #[test]
    fn keywords_pass_through(id in "[a-z]{1,10}", types in vec("[a-z]{1,10}", 0..4)) {
        let mut input = Map::new();
        input.insert("@id".into(), json!(format!("http://example.com/{id}")));
        input.insert("@type".into(), json!(types));

        let normalized = normalize_resource(&input);
        prop_assert_eq!(normalized.get("@id"), input.get("@id"));
        prop_assert_eq!(normalized.get("@type"), input.get("@type"));
    }

    /// Every non-empty predicate appears under its local name with its values
    /// unwrapped in order; empty predicates never appear.
    #[test]
    fn predicates_are_localized_and_unwrapped(input in node()) {
        let normalized = normalize_resource(&input);

        for (key, values) in &input {
            let local = key.rsplit('#').next().unwrap_or(key);
            let values = values.as_array().cloned().unwrap_or_default();
            if values.is_empty() {
                prop_assert!(!normalized.contains_key(local));
            } else {
                let expected: Vec<JsonValue> = values.iter().map(unwrap).collect();
                prop_assert_eq!(normalized.get(local), Some(&JsonValue::Array(expected)));
            }
        }
        prop_assert!(normalized.len() <= input.len());
    }

    /// Normalizing is idempotent on its own output.
    #[test]
    fn normalization_is_idempotent(input in node()) {
        let once = normalize_resource(&input);
        let twice = normalize_resource(&once);
        prop_assert_eq!(once, twice);
    }

    /// The min-count rule fires exactly when there are too few values.
    #[test]
    fn min_count_fires_iff_below(min in 1u64..5, count in 0usize..8) {
        let values = vec![json!("v"); count];
        let message = min_count_validation(min, &values);
        prop_assert_eq!(message.is_some(), (count as u64) < min);
    }

    /// The max-count rule fires exactly when there are too many values.
    #[test]
    fn max_count_fires_iff_above(max in 1u64..5, count in 0usize..8) {
        let values = vec![json!("v"); count];
        let message = max_count_validation(max, &values);
        prop_assert_eq!(message.is_some(), (count as u64) > max);
    }

    /// However often the guard is asked, a pending or fulfilled key issues at
    /// most one fetch.
    #[test]
    fn guard_issues_at_most_one_fetch(calls in 1usize..20, fulfil_after in 0usize..20) {
        let key = CacheKey::Vocabulary;
        let mut store: CacheStore<u32, String> = CacheStore::new();
        let issued = Cell::new(0u32);
        let mut ticket = None;

        for call in 0..calls {
            let outcome = dispatch_if_needed(
                &store,
                |s| s.get(&key),
                || issued.set(issued.get() + 1),
            );
            let needs_begin = matches!(outcome, Dispatch::Issued(()));
            if needs_begin {
                ticket = Some(store.begin(key.clone()).expect("begin"));
            }
            if call == fulfil_after {
                if let Some(t) = ticket {
                    store.fulfil(&key, t, 7);
                }
            }
        }

        prop_assert_eq!(issued.get(), 1);
        prop_assert!(matches!(
            store.get(&key),
            Some(CacheEntry::Pending(_)) | Some(CacheEntry::Fulfilled(7))
        ));
    }
}
