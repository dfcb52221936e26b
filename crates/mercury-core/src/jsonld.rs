//! # JSON-LD Helpers
//!
//! Works on expanded JSON-LD as the backend emits it: every node is an object
//! whose predicate keys are full IRIs mapped to arrays of value objects
//! (`{"@value": v}` or `{"@id": iri}`).
//!
//! The normalizer turns such a node into a compact `local name -> [scalar]`
//! form for display and search. The remaining helpers read single values out
//! of nodes and decode value arrays into [`LinkedValue`]s.

use crate::{LinkedValue, MercuryError};
use serde_json::{Map, Value as JsonValue};

/// Keys that keep their name during normalization.
const KEYWORDS: [&str; 2] = ["@id", "@type"];

// =============================================================================
// NORMALIZATION
// =============================================================================

/// The part of an IRI after its last `#` or `/`.
///
/// Keys without either separator are returned unchanged.
#[must_use]
pub fn local_name(iri: &str) -> &str {
    match iri.rfind(['#', '/']) {
        Some(index) => &iri[index + 1..],
        None => iri,
    }
}

/// Unwrap one value object: `@value` first, then `@id`, else the value itself.
fn unwrap_value(value: &JsonValue) -> JsonValue {
    if let JsonValue::Object(object) = value {
        if let Some(inner) = object.get("@value") {
            return inner.clone();
        }
        if let Some(id) = object.get("@id") {
            return id.clone();
        }
    }
    value.clone()
}

/// Normalize a JSON-LD node into `local name -> [scalar]`.
///
/// - `@id` and `@type` keep their key. Plain values pass through unchanged,
///   wrapped values are unwrapped.
/// - Every other key is shortened to its [`local_name`] and its value objects
///   are unwrapped in order.
/// - Predicates mapped to an empty array (or `null`) are left out.
///
/// When two predicates share a local name the later one wins.
#[must_use]
pub fn normalize_resource(node: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    let mut normalized = Map::new();

    for (key, value) in node {
        if KEYWORDS.contains(&key.as_str()) {
            let passed = match value {
                JsonValue::Array(items) => {
                    JsonValue::Array(items.iter().map(unwrap_value).collect())
                }
                other => unwrap_value(other),
            };
            normalized.insert(key.clone(), passed);
            continue;
        }

        let values: Vec<JsonValue> = match value {
            JsonValue::Array(items) => items.iter().map(unwrap_value).collect(),
            JsonValue::Null => Vec::new(),
            single => vec![unwrap_value(single)],
        };

        if !values.is_empty() {
            normalized.insert(local_name(key).to_string(), JsonValue::Array(values));
        }
    }

    normalized
}

// =============================================================================
// NODE ACCESSORS
// =============================================================================

/// The raw value array of `predicate` on `node`, empty if absent.
#[must_use]
pub fn predicate_values<'a>(node: &'a JsonValue, predicate: &str) -> &'a [JsonValue] {
    node.get(predicate)
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// First `@value` of `predicate` on `node`.
#[must_use]
pub fn get_first_predicate_value<'a>(
    node: &'a JsonValue,
    predicate: &str,
) -> Option<&'a JsonValue> {
    predicate_values(node, predicate)
        .first()
        .and_then(|value| value.get("@value"))
}

/// First `@id` of `predicate` on `node`.
#[must_use]
pub fn get_first_predicate_id<'a>(node: &'a JsonValue, predicate: &str) -> Option<&'a str> {
    predicate_values(node, predicate)
        .first()
        .and_then(|value| value.get("@id"))
        .and_then(JsonValue::as_str)
}

/// First value of `predicate` on `node`, as a string when it is one.
///
/// Reads `@value` and falls back to `@id`.
#[must_use]
pub fn get_first_predicate_str<'a>(node: &'a JsonValue, predicate: &str) -> Option<&'a str> {
    let first = predicate_values(node, predicate).first()?;
    first
        .get("@value")
        .or_else(|| first.get("@id"))
        .and_then(JsonValue::as_str)
}

/// First value of `predicate` on `node` as an unsigned integer.
///
/// Integer literals are sometimes serialized as strings; both forms count.
#[must_use]
pub fn get_first_predicate_u64(node: &JsonValue, predicate: &str) -> Option<u64> {
    match get_first_predicate_value(node, predicate)? {
        JsonValue::Number(number) => number.as_u64(),
        JsonValue::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// First value of `predicate` on `node` as a boolean.
#[must_use]
pub fn get_first_predicate_bool(node: &JsonValue, predicate: &str) -> Option<bool> {
    match get_first_predicate_value(node, predicate)? {
        JsonValue::Bool(flag) => Some(*flag),
        JsonValue::String(text) => text.parse().ok(),
        _ => None,
    }
}

/// The `@id` of a node.
#[must_use]
pub fn node_id(node: &JsonValue) -> Option<&str> {
    node.get("@id").and_then(JsonValue::as_str)
}

/// The `@type`s of a node. Accepts a single string or an array.
#[must_use]
pub fn node_types(node: &JsonValue) -> Vec<&str> {
    match node.get("@type") {
        Some(JsonValue::String(single)) => vec![single.as_str()],
        Some(JsonValue::Array(items)) => items.iter().filter_map(JsonValue::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Find the node with the given `@id`.
#[must_use]
pub fn find_node<'a>(nodes: &'a [JsonValue], id: &str) -> Option<&'a JsonValue> {
    nodes.iter().find(|node| node_id(node) == Some(id))
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode a JSON-LD value array into linked values, preserving order.
pub fn decode_values(raw: &[JsonValue]) -> Result<Vec<LinkedValue>, MercuryError> {
    raw.iter().map(LinkedValue::from_json_ld).collect()
}

/// Encode linked values as a JSON-LD value array.
#[must_use]
pub fn encode_values(values: &[LinkedValue]) -> JsonValue {
    JsonValue::Array(values.iter().map(LinkedValue::to_json_ld).collect())
}

/// Build the single-node JSON-LD document that replaces `predicate` on `subject`.
#[must_use]
pub fn update_document(subject: &str, predicate: &str, values: &[LinkedValue]) -> JsonValue {
    let mut node = Map::new();
    node.insert("@id".to_string(), JsonValue::String(subject.to_string()));
    node.insert(predicate.to_string(), encode_values(values));
    JsonValue::Array(vec![JsonValue::Object(node)])
}

// =============================================================================
// TESTS
// =============================================================================
