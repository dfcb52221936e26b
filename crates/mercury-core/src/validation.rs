//! # Validation Rules
//!
//! Checks a candidate value list for one (subject, predicate) edit against
//! the constraints of its property shape. Failures are messages for the user,
//! returned as values; nothing here errors.
//!
//! All rules run independently and every triggered message is reported, in
//! the order: max length, min count, max count.

use crate::vocab::XSD_STRING;
use crate::vocabulary::{get_max_count, get_max_length, get_min_count};
use crate::LinkedValue;
use serde_json::Value as JsonValue;

// =============================================================================
// BUILDING BLOCKS
// =============================================================================

/// Whether an unwrapped value counts as present at all.
#[must_use]
pub fn is_valid_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::String(text) => !text.is_empty(),
        _ => true,
    }
}

/// Drop string values that contain only whitespace.
#[must_use]
pub fn remove_whitespace_values(values: &[JsonValue]) -> Vec<JsonValue> {
    values
        .iter()
        .filter(|value| value.as_str().is_none_or(|text| !text.trim().is_empty()))
        .cloned()
        .collect()
}

/// Flags any string value longer than `max_length` characters.
#[must_use]
pub fn max_length_validation(max_length: u64, values: &[JsonValue]) -> Option<String> {
    let too_long = values
        .iter()
        .filter_map(JsonValue::as_str)
        .any(|text| text.chars().count() as u64 > max_length);

    too_long.then(|| format!("Please provide no more than {max_length} characters"))
}

/// Flags a value list shorter than `min_count`.
#[must_use]
pub fn min_count_validation<T>(min_count: u64, values: &[T]) -> Option<String> {
    if (values.len() as u64) < min_count {
        if min_count == 1 {
            return Some("Please provide a value".to_string());
        }
        return Some(format!("Please specify at least {min_count} values"));
    }
    None
}

/// Flags a value list longer than `max_count`.
#[must_use]
pub fn max_count_validation<T>(max_count: u64, values: &[T]) -> Option<String> {
    (values.len() as u64 > max_count)
        .then(|| format!("Please provide no more than {max_count} values"))
}

// =============================================================================
// SHAPE VALIDATION
// =============================================================================

/// Validate candidate values against a property shape.
///
/// `datatype` is the datatype the editor resolved for the property; length
/// limits only apply to `xsd:string`. Returns an empty list when the values
/// are acceptable.
#[must_use]
pub fn validate_values_against_shape(
    shape: &JsonValue,
    datatype: Option<&str>,
    values: &[LinkedValue],
) -> Vec<String> {
    let pure_values: Vec<JsonValue> = values
        .iter()
        .map(LinkedValue::pure_value)
        .filter(is_valid_value)
        .collect();

    let mut errors = Vec::new();

    if let Some(max_length) = get_max_length(shape).filter(|&n| n > 0) {
        if datatype == Some(XSD_STRING) {
            errors.extend(max_length_validation(max_length, &pure_values));
        }
    }

    if let Some(min_count) = get_min_count(shape).filter(|&n| n > 0) {
        errors.extend(min_count_validation(
            min_count,
            &remove_whitespace_values(&pure_values),
        ));
    }

    if let Some(max_count) = get_max_count(shape).filter(|&n| n > 0) {
        errors.extend(max_count_validation(
            max_count,
            &remove_whitespace_values(&pure_values),
        ));
    }

    errors
}

// =============================================================================
// TESTS
// =============================================================================
