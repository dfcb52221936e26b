//! # Core Type Definitions
//!
//! This module contains the shared types of the Mercury metadata core:
//! - Linked-data values (`LinkedValue`)
//! - Error types (`MercuryError`)
//!
//! JSON-LD value objects are decoded into `LinkedValue` once, at the
//! boundary. Nothing past this point inspects raw `@value`/`@id` objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

// =============================================================================
// LINKED VALUE
// =============================================================================

/// A single object of a (subject, predicate) pair.
///
/// Either a literal scalar or a reference to another resource. References may
/// carry a display label resolved from the surrounding graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkedValue {
    /// A reference to another resource by IRI.
    Reference {
        /// IRI of the referenced resource.
        id: String,
        /// Display label, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// A literal scalar (string, number or boolean).
    Literal {
        /// The literal value.
        value: JsonValue,
    },
}

impl LinkedValue {
    /// Create a literal value.
    #[must_use]
    pub fn literal(value: impl Into<JsonValue>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    /// Create a reference without a label.
    #[must_use]
    pub fn reference(id: impl Into<String>) -> Self {
        Self::Reference {
            id: id.into(),
            label: None,
        }
    }

    /// Attach a label. Literals are returned unchanged.
    #[must_use]
    pub fn with_label(self, label: impl Into<String>) -> Self {
        match self {
            Self::Reference { id, .. } => Self::Reference {
                id,
                label: Some(label.into()),
            },
            literal @ Self::Literal { .. } => literal,
        }
    }

    /// IRI of a reference, `None` for literals.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Reference { id, .. } => Some(id),
            Self::Literal { .. } => None,
        }
    }

    /// Label of a reference, `None` for literals and unlabelled references.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Reference { label, .. } => label.as_deref(),
            Self::Literal { .. } => None,
        }
    }

    /// The unwrapped value: the IRI for references, the scalar for literals.
    #[must_use]
    pub fn pure_value(&self) -> JsonValue {
        match self {
            Self::Reference { id, .. } => JsonValue::String(id.clone()),
            Self::Literal { value } => value.clone(),
        }
    }

    /// Decode a JSON-LD value object.
    ///
    /// Accepts `{"@value": v}`, `{"@id": iri}` and plain scalars (which are
    /// treated as literals). `@value` wins when both keys are present.
    pub fn from_json_ld(raw: &JsonValue) -> Result<Self, MercuryError> {
        match raw {
            JsonValue::Object(object) => {
                if let Some(value) = object.get("@value") {
                    return Ok(Self::literal(value.clone()));
                }
                match object.get("@id") {
                    Some(JsonValue::String(id)) => Ok(Self::reference(id.clone())),
                    Some(other) => Err(MercuryError::InvalidJsonLd(format!(
                        "@id must be a string, got {other}"
                    ))),
                    None => Err(MercuryError::InvalidJsonLd(
                        "value object has neither @value nor @id".to_string(),
                    )),
                }
            }
            JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_) => {
                Ok(Self::literal(raw.clone()))
            }
            JsonValue::Null | JsonValue::Array(_) => Err(MercuryError::InvalidJsonLd(format!(
                "not a JSON-LD value object: {raw}"
            ))),
        }
    }

    /// Encode as a JSON-LD value object.
    #[must_use]
    pub fn to_json_ld(&self) -> JsonValue {
        let mut object = Map::new();
        match self {
            Self::Reference { id, .. } => {
                object.insert("@id".to_string(), JsonValue::String(id.clone()));
            }
            Self::Literal { value } => {
                object.insert("@value".to_string(), value.clone());
            }
        }
        JsonValue::Object(object)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Mercury metadata core.
///
/// Validation failures are returned as message lists by the validation
/// module; `Validation` exists so callers that must refuse a submission can
/// carry those messages through `Result`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MercuryError {
    /// The requested subject has no statements.
    #[error("No such resource: {0}")]
    NotFound(String),

    /// An entity was about to be created at a subject that already has metadata.
    #[error("Metadata entity already exists: {0}")]
    AlreadyExists(String),

    /// The input document is not valid expanded JSON-LD.
    #[error("Invalid JSON-LD: {0}")]
    InvalidJsonLd(String),

    /// Candidate values violate the shape of their property.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A fetch for this cache key is already in flight.
    #[error("Request already pending for {0}")]
    CachePending(String),

    /// An entity creation was resolved before it reached a terminal state.
    #[error("Entity creation not finished: {0}")]
    CreationIncomplete(String),
}

// =============================================================================
// TESTS
// =============================================================================
