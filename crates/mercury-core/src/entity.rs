//! # Entity Creation
//!
//! The synchronous half of creating a metadata entity: minting its subject
//! IRI and tracking the creation state machine. The app layer drives the
//! machine with the results of its backend calls.
//!
//! ```text
//! CheckingExistence ──no statements──▶ CreatingTypeAssertion ──asserted──▶ Created
//!        │
//!        └──statements found──▶ AlreadyExists
//! ```

use crate::jsonld::node_id;
use crate::vocab::{DEFAULT_CLASS_INFIX, IRI_PATH_SEGMENT};
use crate::vocabulary::{get_class_infix, get_target_class};
use crate::MercuryError;
use serde_json::Value as JsonValue;

// =============================================================================
// SUBJECT MINTING
// =============================================================================

/// A freshly minted subject IRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedSubject {
    /// `{origin}/iri/{infix}/{id}`
    pub subject: String,
    /// The infix that was used.
    pub infix: String,
    /// The class declared no infix and the generic one was used instead.
    pub used_fallback: bool,
}

/// Class IRI a type node stands for: its `sh:targetClass` when it is a
/// shape, its own `@id` otherwise.
#[must_use]
pub fn class_of(type_node: &JsonValue) -> Option<&str> {
    get_target_class(type_node).or_else(|| node_id(type_node))
}

/// Mint the subject IRI for a new instance of `type_node`.
///
/// A class without a declared infix gets [`DEFAULT_CLASS_INFIX`]; callers are
/// expected to report `used_fallback` as a warning.
#[must_use]
pub fn mint_subject(origin: &str, type_node: &JsonValue, id: &str) -> MintedSubject {
    let (infix, used_fallback) = match get_class_infix(type_node) {
        Some(infix) => (infix.to_string(), false),
        None => (DEFAULT_CLASS_INFIX.to_string(), true),
    };
    let subject = format!(
        "{}/{}/{}/{}",
        origin.trim_end_matches('/'),
        IRI_PATH_SEGMENT,
        infix,
        id
    );

    MintedSubject {
        subject,
        infix,
        used_fallback,
    }
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Progress of one entity creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationState {
    /// Waiting for the backend to report existing statements.
    CheckingExistence { subject: String },
    /// Subject is free; the type assertion is being written.
    CreatingTypeAssertion { subject: String },
    /// The entity exists with its type asserted.
    Created { subject: String },
    /// The subject already had metadata. Terminal.
    AlreadyExists { subject: String },
}

impl CreationState {
    /// Start a creation at `subject`.
    #[must_use]
    pub fn start(subject: impl Into<String>) -> Self {
        Self::CheckingExistence {
            subject: subject.into(),
        }
    }

    /// Subject the creation is about.
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::CheckingExistence { subject }
            | Self::CreatingTypeAssertion { subject }
            | Self::Created { subject }
            | Self::AlreadyExists { subject } => subject,
        }
    }

    /// Feed the number of statements found at the subject.
    ///
    /// Only meaningful while checking existence; other states are returned
    /// unchanged.
    #[must_use]
    pub fn existence_checked(self, statements: usize) -> Self {
        match self {
            Self::CheckingExistence { subject } if statements > 0 => {
                Self::AlreadyExists { subject }
            }
            Self::CheckingExistence { subject } => Self::CreatingTypeAssertion { subject },
            other => other,
        }
    }

    /// Record that the type assertion was written.
    #[must_use]
    pub fn type_asserted(self) -> Self {
        match self {
            Self::CreatingTypeAssertion { subject } => Self::Created { subject },
            other => other,
        }
    }

    /// Whether the type assertion may be written now.
    #[must_use]
    pub fn may_assert_type(&self) -> bool {
        matches!(self, Self::CreatingTypeAssertion { .. })
    }

    /// Resolve a finished creation: the subject, or `AlreadyExists`.
    pub fn into_result(self) -> Result<String, MercuryError> {
        match self {
            Self::Created { subject } => Ok(subject),
            Self::AlreadyExists { subject } => Err(MercuryError::AlreadyExists(subject)),
            Self::CheckingExistence { subject } | Self::CreatingTypeAssertion { subject } => {
                Err(MercuryError::CreationIncomplete(subject))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mints_with_declared_infix() {
        let shape = json!({
            "@id": "http://fairspace.io/ontology#CollectionShape",
            "http://www.w3.org/ns/shacl#targetClass": [{"@id": "http://fairspace.io/ontology#Collection"}],
            "http://fairspace.io/ontology#classInfix": [{"@value": "collections"}]
        });

        let minted = mint_subject("https://fairspace.example/", &shape, "42");
        assert_eq!(minted.subject, "https://fairspace.example/iri/collections/42");
        assert!(!minted.used_fallback);
        assert_eq!(class_of(&shape), Some("http://fairspace.io/ontology#Collection"));
    }

    #[test]
    fn falls_back_to_generic_infix() {
        let class = json!({"@id": "http://example.com/Thing"});
        let minted = mint_subject("https://fairspace.example", &class, "7");
        assert_eq!(minted.subject, "https://fairspace.example/iri/generic/7");
        assert_eq!(minted.infix, "generic");
        assert!(minted.used_fallback);
        assert_eq!(class_of(&class), Some("http://example.com/Thing"));
    }

    #[test]
    fn blank_infix_counts_as_missing() {
        let class = json!({"http://fairspace.io/ontology#classInfix": [{"@value": "  "}]});
        assert!(mint_subject("https://x", &class, "1").used_fallback);
    }

    #[test]
    fn happy_path_reaches_created() {
        let state = CreationState::start("http://s")
            .existence_checked(0)
            .type_asserted();
        assert_eq!(state.into_result(), Ok("http://s".to_string()));
    }

    #[test]
    fn existing_statements_stop_the_creation() {
        let state = CreationState::start("http://s").existence_checked(3);
        assert!(!state.may_assert_type());

        let state = state.type_asserted();
        assert_eq!(
            state.into_result(),
            Err(MercuryError::AlreadyExists("http://s".to_string()))
        );
    }

    #[test]
    fn type_assertion_requires_existence_check() {
        let state = CreationState::start("http://s").type_asserted();
        assert_eq!(state.subject(), "http://s");
        assert!(matches!(state, CreationState::CheckingExistence { .. }));
        assert_eq!(
            state.into_result(),
            Err(MercuryError::CreationIncomplete("http://s".to_string()))
        );
    }
}
