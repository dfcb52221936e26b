//! # Vocabulary Model
//!
//! Read-only view over the SHACL shape graph that describes which classes
//! exist, which properties apply to them and how those properties are
//! constrained. The graph is fetched once per session and never mutated.
//!
//! Node shapes declare a class (`sh:targetClass`) and list their property
//! shapes through `sh:property`. Property shapes carry `sh:path`, cardinality,
//! datatype and display metadata.

use crate::jsonld::{
    find_node, get_first_predicate_bool, get_first_predicate_id, get_first_predicate_str,
    get_first_predicate_u64, local_name, node_types, predicate_values,
};
use crate::vocab::{
    FS_CLASS_INFIX, FS_MACHINE_ONLY, FS_NS, RDFS_LABEL, SHACL_MAX_COUNT, SHACL_MAX_LENGTH,
    SHACL_MIN_COUNT, SHACL_NAME, SHACL_NODE_SHAPE, SHACL_PATH, SHACL_PROPERTY,
    SHACL_TARGET_CLASS,
};
use crate::MercuryError;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

// =============================================================================
// SHAPE ACCESSORS
// =============================================================================

/// First value declared for `predicate` on a shape or class node.
///
/// `@value` is preferred, `@id` is the fallback. Used, among others, to read
/// the class infix of a class shape.
#[must_use]
pub fn get_single_value<'a>(shape: &'a JsonValue, predicate: &str) -> Option<&'a JsonValue> {
    let first = predicate_values(shape, predicate).first()?;
    first.get("@value").or_else(|| first.get("@id"))
}

/// `sh:maxCount` of a property shape.
#[must_use]
pub fn get_max_count(shape: &JsonValue) -> Option<u64> {
    get_first_predicate_u64(shape, SHACL_MAX_COUNT)
}

/// `sh:minCount` of a property shape.
#[must_use]
pub fn get_min_count(shape: &JsonValue) -> Option<u64> {
    get_first_predicate_u64(shape, SHACL_MIN_COUNT)
}

/// `sh:maxLength` of a property shape.
#[must_use]
pub fn get_max_length(shape: &JsonValue) -> Option<u64> {
    get_first_predicate_u64(shape, SHACL_MAX_LENGTH)
}

/// Class infix declared on a class shape, used when minting subject IRIs.
#[must_use]
pub fn get_class_infix(shape: &JsonValue) -> Option<&str> {
    get_single_value(shape, FS_CLASS_INFIX)
        .and_then(JsonValue::as_str)
        .filter(|infix| !infix.trim().is_empty())
}

/// `sh:path` of a property shape.
#[must_use]
pub fn get_path(shape: &JsonValue) -> Option<&str> {
    get_first_predicate_id(shape, SHACL_PATH)
}

/// `sh:targetClass` of a node shape.
#[must_use]
pub fn get_target_class(shape: &JsonValue) -> Option<&str> {
    get_first_predicate_id(shape, SHACL_TARGET_CLASS)
}

/// Whether the node is flagged `fs:machineOnly`.
#[must_use]
pub fn is_machine_only(node: &JsonValue) -> bool {
    get_first_predicate_bool(node, FS_MACHINE_ONLY).unwrap_or(false)
}

/// Display label of a node: `sh:name`, then `rdfs:label`.
///
/// Shapes are often blank nodes, so callers fall back to the local name of
/// the class or path the shape describes, never of the shape itself.
#[must_use]
pub fn get_label(node: &JsonValue) -> Option<&str> {
    get_first_predicate_str(node, SHACL_NAME)
        .or_else(|| get_first_predicate_str(node, RDFS_LABEL))
}

fn is_node_shape(node: &JsonValue) -> bool {
    node_types(node).contains(&SHACL_NODE_SHAPE)
}

// =============================================================================
// VOCABULARY
// =============================================================================

/// The session's shape graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    nodes: Vec<JsonValue>,
}

impl Vocabulary {
    /// Wrap an already expanded list of nodes.
    #[must_use]
    pub fn new(nodes: Vec<JsonValue>) -> Self {
        Self { nodes }
    }

    /// Build from a JSON-LD document: either a node array or an object with
    /// an `@graph` array.
    pub fn from_json_ld(document: JsonValue) -> Result<Self, MercuryError> {
        match document {
            JsonValue::Array(nodes) => Ok(Self::new(nodes)),
            JsonValue::Object(mut object) => match object.remove("@graph") {
                Some(JsonValue::Array(nodes)) => Ok(Self::new(nodes)),
                _ => Err(MercuryError::InvalidJsonLd(
                    "vocabulary object has no @graph array".to_string(),
                )),
            },
            other => Err(MercuryError::InvalidJsonLd(format!(
                "vocabulary must be an array or an object, got {other}"
            ))),
        }
    }

    /// All nodes of the shape graph.
    #[must_use]
    pub fn nodes(&self) -> &[JsonValue] {
        &self.nodes
    }

    /// Node with the given `@id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&JsonValue> {
        find_node(&self.nodes, id)
    }

    /// Node shapes that target a class in the Fairspace namespace.
    #[must_use]
    pub fn fairspace_classes(&self) -> Vec<&JsonValue> {
        self.nodes
            .iter()
            .filter(|node| is_node_shape(node))
            .filter(|node| get_target_class(node).is_some_and(|class| class.starts_with(FS_NS)))
            .collect()
    }

    /// Node shapes browsable in catalog and search views: every class with a
    /// target that is not maintained by the system alone.
    #[must_use]
    pub fn classes_in_catalog(&self) -> Vec<&JsonValue> {
        self.nodes
            .iter()
            .filter(|node| is_node_shape(node))
            .filter(|node| get_target_class(node).is_some())
            .filter(|node| !is_machine_only(node))
            .collect()
    }

    /// The node shape targeting `class`.
    #[must_use]
    pub fn shape_for_class(&self, class: &str) -> Option<&JsonValue> {
        self.nodes
            .iter()
            .filter(|node| is_node_shape(node))
            .find(|node| get_target_class(node) == Some(class))
    }

    /// Property shapes of the node shapes targeting any of `classes`.
    ///
    /// A path declared by several classes is reported once, by the first
    /// class that declares it.
    #[must_use]
    pub fn property_shapes_for_classes(&self, classes: &[&str]) -> Vec<&JsonValue> {
        let mut seen_paths = BTreeSet::new();
        let mut shapes = Vec::new();

        for class in classes {
            let Some(node_shape) = self.shape_for_class(class) else {
                continue;
            };
            for reference in predicate_values(node_shape, SHACL_PROPERTY) {
                let Some(property) = reference
                    .get("@id")
                    .and_then(JsonValue::as_str)
                    .and_then(|id| self.get(id))
                else {
                    continue;
                };
                if let Some(path) = get_path(property) {
                    if seen_paths.insert(path.to_string()) {
                        shapes.push(property);
                    }
                }
            }
        }

        shapes
    }

    /// The property shape for `predicate` among the shapes of `classes`.
    #[must_use]
    pub fn property_shape(&self, classes: &[&str], predicate: &str) -> Option<&JsonValue> {
        self.property_shapes_for_classes(classes)
            .into_iter()
            .find(|shape| get_path(shape) == Some(predicate))
    }

    /// Label of a class, looked up through its node shape.
    #[must_use]
    pub fn class_label(&self, class: &str) -> String {
        self.shape_for_class(class)
            .and_then(get_label)
            .unwrap_or_else(|| local_name(class))
            .to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================
