//! # Metadata Combination
//!
//! Joins a resource's JSON-LD with the vocabulary into a list of
//! presentation-ready property descriptors: what to show, how to label it,
//! and whether the user may edit it.

use crate::jsonld::{
    decode_values, find_node, get_first_predicate_bool, get_first_predicate_id, local_name,
    node_types, predicate_values,
};
use crate::vocab::{FS_MULTILINE, RDF_TYPE, RDFS_LABEL, SHACL_CLASS, SHACL_DATATYPE, SHACL_NAME};
use crate::vocabulary::{
    Vocabulary, get_label, get_max_count, get_min_count, get_path, is_machine_only,
};
use crate::{LinkedValue, MercuryError};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};

/// Label used for the `@type` descriptor.
pub const TYPE_LABEL: &str = "Type";

// =============================================================================
// PROPERTY DESCRIPTOR
// =============================================================================

/// One property of a resource, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    /// Predicate IRI.
    pub key: String,
    /// Human label.
    pub label: String,
    /// Current values, references carrying labels where the graph has them.
    pub values: Vec<LinkedValue>,
    /// `sh:datatype` for literal properties.
    pub datatype: Option<String>,
    /// `sh:class` for reference properties.
    pub class_range: Option<String>,
    /// `sh:maxCount`, if declared.
    pub max_values_count: Option<u64>,
    /// More than one value allowed.
    pub multiple: bool,
    /// Maintained by the system; not editable by users.
    pub machine_only: bool,
    /// Rendered with a multi-line editor.
    pub multiline: bool,
    /// At least one value required.
    pub is_required: bool,
    /// The user may add another value right now.
    pub allow_additions: bool,
}

impl PropertyDescriptor {
    fn from_shape(shape: &JsonValue, key: &str, values: Vec<LinkedValue>) -> Self {
        let max_values_count = get_max_count(shape);
        let machine_only = is_machine_only(shape);
        let multiple = max_values_count.is_none_or(|max| max > 1);
        let below_max = max_values_count.is_none_or(|max| (values.len() as u64) < max);

        Self {
            key: key.to_string(),
            label: get_label(shape).unwrap_or_else(|| local_name(key)).to_string(),
            values,
            datatype: get_first_predicate_id(shape, SHACL_DATATYPE).map(str::to_string),
            class_range: get_first_predicate_id(shape, SHACL_CLASS).map(str::to_string),
            max_values_count,
            multiple,
            machine_only,
            multiline: get_first_predicate_bool(shape, FS_MULTILINE).unwrap_or(false),
            is_required: get_min_count(shape).is_some_and(|min| min > 0),
            allow_additions: !machine_only && below_max,
        }
    }

    /// Descriptor for a predicate the vocabulary does not describe.
    fn unknown(key: &str, values: Vec<LinkedValue>) -> Self {
        Self {
            key: key.to_string(),
            label: local_name(key).to_string(),
            values,
            datatype: None,
            class_range: None,
            max_values_count: None,
            multiple: true,
            machine_only: false,
            multiline: false,
            is_required: false,
            allow_additions: false,
        }
    }
}

// =============================================================================
// COMBINATION
// =============================================================================

/// Labels of every node in the instance graph that declares one.
fn instance_labels(nodes: &[JsonValue]) -> BTreeMap<&str, &str> {
    nodes
        .iter()
        .filter_map(|node| {
            let id = node.get("@id")?.as_str()?;
            let label = [RDFS_LABEL, SHACL_NAME].iter().find_map(|predicate| {
                predicate_values(node, predicate)
                    .first()?
                    .get("@value")?
                    .as_str()
            })?;
            Some((id, label))
        })
        .collect()
}

fn with_labels(values: Vec<LinkedValue>, labels: &BTreeMap<&str, &str>) -> Vec<LinkedValue> {
    values
        .into_iter()
        .map(|value| match value.id().and_then(|id| labels.get(id)) {
            Some(label) => value.with_label(*label),
            None => value,
        })
        .collect()
}

impl Vocabulary {
    /// Combine the instance graph of `subject` with this vocabulary.
    ///
    /// Every property shape that applies to the subject's types yields a
    /// descriptor, even without values. Predicates present on the instance but
    /// unknown to the vocabulary are listed with their local name as label.
    /// Descriptors are sorted by label, then key.
    pub fn combine(
        &self,
        instance: &[JsonValue],
        subject: &str,
    ) -> Result<Vec<PropertyDescriptor>, MercuryError> {
        let node = find_node(instance, subject)
            .ok_or_else(|| MercuryError::NotFound(subject.to_string()))?;
        let types = node_types(node);
        let labels = instance_labels(instance);

        let mut descriptors = Vec::new();
        let mut covered = BTreeSet::new();

        if !types.is_empty() {
            let type_values = types
                .iter()
                .map(|class| LinkedValue::reference(*class).with_label(self.class_label(class)))
                .collect();
            descriptors.push(PropertyDescriptor {
                label: TYPE_LABEL.to_string(),
                machine_only: true,
                allow_additions: false,
                ..PropertyDescriptor::unknown(RDF_TYPE, type_values)
            });
        }

        for shape in self.property_shapes_for_classes(&types) {
            let Some(path) = get_path(shape) else {
                continue;
            };
            let values = with_labels(decode_values(predicate_values(node, path))?, &labels);
            descriptors.push(PropertyDescriptor::from_shape(shape, path, values));
            covered.insert(path);
        }

        if let JsonValue::Object(object) = node {
            for (key, raw) in object {
                if key.starts_with('@') || covered.contains(key.as_str()) {
                    continue;
                }
                let Some(raw_values) = raw.as_array().filter(|values| !values.is_empty()) else {
                    continue;
                };
                let values = with_labels(decode_values(raw_values)?, &labels);
                descriptors.push(PropertyDescriptor::unknown(key, values));
            }
        }

        descriptors.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.key.cmp(&b.key)));
        Ok(descriptors)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::tests::sample_vocabulary;
    use serde_json::json;

    const SUBJECT: &str = "http://fairspace.com/iri/collections/1";

    fn instance() -> Vec<JsonValue> {
        vec![
            json!({
                "@id": SUBJECT,
                "@type": ["http://fairspace.io/ontology#Collection"],
                "http://fairspace.io/ontology#name": [{"@value": "Collection 5"}],
                "http://fairspace.io/ontology#ownedBy": [{"@id": "http://fairspace.com/iri/users/1"}],
                "http://purl.org/dc/terms/creator": [{"@value": "someone"}]
            }),
            json!({
                "@id": "http://fairspace.com/iri/users/1",
                "http://www.w3.org/2000/01/rdf-schema#label": [{"@value": "Jane"}]
            }),
        ]
    }

    fn descriptor<'a>(descriptors: &'a [PropertyDescriptor], key: &str) -> &'a PropertyDescriptor {
        descriptors
            .iter()
            .find(|d| d.key == key)
            .expect("descriptor present")
    }

    #[test]
    fn lists_every_shape_property_sorted_by_label() {
        let combined = sample_vocabulary()
            .combine(&instance(), SUBJECT)
            .expect("combine");
        let labels: Vec<&str> = combined.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Description", "Name", "Owner", "Type", "creator"]);
    }

    #[test]
    fn resolves_reference_labels() {
        let combined = sample_vocabulary()
            .combine(&instance(), SUBJECT)
            .expect("combine");
        let owner = descriptor(&combined, "http://fairspace.io/ontology#ownedBy");
        assert_eq!(owner.values[0].label(), Some("Jane"));
        assert!(owner.machine_only);
        assert!(!owner.allow_additions);
        assert!(!owner.multiple);
    }

    #[test]
    fn editability_flags_follow_the_shape() {
        let combined = sample_vocabulary()
            .combine(&instance(), SUBJECT)
            .expect("combine");

        let name = descriptor(&combined, "http://fairspace.io/ontology#name");
        assert!(name.is_required);
        assert!(!name.multiple);
        assert!(!name.allow_additions);
        assert_eq!(name.datatype.as_deref(), Some(crate::vocab::XSD_STRING));

        let description = descriptor(&combined, "http://fairspace.io/ontology#description");
        assert!(description.values.is_empty());
        assert!(description.multiline);
        assert!(description.multiple);
        assert!(description.allow_additions);
    }

    #[test]
    fn unknown_predicates_fall_back_to_local_name() {
        let combined = sample_vocabulary()
            .combine(&instance(), SUBJECT)
            .expect("combine");
        let creator = descriptor(&combined, "http://purl.org/dc/terms/creator");
        assert_eq!(creator.label, "creator");
        assert_eq!(creator.values, vec![LinkedValue::literal("someone")]);
    }

    #[test]
    fn type_descriptor_uses_class_labels() {
        let combined = sample_vocabulary()
            .combine(&instance(), SUBJECT)
            .expect("combine");
        let types = descriptor(&combined, RDF_TYPE);
        assert!(types.machine_only);
        assert_eq!(types.values[0].label(), Some("Collection"));
    }

    #[test]
    fn unnamed_blank_node_shapes_label_by_class_and_path() {
        let vocabulary = Vocabulary::new(vec![
            json!({
                "@id": "_:b0",
                "@type": ["http://www.w3.org/ns/shacl#NodeShape"],
                "http://www.w3.org/ns/shacl#targetClass": [{"@id": "http://example.com/Person"}],
                "http://www.w3.org/ns/shacl#property": [{"@id": "_:b1"}]
            }),
            json!({
                "@id": "_:b1",
                "http://www.w3.org/ns/shacl#path": [{"@id": "http://example.com/email"}]
            }),
        ]);
        let person = vec![json!({
            "@id": "http://example.com/people/1",
            "@type": ["http://example.com/Person"],
            "http://example.com/email": [{"@value": "jane@example.com"}]
        })];

        let combined = vocabulary
            .combine(&person, "http://example.com/people/1")
            .expect("combine");

        let types = descriptor(&combined, RDF_TYPE);
        assert_eq!(types.values[0].label(), Some("Person"));
        let email = descriptor(&combined, "http://example.com/email");
        assert_eq!(email.label, "email");
    }

    #[test]
    fn missing_subject_is_not_found() {
        let result = sample_vocabulary().combine(&[], SUBJECT);
        assert_eq!(result, Err(MercuryError::NotFound(SUBJECT.to_string())));
    }
}
