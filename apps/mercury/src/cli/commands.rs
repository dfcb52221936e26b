//! # CLI Command Implementations

use mercury::{ClientError, HttpMetadataApi, MetadataStore, ViewScope};
use mercury_core::vocabulary::get_label;
use mercury_core::{
    LinkedValue, PropertyDescriptor, class_of, local_name, normalize_resource,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

type Store = MetadataStore<HttpMetadataApi>;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), ClientError> {
    let output =
        serde_json::to_string_pretty(value).map_err(|e| ClientError::ParseError(e.to_string()))?;
    println!("{output}");
    Ok(())
}

fn parse_values(raw: &[String], reference: bool) -> Vec<LinkedValue> {
    raw.iter()
        .map(|value| {
            if reference {
                LinkedValue::reference(value.as_str())
            } else {
                LinkedValue::literal(value.as_str())
            }
        })
        .collect()
}

fn display_value(value: &LinkedValue) -> String {
    match value {
        LinkedValue::Reference {
            id,
            label: Some(label),
        } => format!("{label} <{id}>"),
        LinkedValue::Reference { id, label: None } => format!("<{id}>"),
        LinkedValue::Literal { value } => match value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Show the combined metadata of `subject`.
///
/// The fetch runs in a view scope, as a view would start it.
pub async fn cmd_show(
    store: Arc<Store>,
    json_mode: bool,
    subject: String,
) -> Result<(), ClientError> {
    let scope = ViewScope::new("show");
    let task = {
        let store = Arc::clone(&store);
        let subject = subject.clone();
        scope.spawn(async move { store.fetch_combined_metadata_if_needed(&subject).await })
    };

    let Some(descriptors) = task.result().await.transpose()? else {
        return Ok(());
    };

    if json_mode {
        return print_json(descriptors.as_slice());
    }

    println!("{subject}");
    println!();
    for descriptor in descriptors.iter() {
        print_descriptor(descriptor);
    }
    Ok(())
}

fn print_descriptor(descriptor: &PropertyDescriptor) {
    let mut flags = Vec::new();
    if descriptor.is_required {
        flags.push("required");
    }
    if descriptor.machine_only {
        flags.push("machine-only");
    }
    if descriptor.multiline {
        flags.push("multi-line");
    }
    if descriptor.allow_additions {
        flags.push("editable");
    }

    if flags.is_empty() {
        println!("{}", descriptor.label);
    } else {
        println!("{} [{}]", descriptor.label, flags.join(", "));
    }
    for value in &descriptor.values {
        println!("  {}", display_value(value));
    }
}

// =============================================================================
// CLASSES COMMAND
// =============================================================================

/// List the classes of the vocabulary.
pub async fn cmd_classes(store: &Store, json_mode: bool, catalog: bool) -> Result<(), ClientError> {
    let vocabulary = store.fetch_vocabulary_if_needed().await?;
    let shapes = if catalog {
        vocabulary.classes_in_catalog()
    } else {
        vocabulary.fairspace_classes()
    };

    let classes: Vec<(&str, &str)> = shapes
        .into_iter()
        .filter_map(|shape| {
            let class = class_of(shape)?;
            Some((get_label(shape).unwrap_or_else(|| local_name(class)), class))
        })
        .collect();

    if json_mode {
        let output: Vec<JsonValue> = classes
            .iter()
            .map(|(label, class)| serde_json::json!({ "label": label, "class": class }))
            .collect();
        return print_json(&output);
    }

    for (label, class) in &classes {
        println!("{label:<24} {class}");
    }
    Ok(())
}

// =============================================================================
// ENTITIES COMMAND
// =============================================================================

/// List the entities of `class`, or of every class.
pub async fn cmd_entities(
    store: &Store,
    json_mode: bool,
    class: Option<&str>,
) -> Result<(), ClientError> {
    let entities = match class {
        Some(class) => store.fetch_entities_if_needed(class).await?,
        None => store.fetch_all_entities_if_needed().await?,
    };

    let normalized: Vec<JsonValue> = entities
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|node| JsonValue::Object(normalize_resource(node)))
        .collect();

    if json_mode {
        return print_json(&normalized);
    }

    for entity in &normalized {
        let id = entity.get("@id").and_then(JsonValue::as_str).unwrap_or("?");
        let label = entity
            .get("label")
            .and_then(|labels| labels.as_array()?.first())
            .and_then(JsonValue::as_str)
            .unwrap_or("");
        println!("{id}  {label}");
    }
    println!();
    println!("{} entities", normalized.len());
    Ok(())
}

// =============================================================================
// RESOLVE COMMAND
// =============================================================================

/// Resolve a storage path to its subject.
pub async fn cmd_resolve(store: &Store, json_mode: bool, path: &str) -> Result<(), ClientError> {
    let subject = store.fetch_subject_by_path_if_needed(path).await?;
    if json_mode {
        return print_json(&serde_json::json!({ "path": path, "subject": subject.as_str() }));
    }
    println!("{subject}");
    Ok(())
}

// =============================================================================
// VALIDATE / SET COMMANDS
// =============================================================================

/// Check values without sending them.
pub async fn cmd_validate(
    store: &Store,
    json_mode: bool,
    subject: &str,
    predicate: &str,
    raw_values: &[String],
    reference: bool,
) -> Result<(), ClientError> {
    let values = parse_values(raw_values, reference);
    let errors = store.validate(subject, predicate, &values).await?;

    if json_mode {
        return print_json(&serde_json::json!({ "valid": errors.is_empty(), "errors": errors }));
    }

    if errors.is_empty() {
        println!("valid");
    } else {
        for error in &errors {
            println!("- {error}");
        }
    }
    Ok(())
}

/// Replace the values of `predicate` on `subject`.
pub async fn cmd_set(
    store: &Store,
    json_mode: bool,
    subject: &str,
    predicate: &str,
    raw_values: &[String],
    reference: bool,
) -> Result<(), ClientError> {
    let values = parse_values(raw_values, reference);
    if let Err(e) = store.update_metadata(subject, predicate, &values).await {
        if let Some(messages) = e.validation_messages() {
            for message in messages {
                eprintln!("- {message}");
            }
        }
        return Err(e);
    }

    if json_mode {
        return print_json(&serde_json::json!({
            "subject": subject,
            "predicate": predicate,
            "values": values,
        }));
    }
    println!("Updated {predicate} on {subject}");
    Ok(())
}

// =============================================================================
// CREATE COMMAND
// =============================================================================

/// Create an entity of `class`.
pub async fn cmd_create(
    store: &Store,
    json_mode: bool,
    class: &str,
    id: Option<&str>,
) -> Result<(), ClientError> {
    let subject = store.create_entity_of_class(class, id).await?;
    if json_mode {
        return print_json(&serde_json::json!({ "subject": subject, "class": class }));
    }
    println!("Created {subject}");
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
