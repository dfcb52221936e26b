//! # Metadata Store
//!
//! The session's metadata state: one [`FetchCache`] per kind of data, the
//! backend API, and the operations views call.
//!
//! ## Operations
//!
//! | Operation | Cache key |
//! |-----------|-----------|
//! | `fetch_vocabulary_if_needed` | `Vocabulary` |
//! | `fetch_json_ld_by_subject_if_needed` | `JsonLd(subject)` |
//! | `fetch_combined_metadata_if_needed` | `Combined(subject)` |
//! | `fetch_entities_if_needed` | `EntitiesByType(class)` |
//! | `fetch_all_entities_if_needed` | `AllEntities` |
//! | `fetch_subject_by_path_if_needed` | `SubjectByPath(path)` |
//!
//! Mutations (`update_metadata`, `create_metadata_entity`) go straight to the
//! backend and invalidate what they changed.

mod fetch;

pub use fetch::FetchCache;

use crate::ClientError;
use crate::backend::{HttpMetadataApi, MetadataApi};
use crate::config::Config;
use mercury_core::jsonld::{find_node, get_first_predicate_id, node_types};
use mercury_core::vocab::{RDF_TYPE, SHACL_DATATYPE};
use mercury_core::{
    CacheKey, CreationState, LinkedValue, MercuryError, PropertyDescriptor, Vocabulary, class_of,
    mint_subject, validate_values_against_shape,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Cached access to the backend metadata API.
pub struct MetadataStore<A> {
    api: A,
    origin: String,
    vocabulary: FetchCache<Vocabulary>,
    json_ld: FetchCache<Vec<JsonValue>>,
    combined: FetchCache<Vec<PropertyDescriptor>>,
    entities: FetchCache<Vec<JsonValue>>,
    subjects: FetchCache<String>,
}

impl<A: MetadataApi> MetadataStore<A> {
    /// Create a store over `api`. New subjects are minted under `origin`.
    pub fn new(api: A, origin: impl Into<String>) -> Self {
        Self {
            api,
            origin: origin.into(),
            vocabulary: FetchCache::new("vocabulary"),
            json_ld: FetchCache::new("jsonLd"),
            combined: FetchCache::new("combined"),
            entities: FetchCache::new("entities"),
            subjects: FetchCache::new("subjects"),
        }
    }

    /// The backend API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Origin new subjects are minted under.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    // =========================================================================
    // FETCHES
    // =========================================================================

    /// The shape graph, fetched once per session.
    pub async fn fetch_vocabulary_if_needed(&self) -> Result<Arc<Vocabulary>, ClientError> {
        self.vocabulary
            .get_or_fetch(CacheKey::Vocabulary, || async {
                let nodes = self.api.vocabulary().await?;
                Ok::<_, ClientError>(Vocabulary::new(nodes))
            })
            .await
    }

    /// Raw JSON-LD of `subject`, including labels of referenced resources.
    pub async fn fetch_json_ld_by_subject_if_needed(
        &self,
        subject: &str,
    ) -> Result<Arc<Vec<JsonValue>>, ClientError> {
        self.json_ld
            .get_or_fetch(CacheKey::JsonLd(subject.to_string()), || self.api.get(subject))
            .await
    }

    /// Property descriptors of `subject`: its JSON-LD joined with the
    /// vocabulary. Both inputs are fetched concurrently and cached on their
    /// own keys.
    pub async fn fetch_combined_metadata_if_needed(
        &self,
        subject: &str,
    ) -> Result<Arc<Vec<PropertyDescriptor>>, ClientError> {
        self.combined
            .get_or_fetch(CacheKey::Combined(subject.to_string()), || async {
                let (vocabulary, json_ld) = tokio::join!(
                    self.fetch_vocabulary_if_needed(),
                    self.fetch_json_ld_by_subject_if_needed(subject),
                );
                Ok::<_, ClientError>(vocabulary?.combine(&json_ld?, subject)?)
            })
            .await
    }

    /// All entities of `class`.
    pub async fn fetch_entities_if_needed(
        &self,
        class: &str,
    ) -> Result<Arc<Vec<JsonValue>>, ClientError> {
        self.entities
            .get_or_fetch(CacheKey::EntitiesByType(class.to_string()), || {
                self.api.entities_by_type(class)
            })
            .await
    }

    /// Entities of every class the vocabulary declares in the Fairspace
    /// namespace.
    pub async fn fetch_all_entities_if_needed(&self) -> Result<Arc<Vec<JsonValue>>, ClientError> {
        self.entities
            .get_or_fetch(CacheKey::AllEntities, || async {
                let vocabulary = self.fetch_vocabulary_if_needed().await?;
                let classes: Vec<String> = vocabulary
                    .fairspace_classes()
                    .into_iter()
                    .filter_map(class_of)
                    .map(str::to_string)
                    .collect();
                tracing::debug!(classes = classes.len(), "fetching entities of all classes");
                self.api.entities_by_types(&classes).await
            })
            .await
    }

    /// Subject IRI of the file or directory at `path`.
    pub async fn fetch_subject_by_path_if_needed(
        &self,
        path: &str,
    ) -> Result<Arc<String>, ClientError> {
        self.subjects
            .get_or_fetch(CacheKey::SubjectByPath(path.to_string()), || {
                self.api.subject_by_path(path)
            })
            .await
    }

    // =========================================================================
    // VALIDATION & UPDATES
    // =========================================================================

    /// Check `values` for `predicate` of `subject` against its property shape.
    ///
    /// The shape is looked up through the subject's current types. Predicates
    /// without a shape are not checked.
    pub async fn validate(
        &self,
        subject: &str,
        predicate: &str,
        values: &[LinkedValue],
    ) -> Result<Vec<String>, ClientError> {
        let (vocabulary, json_ld) = tokio::join!(
            self.fetch_vocabulary_if_needed(),
            self.fetch_json_ld_by_subject_if_needed(subject),
        );
        let (vocabulary, json_ld) = (vocabulary?, json_ld?);

        let types = find_node(&json_ld, subject)
            .map(node_types)
            .unwrap_or_default();
        let Some(shape) = vocabulary.property_shape(&types, predicate) else {
            tracing::debug!(subject, predicate, "no property shape; skipping validation");
            return Ok(Vec::new());
        };

        let datatype = get_first_predicate_id(shape, SHACL_DATATYPE);
        Ok(validate_values_against_shape(shape, datatype, values))
    }

    /// Replace the values of `predicate` on `subject`.
    ///
    /// Values failing validation are not sent; the error carries the
    /// messages. On success the subject's cached JSON-LD and descriptors are
    /// dropped.
    pub async fn update_metadata(
        &self,
        subject: &str,
        predicate: &str,
        values: &[LinkedValue],
    ) -> Result<(), ClientError> {
        let errors = self.validate(subject, predicate, values).await?;
        if !errors.is_empty() {
            tracing::debug!(subject, predicate, errors = errors.len(), "update blocked");
            return Err(MercuryError::Validation(errors).into());
        }

        self.api.update(subject, predicate, values).await?;
        tracing::info!(subject, predicate, values = values.len(), "metadata updated");
        self.invalidate_metadata(subject);
        Ok(())
    }

    /// Drop the cached JSON-LD and descriptors of `subject`.
    pub fn invalidate_metadata(&self, subject: &str) {
        self.json_ld.invalidate(&CacheKey::JsonLd(subject.to_string()));
        self.combined.invalidate(&CacheKey::Combined(subject.to_string()));
    }

    // =========================================================================
    // ENTITY CREATION
    // =========================================================================

    /// Create an entity of the class `type_node` stands for.
    ///
    /// `type_node` is a node shape (its `sh:targetClass` is used) or a class
    /// node. Without `id` a random UUID is used. Fails with `AlreadyExists`
    /// and writes nothing when the minted subject already has metadata.
    pub async fn create_metadata_entity(
        &self,
        type_node: &JsonValue,
        id: Option<&str>,
    ) -> Result<String, ClientError> {
        let class = class_of(type_node)
            .ok_or_else(|| {
                MercuryError::InvalidJsonLd("type has neither a target class nor an @id".into())
            })?
            .to_string();
        let id = id.map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);

        let minted = mint_subject(&self.origin, type_node, &id);
        if minted.used_fallback {
            tracing::warn!(
                class = %class,
                infix = %minted.infix,
                "class declares no infix, minting under the generic one"
            );
        }

        let mut state = CreationState::start(minted.subject);
        let existing = self.api.get(state.subject()).await?;
        state = state.existence_checked(existing.len());

        if state.may_assert_type() {
            self.api
                .update(
                    state.subject(),
                    RDF_TYPE,
                    &[LinkedValue::reference(class.clone())],
                )
                .await?;
            state = state.type_asserted();

            self.invalidate_metadata(state.subject());
            self.entities.invalidate(&CacheKey::EntitiesByType(class.clone()));
            self.entities.invalidate(&CacheKey::AllEntities);
            tracing::info!(subject = state.subject(), class = %class, "entity created");
        } else {
            tracing::debug!(subject = state.subject(), "subject already has metadata");
        }

        Ok(state.into_result()?)
    }

    /// Create an entity of `class`, minted with the infix of its node shape
    /// when the vocabulary has one.
    pub async fn create_entity_of_class(
        &self,
        class: &str,
        id: Option<&str>,
    ) -> Result<String, ClientError> {
        let vocabulary = self.fetch_vocabulary_if_needed().await?;
        match vocabulary.shape_for_class(class) {
            Some(shape) => self.create_metadata_entity(shape, id).await,
            None => {
                let node = serde_json::json!({ "@id": class });
                self.create_metadata_entity(&node, id).await
            }
        }
    }
}

impl MetadataStore<HttpMetadataApi> {
    /// A store over the HTTP backend described by `config`.
    pub fn connect(config: &Config) -> Result<Self, ClientError> {
        let api = HttpMetadataApi::new(
            config.backend.url.clone(),
            config.backend.api_key.clone(),
            config.timeout(),
        )?;
        tracing::debug!(url = api.base_url(), origin = config.origin(), "connecting");
        Ok(Self::new(api, config.origin()))
    }
}
