//! # mercury-core
//!
//! The linked-data metadata core for Mercury - THE LOGIC.
//!
//! Everything a metadata view needs between the backend's JSON-LD and the
//! screen, without any I/O:
//! - `jsonld`: normalizing and reading expanded JSON-LD nodes
//! - `vocabulary`: queries over the SHACL shape graph
//! - `validation`: shape-driven checks on candidate values
//! - `combination`: instance data joined with the vocabulary
//! - `cache`: the injectable fetch cache and its dispatch guard
//! - `entity`: subject minting and the entity creation state machine
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Deterministic: `BTreeMap`/`BTreeSet` only
//! - State is passed in explicitly; nothing here is global

// =============================================================================
// MODULES
// =============================================================================

pub mod cache;
pub mod combination;
pub mod entity;
pub mod jsonld;
pub mod types;
pub mod validation;
pub mod vocab;
pub mod vocabulary;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{LinkedValue, MercuryError};

// =============================================================================
// RE-EXPORTS: Metadata Logic
// =============================================================================

pub use cache::{
    CacheEntry, CacheKey, CacheStatus, CacheStore, Dispatch, Ticket, dispatch_if_needed,
};
pub use combination::PropertyDescriptor;
pub use entity::{CreationState, MintedSubject, class_of, mint_subject};
pub use jsonld::{
    get_first_predicate_id, get_first_predicate_value, local_name, normalize_resource,
};
pub use validation::validate_values_against_shape;
pub use vocabulary::{Vocabulary, get_max_count, get_single_value};
