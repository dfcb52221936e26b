//! # Mercury
//!
//! The async metadata client - THE CLIENT.
//!
//! - `backend`: the backend metadata API contract and its HTTP implementation
//! - `store`: cached, deduplicated fetches, validated updates, entity creation
//! - `scope`: view scopes for fetches whose results may outlive their view
//! - `config`: `mercury.toml` plus environment overrides
//!
//! The metadata logic itself lives in `mercury-core`.

pub mod backend;
pub mod config;
pub mod error;
pub mod scope;
pub mod store;

pub use backend::{HttpMetadataApi, MetadataApi};
pub use config::Config;
pub use error::ClientError;
pub use scope::{ScopedTask, ViewScope};
pub use store::{FetchCache, MetadataStore};
