//! # Backend Metadata API
//!
//! The contract Mercury needs from the backend. The backend owns the wire
//! format; this trait only fixes what goes in and what comes back:
//! expanded JSON-LD node arrays.
//!
//! [`HttpMetadataApi`] talks to a real backend. Tests plug in fakes.

mod http;

pub use http::HttpMetadataApi;

use crate::ClientError;
use mercury_core::LinkedValue;
use serde_json::Value as JsonValue;
use std::future::Future;

/// Read/update access to linked-data metadata.
///
/// Futures are `Send` so fetches can run on spawned tasks.
pub trait MetadataApi: Send + Sync + 'static {
    /// All statements about `subject`, including labels of referenced
    /// resources. Empty when the subject is unknown.
    fn get(&self, subject: &str)
    -> impl Future<Output = Result<Vec<JsonValue>, ClientError>> + Send;

    /// Replace the values of `predicate` on `subject`.
    fn update(
        &self,
        subject: &str,
        predicate: &str,
        values: &[LinkedValue],
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// The full shape graph.
    fn vocabulary(&self) -> impl Future<Output = Result<Vec<JsonValue>, ClientError>> + Send;

    /// All entities of `class`.
    fn entities_by_type(
        &self,
        class: &str,
    ) -> impl Future<Output = Result<Vec<JsonValue>, ClientError>> + Send;

    /// All entities of any of `classes`, in class order.
    fn entities_by_types(
        &self,
        classes: &[String],
    ) -> impl Future<Output = Result<Vec<JsonValue>, ClientError>> + Send {
        async move {
            let mut entities = Vec::new();
            for class in classes {
                entities.extend(self.entities_by_type(class).await?);
            }
            Ok(entities)
        }
    }

    /// Subject IRI of the file or directory at `path`.
    fn subject_by_path(&self, path: &str)
    -> impl Future<Output = Result<String, ClientError>> + Send;
}
