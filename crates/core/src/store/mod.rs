//! Document store abstraction.
//!
//! Ward persists every record as a JSON document addressed by a collection and a document id.
//! The [`DocumentStore`] trait is the only way services touch persistence, so the backing store
//! can be swapped without touching the data access layer:
//!
//! - [`MemoryStore`]: process-local maps, used by tests and `WARD_STORE=memory`
//! - [`FileStore`]: one JSON file per document in a sharded directory tree
//!
//! Single-document writes are atomic with respect to readers of the same store; nothing spans
//! more than one document.

mod file;
mod filter;
mod memory;

pub use file::FileStore;
pub use filter::Filter;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use ward_uuid::DocumentId;

/// The collections Ward stores documents in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Patients,
    Centers,
    Visits,
    Vitals,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Patients,
        Collection::Centers,
        Collection::Visits,
        Collection::Vitals,
    ];

    /// Collection name, also used as the file store's directory name.
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Patients => "patients",
            Collection::Centers => "centers",
            Collection::Visits => "visits",
            Collection::Vitals => "vitals",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: Collection, id: String },
    #[error("invalid document id: {0}")]
    InvalidId(String),
    #[error("document {collection}/{id} is not a JSON object")]
    NotAnObject { collection: Collection, id: String },
    #[error("failed to create store directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to read store directory: {0}")]
    DirRead(std::io::Error),
    #[error("failed to read document file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write document file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to remove document file: {0}")]
    FileRemove(std::io::Error),
    #[error("failed to serialize document: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize document: {0}")]
    Deserialization(serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Collection/document key-value store with simple equality and range filters.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Allocates an identifier for a new document.
    fn generate_id(&self) -> DocumentId {
        DocumentId::new()
    }

    /// Creates or fully replaces a document. `document` must be a JSON object.
    async fn set(&self, collection: Collection, id: &str, document: Value) -> StoreResult<()>;

    /// Returns the document, or `None` when no document has that id.
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Value>>;

    /// Returns every document in the collection matching all `filters`.
    ///
    /// No ordering is guaranteed.
    async fn query(&self, collection: Collection, filters: &[Filter]) -> StoreResult<Vec<Value>>;

    /// Shallow-merges `fields` into an existing document.
    ///
    /// Returns [`StoreError::NotFound`] if the document does not exist.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()>;

    /// Removes a document. Removing an absent document is not an error.
    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()>;
}

/// Merges `fields` into `document`, which must be an object.
pub(crate) fn merge_fields(
    collection: Collection,
    id: &str,
    document: &mut Value,
    fields: Map<String, Value>,
) -> StoreResult<()> {
    let object = document
        .as_object_mut()
        .ok_or_else(|| StoreError::NotAnObject {
            collection,
            id: id.to_string(),
        })?;
    object.extend(fields);
    Ok(())
}

pub(crate) fn ensure_object(collection: Collection, id: &str, document: &Value) -> StoreResult<()> {
    if document.is_object() {
        Ok(())
    } else {
        Err(StoreError::NotAnObject {
            collection,
            id: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_fields_overwrites_and_adds() {
        let mut doc = json!({ "status": "En espera", "fullName": "Juan" });
        let mut fields = Map::new();
        fields.insert("status".into(), json!("De alta"));
        fields.insert("updatedAt".into(), json!("2026-01-01T00:00:00Z"));

        merge_fields(Collection::Patients, "p1", &mut doc, fields).expect("merge should succeed");

        assert_eq!(
            doc,
            json!({ "status": "De alta", "fullName": "Juan", "updatedAt": "2026-01-01T00:00:00Z" })
        );
    }

    #[test]
    fn test_merge_fields_rejects_non_object() {
        let mut doc = json!([1, 2, 3]);
        let err = merge_fields(Collection::Vitals, "v1", &mut doc, Map::new())
            .expect_err("array document should be rejected");
        assert!(matches!(err, StoreError::NotAnObject { .. }));
    }
}
