use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{
    ensure_object, merge_fields, Collection, DocumentStore, Filter, StoreError, StoreResult,
};

/// In-process document store.
///
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn set(&self, collection: Collection, id: &str, document: Value) -> StoreResult<()> {
        ensure_object(collection, id, &document)?;
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn query(&self, collection: Collection, filters: &[Filter]) -> StoreResult<Vec<Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(&collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| Filter::matches_all(filters, doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;
        merge_fields(collection, id, document, fields)
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        if let Some(docs) = self.collections.write().await.get_mut(&collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
