//! Helpers shared by every collection service.
//!
//! Records are stored as their serde JSON form. Reading a single record propagates decode
//! failures; listing logs and skips documents that no longer decode, so one bad document cannot
//! take a whole listing down.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::WardResult;
use crate::store::{Collection, DocumentStore, Filter, StoreError};

pub(crate) async fn save<T: Serialize>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
    record: &T,
) -> WardResult<()> {
    let document = serde_json::to_value(record).map_err(StoreError::Serialization)?;
    store.set(collection, id, document).await?;
    Ok(())
}

pub(crate) async fn load<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> WardResult<Option<T>> {
    match store.get(collection, id).await? {
        Some(document) => Ok(Some(decode(document)?)),
        None => Ok(None),
    }
}

pub(crate) async fn load_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    filters: &[Filter],
) -> WardResult<Vec<T>> {
    let documents = store.query(collection, filters).await?;
    let mut records = Vec::with_capacity(documents.len());
    for document in documents {
        match decode(document) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("skipping malformed {} document: {}", collection, e),
        }
    }
    Ok(records)
}

fn decode<T: DeserializeOwned>(document: Value) -> Result<T, StoreError> {
    serde_json::from_value(document).map_err(StoreError::Deserialization)
}

/// Serializes a timestamp exactly as it appears inside a stored record.
pub(crate) fn timestamp_value(at: DateTime<Utc>) -> WardResult<Value> {
    Ok(serde_json::to_value(at).map_err(StoreError::Serialization)?)
}

/// `now`, unless the record's clock reading is already ahead of it.
///
/// Keeps `updatedAt` monotonic per record even if the wall clock steps backwards.
pub(crate) fn next_update_time(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous)
}
