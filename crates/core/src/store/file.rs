//! File-backed document store.
//!
//! ## Storage Layout
//!
//! ```text
//! <root>/
//!   <collection>/
//!     <s1>/
//!       <s2>/
//!         <id>.json
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the document id. Each write goes to
//! its own `<id>.<nonce>.partial` sibling first and is renamed into place, so readers never
//! observe a half-written document. Writers to the same document are serialized by a per-path
//! lock held across the whole read-merge-write of `update`.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};
use ward_uuid::DocumentId;

use super::{
    ensure_object, merge_fields, Collection, DocumentStore, Filter, StoreError, StoreResult,
};
use crate::constants::{DOCUMENT_EXTENSION, PARTIAL_EXTENSION};

type DocumentLocks = HashMap<PathBuf, Arc<Mutex<()>>>;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    locks: Arc<Mutex<DocumentLocks>>,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    ///
    /// Runs once at startup, so it uses blocking filesystem calls.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        for collection in Collection::ALL {
            std::fs::create_dir_all(root.join(collection.as_str()))
                .map_err(StoreError::DirCreation)?;
        }
        Ok(Self {
            root,
            locks: Arc::default(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.as_str())
    }

    fn document_path(&self, collection: Collection, id: &DocumentId) -> PathBuf {
        id.sharded_file(&self.collection_dir(collection), DOCUMENT_EXTENSION)
    }

    /// Takes the write lock for one document file.
    ///
    /// Entries nobody holds or waits on are pruned each time a lock is taken.
    async fn lock_document(&self, path: &Path) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(path.to_path_buf()).or_default())
        };
        lock.lock_owned().await
    }

    async fn read_document(&self, path: &Path) -> StoreResult<Option<Value>> {
        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::FileRead(e)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(StoreError::Deserialization)
    }

    async fn write_document(&self, path: &Path, document: &Value) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(StoreError::DirCreation)?;
        }
        let json = serde_json::to_vec_pretty(document).map_err(StoreError::Serialization)?;
        let partial = path.with_extension(format!("{}.{}", DocumentId::new(), PARTIAL_EXTENSION));
        fs::write(&partial, json)
            .await
            .map_err(StoreError::FileWrite)?;
        if let Err(e) = fs::rename(&partial, path).await {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                tracing::warn!("leaving partial file {}: {}", partial.display(), cleanup);
            }
            return Err(StoreError::FileWrite(e));
        }
        Ok(())
    }

    /// Lists every document file in a collection by walking the two shard levels.
    async fn document_files(&self, collection: Collection) -> StoreResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        let mut s1_iter = match fs::read_dir(self.collection_dir(collection)).await {
            Ok(it) => it,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(StoreError::DirRead(e)),
        };
        while let Some(s1) = s1_iter.next_entry().await.map_err(StoreError::DirRead)? {
            let Ok(mut s2_iter) = fs::read_dir(s1.path()).await else {
                continue;
            };
            while let Some(s2) = s2_iter.next_entry().await.map_err(StoreError::DirRead)? {
                let Ok(mut doc_iter) = fs::read_dir(s2.path()).await else {
                    continue;
                };
                while let Some(doc) = doc_iter.next_entry().await.map_err(StoreError::DirRead)? {
                    let path = doc.path();
                    if path.extension().and_then(|ext| ext.to_str()) == Some(DOCUMENT_EXTENSION) {
                        files.push(path);
                    }
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn set(&self, collection: Collection, id: &str, document: Value) -> StoreResult<()> {
        ensure_object(collection, id, &document)?;
        let id = DocumentId::parse(id).map_err(|e| StoreError::InvalidId(e.to_string()))?;
        let path = self.document_path(collection, &id);
        let _guard = self.lock_document(&path).await;
        self.write_document(&path, &document).await
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Value>> {
        // Non-canonical ids can never have been written.
        let Ok(id) = DocumentId::parse(id) else {
            return Ok(None);
        };
        self.read_document(&self.document_path(collection, &id))
            .await
    }

    async fn query(&self, collection: Collection, filters: &[Filter]) -> StoreResult<Vec<Value>> {
        let mut documents = Vec::new();
        for path in self.document_files(collection).await? {
            match self.read_document(&path).await {
                Ok(Some(document)) if Filter::matches_all(filters, &document) => {
                    documents.push(document)
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("skipping unreadable document {}: {}", path.display(), e);
                }
            }
        }
        Ok(documents)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()> {
        let not_found = || StoreError::NotFound {
            collection,
            id: id.to_string(),
        };
        let doc_id = DocumentId::parse(id).map_err(|_| not_found())?;
        let path = self.document_path(collection, &doc_id);
        let _guard = self.lock_document(&path).await;

        let mut document = self.read_document(&path).await?.ok_or_else(not_found)?;
        merge_fields(collection, id, &mut document, fields)?;
        self.write_document(&path, &document).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let Ok(id) = DocumentId::parse(id) else {
            return Ok(());
        };
        let path = self.document_path(collection, &id);
        let _guard = self.lock_document(&path).await;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::FileRemove(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, FileStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::open(temp_dir.path()).expect("open should succeed");
        (temp_dir, store)
    }

    fn partial_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(PARTIAL_EXTENSION))
            .collect()
    }

    #[test]
    fn test_open_creates_collection_directories() {
        let (temp_dir, _store) = open_store();
        for collection in Collection::ALL {
            assert!(temp_dir.path().join(collection.as_str()).is_dir());
        }
    }

    #[tokio::test]
    async fn test_set_writes_sharded_file_and_get_reads_it_back() {
        let (temp_dir, store) = open_store();
        let id = DocumentId::new();
        let doc = json!({ "fullName": "Juan Pérez", "birthYear": 1980 });

        store
            .set(Collection::Patients, &id.to_string(), doc.clone())
            .await
            .expect("set should succeed");

        let expected_path = id.sharded_file(&temp_dir.path().join("patients"), "json");
        assert!(expected_path.is_file(), "document file should exist");
        assert!(
            partial_files(expected_path.parent().unwrap()).is_empty(),
            "partial file should be renamed away"
        );

        let read = store
            .get(Collection::Patients, &id.to_string())
            .await
            .expect("get should succeed");
        assert_eq!(read, Some(doc));
    }

    #[tokio::test]
    async fn test_get_with_non_canonical_id_is_absent() {
        let (_temp_dir, store) = open_store();
        let read = store
            .get(Collection::Patients, "../../etc/passwd")
            .await
            .expect("get should succeed");
        assert_eq!(read, None);
    }

    #[tokio::test]
    async fn test_set_rejects_non_canonical_id() {
        let (_temp_dir, store) = open_store();
        let err = store
            .set(Collection::Patients, "p1", json!({}))
            .await
            .expect_err("non-canonical id should be rejected");
        assert!(matches!(err, StoreError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_query_filters_and_skips_corrupt_documents() {
        let (temp_dir, store) = open_store();
        for patient in ["p1", "p1", "p2"] {
            store
                .set(
                    Collection::Visits,
                    &DocumentId::new().to_string(),
                    json!({ "patientId": patient, "centerId": "c1" }),
                )
                .await
                .unwrap();
        }

        let corrupt = DocumentId::new().sharded_file(&temp_dir.path().join("visits"), "json");
        std::fs::create_dir_all(corrupt.parent().unwrap()).unwrap();
        std::fs::write(&corrupt, "{ not json").unwrap();

        let all = store.query(Collection::Visits, &[]).await.unwrap();
        assert_eq!(all.len(), 3, "corrupt document should be skipped");

        let p1 = store
            .query(Collection::Visits, &[Filter::eq("patientId", "p1")])
            .await
            .unwrap();
        assert_eq!(p1.len(), 2);
    }

    #[tokio::test]
    async fn test_query_on_empty_store_returns_nothing() {
        let (_temp_dir, store) = open_store();
        assert!(store.query(Collection::Vitals, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_fields_on_disk() {
        let (_temp_dir, store) = open_store();
        let id = DocumentId::new().to_string();
        store
            .set(Collection::Patients, &id, json!({ "status": "En espera", "birthYear": 1980 }))
            .await
            .unwrap();

        let mut fields = Map::new();
        fields.insert("status".into(), json!("De alta"));
        store
            .update(Collection::Patients, &id, fields)
            .await
            .expect("update should succeed");

        let read = store.get(Collection::Patients, &id).await.unwrap().unwrap();
        assert_eq!(read, json!({ "status": "De alta", "birthYear": 1980 }));
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let (_temp_dir, store) = open_store();
        let err = store
            .update(Collection::Patients, &DocumentId::new().to_string(), Map::new())
            .await
            .expect_err("should fail");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_tolerates_absence() {
        let (_temp_dir, store) = open_store();
        let id = DocumentId::new().to_string();
        store
            .set(Collection::Visits, &id, json!({ "patientId": "p1" }))
            .await
            .unwrap();

        store.delete(Collection::Visits, &id).await.unwrap();
        assert_eq!(store.get(Collection::Visits, &id).await.unwrap(), None);
        store
            .delete(Collection::Visits, &id)
            .await
            .expect("second delete should be a no-op");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_to_one_document_keep_every_field() {
        let (temp_dir, store) = open_store();
        let id = DocumentId::new();
        store
            .set(Collection::Patients, &id.to_string(), json!({ "status": "En espera" }))
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for writer in 0..8 {
            let store = store.clone();
            let id = id.to_string();
            tasks.push(tokio::spawn(async move {
                for round in 0..25 {
                    let mut fields = Map::new();
                    fields.insert(format!("w{writer}r{round}"), json!(round));
                    store.update(Collection::Patients, &id, fields).await?;
                }
                Ok::<_, StoreError>(())
            }));
        }
        for task in tasks {
            task.await
                .expect("writer task should not panic")
                .expect("every update should succeed");
        }

        let read = store
            .get(Collection::Patients, &id.to_string())
            .await
            .unwrap()
            .unwrap();
        let fields = read.as_object().unwrap();
        assert_eq!(fields.len(), 1 + 8 * 25, "no merged field should be lost");
        assert_eq!(fields["status"], "En espera");

        let path = id.sharded_file(&temp_dir.path().join("patients"), "json");
        assert!(partial_files(path.parent().unwrap()).is_empty());
        assert!(store.locks.lock().await.values().all(|l| Arc::strong_count(l) == 1));
    }
}
