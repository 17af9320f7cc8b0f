//! Collection/id keyed JSON document stores.
//!
//! Both backends behave like a document database: `put` overwrites, `get` of
//! a missing document is `Ok(None)`, and `remove` of a missing document is a
//! no-op.

use crate::utils::error::{Result, UomError};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub trait DocumentStore: Send + Sync {
    fn put(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> impl Future<Output = Result<()>> + Send;

    fn get(&self, collection: &str, id: &str) -> impl Future<Output = Result<Option<Value>>> + Send;

    fn list(&self, collection: &str) -> impl Future<Output = Result<Vec<Value>>> + Send;

    fn remove(&self, collection: &str, id: &str) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

/// One JSON file per document under `<base_path>/<collection>/<id>.json`.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    base_path: PathBuf,
}

fn is_valid_segment(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn check_segment(kind: &str, value: &str) -> Result<()> {
    if is_valid_segment(value) {
        Ok(())
    } else {
        Err(UomError::persistence(format!(
            "invalid {} {:?}: only ASCII letters, digits, '-' and '_' are allowed",
            kind, value
        )))
    }
}

impl LocalDocumentStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf> {
        check_segment("collection", collection)?;
        Ok(self.base_path.join(collection))
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf> {
        check_segment("document id", id)?;
        Ok(self.collection_dir(collection)?.join(format!("{}.json", id)))
    }
}

impl DocumentStore for LocalDocumentStore {
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<()> {
        let full_path = self.document_path(collection, id)?;
        let data = serde_json::to_vec_pretty(&document)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                UomError::persistence(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        // write-then-rename keeps readers from seeing a half-written document
        let tmp_path = full_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, data).await.map_err(|e| {
            UomError::persistence(format!(
                "failed to save document to {}/{}: {}",
                collection, id, e
            ))
        })?;
        tokio::fs::rename(&tmp_path, &full_path).await.map_err(|e| {
            UomError::persistence(format!(
                "failed to save document to {}/{}: {}",
                collection, id, e
            ))
        })?;
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        // put never writes such an id, so it cannot exist
        if !is_valid_segment(id) {
            check_segment("collection", collection)?;
            return Ok(None);
        }
        let full_path = self.document_path(collection, id)?;
        match tokio::fs::read(&full_path).await {
            Ok(data) => {
                let value = serde_json::from_slice(&data).map_err(|e| {
                    UomError::persistence(format!(
                        "corrupt document {}/{}: {}",
                        collection, id, e
                    ))
                })?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(UomError::persistence(format!(
                "failed to get document from {}/{}: {}",
                collection, id, e
            ))),
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let dir = self.collection_dir(collection)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(UomError::persistence(format!(
                    "failed to get all documents from {}: {}",
                    collection, e
                )))
            }
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            UomError::persistence(format!(
                "failed to get all documents from {}: {}",
                collection, e
            ))
        })? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let data = match tokio::fs::read(&path).await {
                Ok(data) => data,
                // removed between listing and reading
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(UomError::persistence(format!(
                        "failed to read {}: {}",
                        path.display(),
                        e
                    )))
                }
            };
            let value = serde_json::from_slice(&data).map_err(|e| {
                UomError::persistence(format!("corrupt document {}: {}", path.display(), e))
            })?;
            documents.push(value);
        }
        Ok(documents)
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<()> {
        if !is_valid_segment(id) {
            check_segment("collection", collection)?;
            return Ok(());
        }
        let full_path = self.document_path(collection, id)?;
        match tokio::fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UomError::persistence(format!(
                "failed to delete document from {}/{}: {}",
                collection, id, e
            ))),
        }
    }
}
