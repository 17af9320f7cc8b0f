use crate::adapters::document_store::DocumentStore;
use crate::domain::model::Uom;
use crate::domain::ports::UomRepository;
use crate::utils::error::{Result, UomError};
use async_trait::async_trait;

pub const UOM_COLLECTION: &str = "uoms";

/// `UomRepository` over a document store; the document id is the Uom id.
#[derive(Debug)]
pub struct DocumentUomRepository<S: DocumentStore> {
    store: S,
    collection: String,
}

impl<S: DocumentStore> DocumentUomRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_collection(store, UOM_COLLECTION)
    }

    pub fn with_collection(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn decode(&self, document: serde_json::Value) -> Result<Uom> {
        serde_json::from_value(document).map_err(|e| {
            UomError::persistence(format!(
                "failed to decode document in {}: {}",
                self.collection, e
            ))
        })
    }
}

#[async_trait]
impl<S: DocumentStore> UomRepository for DocumentUomRepository<S> {
    async fn save(&self, uom: &Uom) -> Result<()> {
        let document = serde_json::to_value(uom).map_err(|e| {
            UomError::persistence(format!("failed to encode uom {}: {}", uom.id, e))
        })?;
        tracing::debug!("Saving document {}/{}", self.collection, uom.id);
        self.store.put(&self.collection, &uom.id, document).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Uom>> {
        match self.store.get(&self.collection, id).await? {
            Some(document) => Ok(Some(self.decode(document)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<Uom>> {
        let documents = self.store.list(&self.collection).await?;
        documents
            .into_iter()
            .map(|document| self.decode(document))
            .collect()
    }

    async fn delete(&self, id: &str) -> Result<()> {
        tracing::debug!("Deleting document {}/{}", self.collection, id);
        self.store.remove(&self.collection, id).await
    }
}
