use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::database::paths::CollectionPath;
use crate::database::store::{Document, DocumentStore, Query, StoreError};

/// Typed access to one collection. Documents are (de)serialized with serde;
/// the document id is not part of the body unless the model stores it.
pub struct Repository<T> {
    collection: CollectionPath,
    store: Arc<dyn DocumentStore>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(collection: CollectionPath, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection,
            store,
            _phantom: std::marker::PhantomData,
        }
    }

    fn decode(doc: Document) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(doc.data))?)
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>, StoreError> {
        let path = self.collection.doc(id)?;
        self.store.get(&path).await?.map(Self::decode).transpose()
    }

    pub async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.collection.doc(id)?;
        Ok(self.store.get(&path).await?.is_some())
    }

    pub async fn list(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        self.store
            .list(&self.collection, query)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    /// Listing that keeps document ids next to the decoded models.
    pub async fn list_with_ids(&self, query: &Query) -> Result<Vec<(String, T)>, StoreError> {
        self.store
            .list(&self.collection, query)
            .await?
            .into_iter()
            .map(|doc| {
                let id = doc.id().to_string();
                Self::decode(doc).map(|model| (id, model))
            })
            .collect()
    }

    pub async fn insert(&self, id: &str, model: &T) -> Result<(), StoreError> {
        let path = self.collection.doc(id)?;
        self.store.create(&path, serde_json::to_value(model)?).await?;
        Ok(())
    }

    pub async fn upsert(&self, id: &str, model: &T) -> Result<(), StoreError> {
        let path = self.collection.doc(id)?;
        self.store.set(&path, serde_json::to_value(model)?).await?;
        Ok(())
    }

    /// Merge a partial body and return the updated model.
    pub async fn merge(&self, id: &str, patch: Value) -> Result<T, StoreError> {
        let path = self.collection.doc(id)?;
        Self::decode(self.store.merge(&path, patch).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.collection.doc(id)?;
        self.store.delete(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryDocumentStore;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Note {
        text: String,
        #[serde(default)]
        pinned: bool,
    }

    fn repo() -> Repository<Note> {
        Repository::new(
            CollectionPath::parse("organizations/o/locations/l/notes").unwrap(),
            Arc::new(MemoryDocumentStore::new()),
        )
    }

    #[tokio::test]
    async fn typed_round_trip_and_merge() {
        let repo = repo();
        repo.insert("n1", &Note { text: "hello".into(), pinned: false }).await.unwrap();
        assert!(repo.insert("n1", &Note { text: "dup".into(), pinned: false }).await.is_err());

        let merged = repo.merge("n1", json!({"pinned": true})).await.unwrap();
        assert_eq!(merged, Note { text: "hello".into(), pinned: true });

        assert!(repo.find("missing").await.unwrap().is_none());
        assert_eq!(repo.list_with_ids(&Query::new()).await.unwrap().len(), 1);
    }
}
