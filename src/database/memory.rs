use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::database::paths::{CollectionPath, DocPath};
use crate::database::store::{into_object, Direction, Document, DocumentStore, Query, StoreError};

/// In-process document store. Collections are keyed by their full path and
/// hold documents ordered by id.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&path.collection().to_string())
            .and_then(|docs| docs.get(path.id()))
            .cloned())
    }

    async fn set(&self, path: &DocPath, data: Value) -> Result<Document, StoreError> {
        let data = into_object(path, data)?;
        let now = Utc::now();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(path.collection().to_string()).or_default();
        let created_at = docs.get(path.id()).map(|d| d.created_at).unwrap_or(now);
        let doc = Document {
            path: path.clone(),
            data,
            created_at,
            updated_at: now,
        };
        docs.insert(path.id().to_string(), doc.clone());
        Ok(doc)
    }

    async fn create(&self, path: &DocPath, data: Value) -> Result<Document, StoreError> {
        let data = into_object(path, data)?;
        let now = Utc::now();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(path.collection().to_string()).or_default();
        if docs.contains_key(path.id()) {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        let doc = Document {
            path: path.clone(),
            data,
            created_at: now,
            updated_at: now,
        };
        docs.insert(path.id().to_string(), doc.clone());
        Ok(doc)
    }

    async fn merge(&self, path: &DocPath, patch: Value) -> Result<Document, StoreError> {
        let patch: Map<String, Value> = into_object(path, patch)?;
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(&path.collection().to_string())
            .and_then(|docs| docs.get_mut(path.id()))
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        for (key, value) in patch {
            doc.data.insert(key, value);
        }
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete(&self, path: &DocPath) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(&path.collection().to_string())
            .and_then(|docs| docs.remove(path.id()))
            .is_some();
        if removed {
            // Sub-collections go with their parent document.
            let prefix = format!("{}/", path);
            collections.retain(|key, _| !key.starts_with(&prefix));
        }
        Ok(removed)
    }

    async fn list(&self, collection: &CollectionPath, query: &Query) -> Result<Vec<Document>, StoreError> {
        query.validate()?;
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(&collection.to_string())
            .map(|docs| {
                docs.values()
                    .filter(|d| query.matches(d.id(), &d.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, direction)) = &query.order_by {
            docs.sort_by(|a, b| {
                let ord = compare_values(a.data.get(field), b.data.get(field))
                    .then_with(|| a.id().cmp(b.id()));
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            docs.truncate(limit);
        }
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::paths::CollectionPath;
    use serde_json::json;

    fn col() -> CollectionPath {
        CollectionPath::parse("organizations/o/locations/l/messages").unwrap()
    }

    #[tokio::test]
    async fn set_get_merge_delete() {
        let store = MemoryDocumentStore::new();
        let path = col().doc("m1").unwrap();
        store.set(&path, json!({"a": 1, "b": "x"})).await.unwrap();
        let merged = store.merge(&path, json!({"b": "y"})).await.unwrap();
        assert_eq!(merged.data["a"], 1);
        assert_eq!(merged.data["b"], "y");
        assert!(store.delete(&path).await.unwrap());
        assert!(store.get(&path).await.unwrap().is_none());
        assert!(matches!(
            store.merge(&path, json!({})).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn create_refuses_existing() {
        let store = MemoryDocumentStore::new();
        let path = col().doc("m1").unwrap();
        store.create(&path, json!({})).await.unwrap();
        assert!(matches!(
            store.create(&path, json!({})).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn list_filters_and_orders() {
        let store = MemoryDocumentStore::new();
        for (id, thread, ts) in [("c", "t1", "2025-01-03"), ("a", "t1", "2025-01-01"), ("b", "t2", "2025-01-02")] {
            store
                .set(&col().doc(id).unwrap(), json!({"threadId": thread, "createdAt": ts}))
                .await
                .unwrap();
        }
        let docs = store
            .list(
                &col(),
                &Query::new()
                    .where_eq("threadId", "t1")
                    .order_by("createdAt", Direction::Desc),
            )
            .await
            .unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn deleting_parent_drops_subcollections() {
        let store = MemoryDocumentStore::new();
        let child = CollectionPath::parse("organizations/o/locations/l/children")
            .unwrap()
            .doc("5030615123456")
            .unwrap();
        store.set(&child, json!({"nume": "Pop"})).await.unwrap();
        let day = child.sub("attendance").unwrap().doc("2025-01-06").unwrap();
        store.set(&day, json!({"status": "present"})).await.unwrap();
        store.delete(&child).await.unwrap();
        assert!(store.get(&day).await.unwrap().is_none());
    }
}
