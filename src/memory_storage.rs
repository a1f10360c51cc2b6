use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{DocumentStore, StoreError, StoredDocument};

/// In-process document store selected with a `memory://` URL.
///
/// Contents live for the lifetime of the process only.
pub struct MemoryStore {
    name: String,
    collections: RwLock<BTreeMap<String, Vec<StoredDocument>>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: RwLock::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn database_name(&self) -> &str {
        &self.name
    }

    async fn insert(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidDocument(
                "document must be a JSON object".to_string(),
            ));
        }

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                body: document,
                created_at: now,
                updated_at: now,
            });

        Ok(id)
    }

    async fn list(
        &self,
        collection: &str,
        limit: Option<u64>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let take = limit
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX);

        // Documents are appended in creation order, so newest first is reverse order.
        Ok(documents.iter().rev().take(take).cloned().collect())
    }

    async fn collection_names(&self, max: usize) -> Result<Vec<String>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .keys()
            .take(max)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_then_list_newest_first() {
        let store = MemoryStore::new("coach");
        let first = store.insert("lead", json!({"name": "a"})).await.unwrap();
        let second = store.insert("lead", json!({"name": "b"})).await.unwrap();

        let docs = store.list("lead", None).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, second);
        assert_eq!(docs[1].id, first);
        assert_eq!(docs[0].body["name"], "b");
        assert_eq!(docs[0].created_at, docs[0].updated_at);
    }

    #[tokio::test]
    async fn list_respects_limit() {
        let store = MemoryStore::new("coach");
        for i in 0..5 {
            store.insert("lead", json!({ "n": i })).await.unwrap();
        }

        let docs = store.list("lead", Some(2)).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].body["n"], 4);
        assert_eq!(docs[1].body["n"], 3);
    }

    #[tokio::test]
    async fn unknown_collection_is_empty() {
        let store = MemoryStore::new("coach");

        assert!(store.list("missing", Some(10)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_non_object_documents() {
        let store = MemoryStore::new("coach");

        let result = store.insert("lead", json!("just a string")).await;

        assert!(matches!(result, Err(StoreError::InvalidDocument(_))));
    }

    #[tokio::test]
    async fn collection_names_are_sorted_and_bounded() {
        let store = MemoryStore::new("coach");
        for name in ["lead", "audit", "contact"] {
            store.insert(name, json!({})).await.unwrap();
        }

        assert_eq!(
            store.collection_names(10).await.unwrap(),
            vec!["audit", "contact", "lead"]
        );
        assert_eq!(store.collection_names(2).await.unwrap().len(), 2);
    }
}
