use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::{options::ClientOptions, Client, Database};
use serde_json::Value;
use std::time::Duration;

use crate::store::{DocumentStore, StoreError, StoredDocument};

/// Document store backed by a MongoDB database.
///
/// Each collection maps to a MongoDB collection. `created_at` and
/// `updated_at` are written as BSON dates next to the document fields.
pub struct MongoDocumentStore {
    db: Database,
    name: String,
}

impl MongoDocumentStore {
    /// Builds the client without waiting for a server; connections are
    /// established on first use.
    pub async fn connect(uri: &str, name: &str) -> Result<Self, StoreError> {
        if !is_valid_database_name(name) {
            return Err(StoreError::InvalidConfig(format!(
                "DATABASE_NAME '{}' is not a valid MongoDB database name",
                name
            )));
        }

        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.server_selection_timeout = Some(Duration::from_secs(5));
        let client = Client::with_options(options)?;

        Ok(Self {
            db: client.database(name),
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    fn database_name(&self) -> &str {
        &self.name
    }

    async fn insert(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidDocument(
                "document must be a JSON object".to_string(),
            ));
        }

        let mut body = bson::to_document(&document)
            .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
        let now = bson::DateTime::now();
        body.insert("created_at", now);
        body.insert("updated_at", now);

        let result = self
            .db
            .collection::<Document>(collection)
            .insert_one(body)
            .await?;

        Ok(match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        })
    }

    async fn list(
        &self,
        collection: &str,
        limit: Option<u64>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let coll = self.db.collection::<Document>(collection);
        let mut find = coll
            .find(doc! {})
            .sort(doc! { "created_at": -1 });
        if let Some(n) = limit {
            find = find.limit(i64::try_from(n).unwrap_or(i64::MAX));
        }

        let documents: Vec<Document> = find.await?.try_collect().await?;

        Ok(documents.into_iter().map(stored_document).collect())
    }

    async fn collection_names(&self, max: usize) -> Result<Vec<String>, StoreError> {
        let mut names = self.db.list_collection_names().await?;
        names.sort();
        names.truncate(max);
        Ok(names)
    }
}

/// Splits the store-assigned `_id` and timestamps off a raw document.
///
/// Documents written elsewhere may lack the timestamps; the ObjectId creation
/// time stands in for `created_at` then.
fn stored_document(mut document: Document) -> StoredDocument {
    let (id, minted_at) = match document.remove("_id") {
        Some(Bson::ObjectId(oid)) => (oid.to_hex(), Some(oid.timestamp())),
        Some(other) => (other.to_string(), None),
        None => (String::new(), None),
    };

    let created_at = take_datetime(&mut document, "created_at")
        .or(minted_at)
        .map(to_chrono)
        .unwrap_or_else(Utc::now);
    let updated_at = take_datetime(&mut document, "updated_at")
        .map(to_chrono)
        .unwrap_or(created_at);

    StoredDocument {
        id,
        body: Bson::Document(document).into_relaxed_extjson(),
        created_at,
        updated_at,
    }
}

fn take_datetime(document: &mut Document, key: &str) -> Option<bson::DateTime> {
    let value = document.get_datetime(key).ok().copied()?;
    document.remove(key);
    Some(value)
}

fn to_chrono(value: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

/// MongoDB rejects empty names and names containing `/\. "$`.
fn is_valid_database_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() < 64
        && !name
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '.' | ' ' | '"' | '$' | '\0'))
}
