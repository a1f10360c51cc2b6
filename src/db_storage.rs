use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::store::{DocumentStore, StoreError, StoredDocument};

/// SQLSTATE `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";
/// SQLSTATE `invalid_schema_name`.
const INVALID_SCHEMA_NAME: &str = "3F000";

/// Row layout of the `documents` table.
#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    body: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        StoredDocument {
            id: row.id.to_string(),
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Document store backed by a Postgres schema with a single JSONB table.
///
/// The database name selects the schema; each document carries its collection
/// name in a column, so a "collection" is the set of rows sharing that value.
/// Reads never issue DDL: a missing schema or table reads as empty, and the
/// table is only created when an insert finds it missing.
pub struct PgDocumentStore {
    pool: PgPool,
    schema: String,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool, schema: &str) -> Result<Self, StoreError> {
        if !is_valid_identifier(schema) {
            return Err(StoreError::InvalidConfig(format!(
                "DATABASE_NAME '{}' is not a valid schema name",
                schema
            )));
        }

        Ok(Self {
            pool,
            schema: schema.to_string(),
        })
    }

    fn table(&self) -> String {
        format!("\"{}\".documents", self.schema)
    }

    /// Creates the schema, table and index.
    async fn create_schema(&self) -> Result<(), StoreError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", self.schema))
            .execute(&self.pool)
            .await?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                collection TEXT NOT NULL,
                body JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
            self.table()
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS documents_collection_created_idx ON {} (collection, created_at DESC)",
            self.table()
        ))
        .execute(&self.pool)
        .await?;

        tracing::info!("Document table created in schema {}", self.schema);
        Ok(())
    }

    async fn insert_row(&self, collection: &str, document: &Value) -> Result<Uuid, sqlx::Error> {
        let (id,): (Uuid,) = sqlx::query_as(&insert_sql(&self.table()))
            .bind(Uuid::new_v4())
            .bind(collection)
            .bind(document)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn database_name(&self) -> &str {
        &self.schema
    }

    async fn insert(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidDocument(
                "document must be a JSON object".to_string(),
            ));
        }

        let id = match self.insert_row(collection, &document).await {
            Err(e) if is_missing_relation(&e) => {
                tracing::warn!("Document table missing in schema {}, creating it", self.schema);
                self.create_schema().await?;
                self.insert_row(collection, &document).await?
            }
            other => other?,
        };

        Ok(id.to_string())
    }

    async fn list(
        &self,
        collection: &str,
        limit: Option<u64>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        // LIMIT NULL means no limit in Postgres.
        let limit = limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX));

        let rows = sqlx::query_as::<_, DocumentRow>(&list_sql(&self.table()))
            .bind(collection)
            .bind(limit)
            .fetch_all(&self.pool)
            .await;

        match rows {
            Ok(rows) => Ok(rows.into_iter().map(StoredDocument::from).collect()),
            Err(e) if is_missing_relation(&e) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn collection_names(&self, max: usize) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(&collection_names_sql(&self.table()))
            .bind(i64::try_from(max).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await;

        match names {
            Ok(names) => Ok(names),
            Err(e) if is_missing_relation(&e) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

fn insert_sql(table: &str) -> String {
    format!(
        r#"
        INSERT INTO {} (id, collection, body, created_at, updated_at)
        VALUES ($1, $2, $3, now(), now())
        RETURNING id
        "#,
        table
    )
}

fn list_sql(table: &str) -> String {
    format!(
        r#"
        SELECT id, body, created_at, updated_at
        FROM {}
        WHERE collection = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
        table
    )
}

fn collection_names_sql(table: &str) -> String {
    format!(
        "SELECT DISTINCT collection FROM {} ORDER BY collection LIMIT $1",
        table
    )
}

fn is_missing_relation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => is_missing_relation_code(db_err.code().as_deref()),
        _ => false,
    }
}

fn is_missing_relation_code(code: Option<&str>) -> bool {
    matches!(code, Some(UNDEFINED_TABLE | INVALID_SCHEMA_NAME))
}

/// Postgres identifiers: letter or underscore first, at most 63 bytes.
fn is_valid_identifier(name: &str) -> bool {
    static IDENTIFIER: OnceLock<Option<Regex>> = OnceLock::new();
    IDENTIFIER
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}
