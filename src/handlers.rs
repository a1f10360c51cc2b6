use crate::config::Config;
use crate::errors::{bounded, AppError};
use crate::models::*;
use crate::store::{normalize_limit, DocumentStore, StoreError, StoredDocument};
use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

/// Most collection names reported by the diagnostic endpoint.
const MAX_REPORTED_COLLECTIONS: usize = 10;

/// Longest enumeration error shown in the diagnostic report.
const MAX_DIAGNOSTIC_ERROR_CHARS: usize = 50;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Document store handle; `None` when the configuration could not produce one.
    pub store: Option<Arc<dyn DocumentStore>>,
}

impl AppState {
    fn store(&self) -> Result<&Arc<dyn DocumentStore>, AppError> {
        self.store.as_ref().ok_or(AppError::StoreNotInitialized)
    }
}

/// GET /
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is running", body = RootResponse))
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Investing Coach API is running".to_string(),
    })
}

/// Health check endpoint.
///
/// Returns the service status and version without touching the database.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /test
///
/// Reports whether the store handle exists and can enumerate its collections.
/// Failures are rendered into the report; this endpoint always answers 200.
#[utoipa::path(
    get,
    path = "/test",
    responses((status = 200, description = "Connectivity report", body = DiagnosticReport))
)]
pub async fn test_database(State(state): State<Arc<AppState>>) -> Json<DiagnosticReport> {
    let mut report = DiagnosticReport {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: String::new(),
        database_name: String::new(),
        connection_status: "Not Connected".to_string(),
        collections: Vec::new(),
    };

    match state.store.as_ref() {
        Some(store) => {
            report.database = "✅ Available".to_string();
            report.connection_status = "Connected".to_string();

            match store.collection_names(MAX_REPORTED_COLLECTIONS).await {
                Ok(mut names) => {
                    names.truncate(MAX_REPORTED_COLLECTIONS);
                    report.collections = names;
                    report.database = "✅ Connected & Working".to_string();
                }
                Err(e) => {
                    tracing::warn!("Collection enumeration failed: {}", e);
                    report.database = format!(
                        "⚠️  Connected but Error: {}",
                        bounded(&e.to_string(), MAX_DIAGNOSTIC_ERROR_CHARS)
                    );
                }
            }
        }
        None => {
            report.database = "⚠️  Available but not initialized".to_string();
        }
    }

    report.database_url = set_or_not(state.config.database_url_set());
    report.database_name = set_or_not(state.config.database_name_set());

    tracing::info!("GET /test - database: {}", report.database);

    Json(report)
}

fn set_or_not(present: bool) -> String {
    let label = if present { "✅ Set" } else { "❌ Not Set" };
    label.to_string()
}

/// POST /api/leads
///
/// Stores a lead with its plan passed through the allow-list and `source`
/// fixed to `website`.
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "leads",
    request_body = LeadIn,
    responses(
        (status = 200, description = "Lead stored", body = CreateLeadResponse),
        (status = 422, description = "Missing or empty required fields", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LeadIn>, JsonRejection>,
) -> Result<Json<CreateLeadResponse>, AppError> {
    let Json(submission) = payload?;

    if submission.name.is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    if submission.email.is_empty() {
        return Err(AppError::Validation("email must not be empty".to_string()));
    }

    let lead = Lead::from_submission(submission);
    tracing::info!(
        "POST /api/leads - plan: {:?}",
        lead.plan.map(Plan::as_str)
    );

    let document = serde_json::to_value(&lead)
        .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
    let id = state.store()?.insert(LEAD_COLLECTION, document).await?;

    tracing::info!("Lead stored with id {}", id);

    Ok(Json(CreateLeadResponse {
        success: true,
        id: id.to_string(),
    }))
}

/// GET /api/leads
///
/// Lists the most recent leads, newest first.
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "leads",
    params(ListLeadsParams),
    responses(
        (status = 200, description = "Stored leads", body = ListLeadsResponse),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListLeadsParams>, QueryRejection>,
) -> Result<Json<ListLeadsResponse>, AppError> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);

    tracing::info!("GET /api/leads - limit: {}", limit);

    let documents = state
        .store()?
        .list(LEAD_COLLECTION, normalize_limit(limit))
        .await?;

    Ok(Json(ListLeadsResponse {
        items: documents.into_iter().map(display_document).collect(),
    }))
}

/// Flattens a stored document into its JSON body with the identifier and
/// timestamps rendered as strings.
fn display_document(doc: StoredDocument) -> Value {
    let mut body = match doc.body {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };

    body.insert("_id".to_string(), Value::String(doc.id.to_string()));
    body.insert(
        "created_at".to_string(),
        Value::String(doc.created_at.to_rfc3339()),
    );
    body.insert(
        "updated_at".to_string(),
        Value::String(doc.updated_at.to_rfc3339()),
    );

    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn display_document_stringifies_metadata() {
        let id = Uuid::new_v4().to_string();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let doc = StoredDocument {
            id: id.clone(),
            body: json!({"name": "Jane", "email": "jane@example.com"}),
            created_at: at,
            updated_at: at,
        };

        let shown = display_document(doc);

        assert_eq!(shown["_id"], id);
        assert_eq!(shown["created_at"], "2024-03-01T12:30:00+00:00");
        assert_eq!(shown["updated_at"], "2024-03-01T12:30:00+00:00");
        assert_eq!(shown["name"], "Jane");
    }

    #[test]
    fn set_or_not_labels() {
        assert_eq!(set_or_not(true), "✅ Set");
        assert_eq!(set_or_not(false), "❌ Not Set");
    }
}
