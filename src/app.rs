use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::handlers::{self, AppState};
use crate::models::{
    CreateLeadResponse, DiagnosticReport, ErrorBody, HealthResponse, Lead, LeadIn,
    ListLeadsResponse, Plan, RootResponse,
};

/// Largest accepted request body. Lead submissions are a few hundred bytes.
/// Oversized bodies surface as a `JsonRejection`, so they get a `{detail}` body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// OpenAPI documentation for the lead API.
#[derive(OpenApi)]
#[openapi(
    info(title = "Investing Coach API", version = "1.0.0"),
    paths(
        handlers::root,
        handlers::health,
        handlers::test_database,
        handlers::create_lead,
        handlers::list_leads,
    ),
    components(schemas(
        Plan,
        Lead,
        LeadIn,
        RootResponse,
        HealthResponse,
        CreateLeadResponse,
        ListLeadsResponse,
        DiagnosticReport,
        ErrorBody,
    )),
    tags(
        (name = "leads", description = "Lead capture and listing")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Builds the full application router.
///
/// CORS mirrors the caller's origin, method and headers with credentials
/// allowed; a wildcard origin cannot be combined with credentials.
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/test", get(handlers::test_database))
        .route(
            "/api/leads",
            get(handlers::list_leads).post(handlers::create_lead),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}
