use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Collection that holds lead documents.
pub const LEAD_COLLECTION: &str = "lead";

/// Source recorded on every lead created through the API.
pub const LEAD_SOURCE: &str = "website";

/// Default number of leads returned by the list endpoint.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

// ============ Lead Model ============

/// Subscription plans a lead may ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Plan {
    Starter,
    Pro,
    Elite,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Starter, Plan::Pro, Plan::Elite];

    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Starter => "Starter",
            Plan::Pro => "Pro",
            Plan::Elite => "Elite",
        }
    }

    /// Maps a submitted plan onto the allow-list.
    ///
    /// Matching is exact and case-sensitive; anything else, including an empty
    /// string, becomes `None` instead of an error.
    pub fn normalize(submitted: Option<&str>) -> Option<Plan> {
        match submitted? {
            "Starter" => Some(Plan::Starter),
            "Pro" => Some(Plan::Pro),
            "Elite" => Some(Plan::Elite),
            _ => None,
        }
    }
}

/// Lead submission body for `POST /api/leads`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeadIn {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Free text; only `Starter`, `Pro` and `Elite` are kept.
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Lead document as written to the store.
///
/// `created_at`, `updated_at` and the identifier are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Lead {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub plan: Option<Plan>,
    pub message: Option<String>,
    pub source: String,
}

impl Lead {
    pub fn from_submission(submission: LeadIn) -> Self {
        Self {
            plan: Plan::normalize(submission.plan.as_deref()),
            name: submission.name,
            email: submission.email,
            phone: submission.phone,
            message: submission.message,
            source: LEAD_SOURCE.to_string(),
        }
    }
}

// ============ API Request/Response Models ============

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLeadsParams {
    /// Maximum number of leads to return (default 50, 0 for all).
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateLeadResponse {
    pub success: bool,
    /// Store-assigned identifier.
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListLeadsResponse {
    /// Lead documents with `_id`, `created_at` and `updated_at` as strings.
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<serde_json::Value>,
}

/// Connectivity report returned by `GET /test`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiagnosticReport {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

/// Error body for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
}
