use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

use crate::models::ErrorBody;
use crate::store::StoreError;

/// Longest `detail` text sent back to clients.
pub const MAX_DETAIL_CHARS: usize = 200;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// The process started without a usable store handle.
    StoreNotInitialized,
    /// A store operation failed.
    Store(StoreError),
    /// The request could not be extracted (bad JSON, missing fields, bad query).
    InvalidRequest {
        /// Status chosen by the extractor rejection.
        status: StatusCode,
        message: String,
    },
    /// A required field is present but empty.
    Validation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StoreNotInitialized => write!(f, "Database not initialized"),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::InvalidRequest { message, .. } => write!(f, "{}", message),
            AppError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::StoreNotInitialized | AppError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::InvalidRequest { status, .. } => *status,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    /// Maps each variant to its status code and a `{detail}` body.
    fn into_response(self) -> Response {
        match &self {
            AppError::StoreNotInitialized => {
                tracing::error!("Request needs the database but no store handle is available")
            }
            AppError::Store(e) => tracing::error!("Store error: {:?}", e),
            AppError::InvalidRequest { message, .. } => {
                tracing::warn!("Rejected request: {}", message)
            }
            AppError::Validation(msg) => tracing::warn!("Validation failed: {}", msg),
        }

        let body = Json(ErrorBody {
            detail: bounded(&self.to_string(), MAX_DETAIL_CHARS),
        });

        (self.status(), body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Truncates `text` to at most `max` characters.
pub fn bounded(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
