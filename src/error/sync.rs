use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error as ThisError;

use crate::sync::{DeadlineScope, SyncStage};

#[derive(Debug, ThisError)]
pub enum SyncError {
    #[error("Remote store returned status {status} while listing `{collection}`")]
    RemoteStatus {
        collection: String,
        status: StatusCode,
        body: String,
    },

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Field `{field}` of {collection}/{document_id} holds {found}, expected a string")]
    FieldType {
        collection: &'static str,
        document_id: String,
        field: &'static str,
        found: &'static str,
    },

    #[error("{scope} deadline of {budget:?} exceeded during {stage}")]
    DeadlineExceeded {
        stage: SyncStage,
        scope: DeadlineScope,
        budget: Duration,
    },

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl IntoResponse for SyncError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            SyncError::RactorError(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SYNC_UNAVAILABLE",
                "The sync scheduler is not running.",
            ),
            SyncError::RemoteStatus { .. }
            | SyncError::ReqwestError(_)
            | SyncError::JsonError(_)
            | SyncError::UrlError(_)
            | SyncError::FieldType { .. } => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Remote store error.",
            ),
            SyncError::DeadlineExceeded { .. } => (
                StatusCode::GATEWAY_TIMEOUT,
                "DEADLINE_EXCEEDED",
                "The operation did not finish before its deadline.",
            ),
            SyncError::DatabaseError(_)
            | SyncError::ConfigError(_)
            | SyncError::UnexpectedError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred.",
            ),
        };
        let body = ApiErrorObject {
            code: code.to_string(),
            message: message.to_string(),
        };
        (status, Json(ApiErrorBody { inner: body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
