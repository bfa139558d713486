use crate::server::router::SyncApiState;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde_json::json;
use subtle::ConstantTimeEq;

const X_API_KEY: &str = "x-api-key";

fn extract_header_token(headers: &HeaderMap) -> Option<String> {
    if let Some(k) = headers.get(X_API_KEY).and_then(|v| v.to_str().ok()) {
        return Some(k.to_string());
    }
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Extractor that admits requests carrying the configured admin key.
#[derive(Debug, Clone, Copy)]
pub struct RequireKeyAuth;

impl FromRequestParts<SyncApiState> for RequireKeyAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SyncApiState,
    ) -> Result<Self, Self::Rejection> {
        let key = extract_header_token(&parts.headers).ok_or(AuthError::MissingKey)?;
        let expected = state.admin_key.as_ref();

        // An empty configured key admits nobody.
        if !expected.is_empty() && bool::from(key.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(RequireKeyAuth)
        } else {
            Err(AuthError::InvalidKey)
        }
    }
}

pub enum AuthError {
    MissingKey,
    InvalidKey,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let reason = match self {
            AuthError::MissingKey => "Missing admin key",
            AuthError::InvalidKey => "Invalid admin key",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "reason": reason })),
        )
            .into_response()
    }
}
