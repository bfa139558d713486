use crate::db::DbActorHandle;
use crate::server::guards::auth::RequireKeyAuth;
use crate::server::routes;
use crate::sync::SyncSchedulerHandle;

use axum::{
    Json, Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

#[derive(Clone)]
pub struct SyncApiState {
    pub scheduler: SyncSchedulerHandle,
    pub store: DbActorHandle,
    pub admin_key: Arc<str>,
}

impl SyncApiState {
    pub fn new(scheduler: SyncSchedulerHandle, store: DbActorHandle, admin_key: Arc<str>) -> Self {
        Self {
            scheduler,
            store,
            admin_key,
        }
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }))
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let protocol = format_http_version(req.version());

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(generate_request_id, str::to_string);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status().as_u16();
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if resp.status().is_server_error() {
        error!(status, %request_id, %method, protocol, %path, latency_ms, %user_agent, "request failed");
    } else if resp.status().is_client_error() {
        warn!(status, %request_id, %method, protocol, %path, latency_ms, %user_agent, "request rejected");
    } else {
        info!(status, %request_id, %method, protocol, %path, latency_ms, %user_agent, "request served");
    }

    resp
}

pub fn sync_router(state: SyncApiState) -> Router {
    let guarded = Router::new()
        .merge(routes::sync::router())
        .merge(routes::records::router())
        .route_layer(middleware::from_extractor_with_state::<RequireKeyAuth, _>(
            state.clone(),
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(guarded)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
