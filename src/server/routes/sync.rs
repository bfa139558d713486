use crate::db::StoreCounts;
use crate::error::SyncError;
use crate::server::router::SyncApiState;
use crate::sync::{SyncOutcome, SyncStatus};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct SyncStatusBody {
    pub scheduler: SyncStatus,
    pub store: StoreCounts,
}

pub fn router() -> Router<SyncApiState> {
    Router::new()
        .route("/sync/status", get(sync_status_handler))
        .route("/sync/trigger", post(sync_trigger_handler))
        .route("/sync/run", post(sync_run_handler))
}

async fn sync_status_handler(
    State(state): State<SyncApiState>,
) -> Result<Json<SyncStatusBody>, SyncError> {
    let scheduler = state.scheduler.status();
    let store = state.store.counts().await?;
    Ok(Json(SyncStatusBody { scheduler, store }))
}

async fn sync_trigger_handler(
    State(state): State<SyncApiState>,
) -> Result<(StatusCode, Json<Value>), SyncError> {
    state.scheduler.trigger()?;
    info!("Sync cycle queued via admin API");
    Ok((StatusCode::ACCEPTED, Json(json!({ "queued": true }))))
}

async fn sync_run_handler(
    State(state): State<SyncApiState>,
) -> Result<Json<SyncOutcome>, SyncError> {
    let outcome = state.scheduler.run_now().await?;
    Ok(Json(outcome))
}
