use crate::db::{EventRecord, JobRecord};
use crate::error::SyncError;
use crate::server::router::SyncApiState;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

/// Read-only views of the local store.
pub fn router() -> Router<SyncApiState> {
    Router::new()
        .route("/jobs", get(list_jobs_handler))
        .route("/jobs/{id}", get(get_job_handler))
        .route("/events", get(list_events_handler))
        .route("/events/{id}", get(get_event_handler))
}

async fn list_jobs_handler(
    State(state): State<SyncApiState>,
) -> Result<Json<Vec<JobRecord>>, SyncError> {
    Ok(Json(state.store.list_jobs().await?))
}

async fn get_job_handler(
    State(state): State<SyncApiState>,
    Path(id): Path<String>,
) -> Result<Response, SyncError> {
    Ok(match state.store.get_job(&id).await? {
        Some(job) => Json(job).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

async fn list_events_handler(
    State(state): State<SyncApiState>,
) -> Result<Json<Vec<EventRecord>>, SyncError> {
    Ok(Json(state.store.list_events().await?))
}

async fn get_event_handler(
    State(state): State<SyncApiState>,
    Path(id): Path<String>,
) -> Result<Response, SyncError> {
    Ok(match state.store.get_event(&id).await? {
        Some(event) => Json(event).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}
