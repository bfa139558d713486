use async_trait::async_trait;

use crate::db::actor::DbActorHandle;
use crate::db::models::{EventRecord, JobRecord};
use crate::error::SyncError;

/// Insert-or-replace sink for synced records, keyed by record id.
///
/// Each call is atomic for its batch; nothing spans calls.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn upsert_jobs(&self, jobs: Vec<JobRecord>) -> Result<usize, SyncError>;

    async fn upsert_events(&self, events: Vec<EventRecord>) -> Result<usize, SyncError>;
}

#[async_trait]
impl LocalStore for DbActorHandle {
    async fn upsert_jobs(&self, jobs: Vec<JobRecord>) -> Result<usize, SyncError> {
        DbActorHandle::upsert_jobs(self, jobs).await
    }

    async fn upsert_events(&self, events: Vec<EventRecord>) -> Result<usize, SyncError> {
        DbActorHandle::upsert_events(self, events).await
    }
}
