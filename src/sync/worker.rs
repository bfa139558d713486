use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::deadline::{Deadline, DeadlineScope};
use super::mapping::{FromDocument, map_documents};
use super::outcome::{Collection, SyncCounts, SyncFailure, SyncOutcome, SyncReport, SyncStage};
use crate::config::SyncConfig;
use crate::db::{EventRecord, JobRecord, LocalStore};
use crate::error::SyncError;
use crate::remote::CollectionReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTimeouts {
    /// Budget for the whole cycle.
    pub cycle: Duration,
    /// Budget for one collection fetch, clamped to what is left of `cycle`.
    pub fetch: Duration,
}

impl Default for SyncTimeouts {
    fn default() -> Self {
        Self {
            cycle: Duration::from_millis(30_000),
            fetch: Duration::from_millis(20_000),
        }
    }
}

impl From<&SyncConfig> for SyncTimeouts {
    fn from(cfg: &SyncConfig) -> Self {
        Self {
            cycle: cfg.cycle_timeout(),
            fetch: cfg.fetch_timeout(),
        }
    }
}

/// Where a cycle got to; survives the cycle future being dropped on expiry.
struct Progress {
    stage: SyncStage,
    fetched: SyncCounts,
    committed: SyncCounts,
}

impl Progress {
    fn new() -> Self {
        Self {
            stage: SyncStage::Fetch(Collection::Jobs),
            fetched: SyncCounts::default(),
            committed: SyncCounts::default(),
        }
    }
}

/// Pulls `jobs` then `events` from the remote reader into the local store.
///
/// The reader and store are injected; the worker holds no other state, so one instance can
/// run any number of (non-overlapping) cycles.
pub struct SyncWorker {
    reader: Arc<dyn CollectionReader>,
    store: Arc<dyn LocalStore>,
    timeouts: SyncTimeouts,
}

impl SyncWorker {
    pub fn new(
        reader: Arc<dyn CollectionReader>,
        store: Arc<dyn LocalStore>,
        timeouts: SyncTimeouts,
    ) -> Self {
        Self {
            reader,
            store,
            timeouts,
        }
    }

    pub fn timeouts(&self) -> SyncTimeouts {
        self.timeouts
    }

    /// Runs one cycle. Never fails: every error, including running out of time, becomes
    /// `SyncOutcome::Retry`. Records committed before a failure are kept.
    pub async fn run(&self) -> SyncOutcome {
        let started = Instant::now();
        let deadline = Deadline::after(DeadlineScope::Cycle, self.timeouts.cycle);
        let mut progress = Progress::new();

        debug!(
            cycle_timeout_ms = millis(self.timeouts.cycle),
            fetch_timeout_ms = millis(self.timeouts.fetch),
            "Sync cycle started"
        );

        let timed =
            tokio::time::timeout_at(deadline.instant(), self.sync_all(&deadline, &mut progress))
                .await;
        let result = match timed {
            Ok(res) => res,
            Err(_) => Err(deadline.exceeded(progress.stage)),
        };
        let elapsed_ms = millis(started.elapsed());

        match result {
            Ok(()) => {
                info!(
                    jobs = progress.committed.jobs,
                    events = progress.committed.events,
                    elapsed_ms,
                    "Sync cycle finished"
                );
                SyncOutcome::Success(SyncReport {
                    fetched: progress.fetched,
                    upserted: progress.committed,
                    elapsed_ms,
                })
            }
            Err(e) => {
                warn!(
                    stage = %progress.stage,
                    error = %e,
                    committed_jobs = progress.committed.jobs,
                    committed_events = progress.committed.events,
                    elapsed_ms,
                    "Sync cycle failed, retry requested"
                );
                SyncOutcome::Retry(SyncFailure {
                    stage: progress.stage,
                    error: e.to_string(),
                    committed: progress.committed,
                    elapsed_ms,
                })
            }
        }
    }

    async fn sync_all(&self, deadline: &Deadline, progress: &mut Progress) -> Result<(), SyncError> {
        let jobs: Vec<JobRecord> = self.pull(deadline, progress).await?;
        if !jobs.is_empty() {
            progress.stage = SyncStage::Upsert(Collection::Jobs);
            let n = deadline
                .run(progress.stage, self.store.upsert_jobs(jobs))
                .await?;
            progress.committed.jobs = n;
        }

        let events: Vec<EventRecord> = self.pull(deadline, progress).await?;
        if !events.is_empty() {
            progress.stage = SyncStage::Upsert(Collection::Events);
            let n = deadline
                .run(progress.stage, self.store.upsert_events(events))
                .await?;
            progress.committed.events = n;
        }

        Ok(())
    }

    /// Fetches `R::COLLECTION` under its own fetch deadline and maps the documents.
    async fn pull<R: FromDocument>(
        &self,
        deadline: &Deadline,
        progress: &mut Progress,
    ) -> Result<Vec<R>, SyncError> {
        let collection = R::COLLECTION;
        progress.stage = SyncStage::Fetch(collection);

        let fetch_deadline = deadline.child(DeadlineScope::Fetch, self.timeouts.fetch);
        let docs = fetch_deadline
            .run(progress.stage, self.reader.get(collection.name()))
            .await?;
        progress.fetched.set(collection, docs.len());
        debug!(%collection, documents = docs.len(), "Remote collection fetched");

        progress.stage = SyncStage::Map(collection);
        map_documents(&docs)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
