use serde::Serialize;
use std::fmt;

/// The remote collections a cycle pulls, in the order they are pulled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Jobs,
    Events,
}

impl Collection {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::Events => "events",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Step of a cycle; recorded so a failure can say where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", content = "collection", rename_all = "snake_case")]
pub enum SyncStage {
    Fetch(Collection),
    Map(Collection),
    Upsert(Collection),
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(c) => write!(f, "fetch {c}"),
            Self::Map(c) => write!(f, "map {c}"),
            Self::Upsert(c) => write!(f, "upsert {c}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncCounts {
    pub jobs: usize,
    pub events: usize,
}

impl SyncCounts {
    pub(crate) fn set(&mut self, collection: Collection, n: usize) {
        match collection {
            Collection::Jobs => self.jobs = n,
            Collection::Events => self.events = n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Documents returned by the remote store.
    pub fetched: SyncCounts,
    /// Records written to the local store (zero for an empty collection).
    pub upserted: SyncCounts,
    pub elapsed_ms: u64,
}

/// Diagnostic carried by `SyncOutcome::Retry`; for logs and status only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub stage: SyncStage,
    pub error: String,
    /// Records confirmed written before the failure. They stay in the store.
    ///
    /// A lower bound: an upsert cut off by the deadline may still commit after its reply is
    /// dropped, and those rows are not counted here.
    pub committed: SyncCounts,
    pub elapsed_ms: u64,
}

/// Result of one sync cycle. Every failure is treated as transient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    Success(SyncReport),
    Retry(SyncFailure),
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, Self::Retry(_))
    }
}
