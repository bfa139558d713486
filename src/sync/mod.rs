//! Offline sync of the remote `jobs` and `events` collections into the local store.
//!
//! - `worker.rs`: one deadline-bounded cycle, `SyncWorker::run() -> SyncOutcome`
//! - `deadline.rs`: the cycle deadline and the per-fetch child deadlines derived from it
//! - `mapping.rs`: remote document -> local record conversion
//! - `scheduler.rs`: actor that runs cycles periodically, on demand, and on retry backoff

mod deadline;
mod mapping;
mod outcome;
pub mod scheduler;
mod worker;

pub use deadline::{Deadline, DeadlineScope};
pub use mapping::{FromDocument, map_documents};
pub use outcome::{Collection, SyncCounts, SyncFailure, SyncOutcome, SyncReport, SyncStage};
pub use scheduler::{SyncSchedulerHandle, SyncStatus};
pub use worker::{SyncTimeouts, SyncWorker};
