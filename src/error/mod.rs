mod sync;

pub use sync::{ApiErrorBody, ApiErrorObject, SyncError};
