pub mod config;
pub mod db;
pub mod error;
pub mod remote;
pub mod server;
pub mod sync;

mod utils;

pub use error::SyncError;
pub use sync::{SyncOutcome, SyncWorker};
