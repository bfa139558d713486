//! Remote document collections the sync worker reads from.

mod firestore;

pub use firestore::{FIRESTORE_USER_AGENT, FirestoreReader};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SyncError;

/// A remote document flattened to its id and plain JSON fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RemoteDocument {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl RemoteDocument {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Read access to named remote collections.
///
/// `get` returns every document of the collection or fails as a whole; deadlines are applied
/// by the caller, not the reader.
#[async_trait]
pub trait CollectionReader: Send + Sync {
    async fn get(&self, collection: &str) -> Result<Vec<RemoteDocument>, SyncError>;
}
