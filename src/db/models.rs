use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Local copy of a document from the remote `jobs` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, FromRow)]
pub struct JobRecord {
    /// Remote document id.
    pub id: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub application_url: Option<String>,
}

/// Local copy of a document from the remote `events` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, FromRow)]
pub struct EventRecord {
    /// Remote document id.
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StoreCounts {
    pub jobs: u64,
    pub events: u64,
}
