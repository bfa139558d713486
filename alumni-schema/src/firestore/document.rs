use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::value::{FirestoreValue, fields_into_json};

/// One page of a `documents.list` response.
///
/// An empty collection is returned as `{}`, so both fields default.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreDocument {
    /// Full resource name: `projects/{p}/databases/{d}/documents/{collection}/{id}`.
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FirestoreValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl FirestoreDocument {
    /// Document id, i.e. the last path segment of `name`.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    pub fn into_json_fields(self) -> Map<String, Value> {
        fields_into_json(self.fields)
    }
}
