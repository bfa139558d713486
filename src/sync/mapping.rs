use serde_json::Value;

use super::Collection;
use crate::db::{EventRecord, JobRecord};
use crate::error::SyncError;
use crate::remote::RemoteDocument;

/// A local record that can be built from a document of a given remote collection.
pub trait FromDocument: Sized {
    const COLLECTION: Collection;

    fn from_document(doc: &RemoteDocument) -> Result<Self, SyncError>;
}

impl FromDocument for JobRecord {
    const COLLECTION: Collection = Collection::Jobs;

    fn from_document(doc: &RemoteDocument) -> Result<Self, SyncError> {
        let field = |name| string_field(doc, Self::COLLECTION, name);

        // Older clients wrote the link as `applicationUrl`.
        let application_url = match field("applyUrl")? {
            Some(url) => Some(url),
            None => field("applicationUrl")?,
        };

        Ok(Self {
            id: doc.id.clone(),
            title: field("title")?,
            company: field("company")?,
            location: field("location")?,
            description: field("description")?,
            application_url,
        })
    }
}

impl FromDocument for EventRecord {
    const COLLECTION: Collection = Collection::Events;

    fn from_document(doc: &RemoteDocument) -> Result<Self, SyncError> {
        let field = |name| string_field(doc, Self::COLLECTION, name);

        Ok(Self {
            id: doc.id.clone(),
            title: field("title")?,
            description: field("description")?,
            location: field("location")?,
        })
    }
}

/// Maps every document, failing on the first one that cannot be converted.
pub fn map_documents<R: FromDocument>(docs: &[RemoteDocument]) -> Result<Vec<R>, SyncError> {
    docs.iter().map(R::from_document).collect()
}

/// Missing and `null` fields are absent; any other non-string value is an error.
fn string_field(
    doc: &RemoteDocument,
    collection: Collection,
    field: &'static str,
) -> Result<Option<String>, SyncError> {
    match doc.fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(SyncError::FieldType {
            collection: collection.name(),
            document_id: doc.id.clone(),
            field,
            found: json_kind(other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}
