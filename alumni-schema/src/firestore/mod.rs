//! Wire types for the Firestore REST `documents.list` call.
//!
//! Only the read path is modelled; write payloads are never sent by the sync worker.

mod document;
mod value;

pub use document::{FirestoreDocument, ListDocumentsResponse};
pub use value::{ArrayValue, FirestoreValue, GeoPoint, MapValue, TypedValue, WireDouble};
