pub mod firestore;

pub use firestore::{FirestoreDocument, FirestoreValue, ListDocumentsResponse};
