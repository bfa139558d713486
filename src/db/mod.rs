//! Local store: record models, schema, and the SQLite actor that owns the pool.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: `DbActor` owning the pool, reached through `DbActorHandle`
//! - `traits.rs`: `LocalStore`, the upsert seam the sync worker writes through

pub mod actor;
pub mod models;
pub mod schema;
pub mod traits;

pub use models::{EventRecord, JobRecord, StoreCounts};
pub use schema::SQLITE_INIT;
pub use traits::LocalStore;

pub use actor::{DbActorHandle, spawn};
