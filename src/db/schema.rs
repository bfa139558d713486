//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `jobs` table (one row per remote `jobs` document, keyed by document id)
/// - `events` table (one row per remote `events` document, keyed by document id)
///
/// Rows are only ever inserted or overwritten by the sync worker; nothing prunes rows whose
/// remote document was deleted.
pub const SQLITE_INIT: &str = r"
-- ---------------------------------------------------------------------------
-- Jobs board
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NULL,
    company TEXT NULL,
    location TEXT NULL,
    description TEXT NULL,
    application_url TEXT NULL
);

CREATE INDEX IF NOT EXISTS idx_jobs_company ON jobs(company);

-- ---------------------------------------------------------------------------
-- Events
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NULL,
    description TEXT NULL,
    location TEXT NULL
);
";
