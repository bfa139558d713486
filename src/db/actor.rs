use crate::db::models::{EventRecord, JobRecord, StoreCounts};
use crate::db::schema::SQLITE_INIT;
use crate::error::SyncError;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub enum DbActorMessage {
    /// Insert-or-replace a batch of jobs in one transaction; replies with the row count.
    UpsertJobs(Vec<JobRecord>, RpcReplyPort<Result<usize, SyncError>>),

    /// Insert-or-replace a batch of events in one transaction; replies with the row count.
    UpsertEvents(Vec<EventRecord>, RpcReplyPort<Result<usize, SyncError>>),

    ListJobs(RpcReplyPort<Result<Vec<JobRecord>, SyncError>>),

    ListEvents(RpcReplyPort<Result<Vec<EventRecord>, SyncError>>),

    GetJob(String, RpcReplyPort<Result<Option<JobRecord>, SyncError>>),

    GetEvent(String, RpcReplyPort<Result<Option<EventRecord>, SyncError>>),

    /// Row counts per table.
    Counts(RpcReplyPort<Result<StoreCounts, SyncError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn upsert_jobs(&self, jobs: Vec<JobRecord>) -> Result<usize, SyncError> {
        ractor::call!(self.actor, DbActorMessage::UpsertJobs, jobs)
            .map_err(|e| SyncError::RactorError(format!("DbActor UpsertJobs RPC failed: {e}")))?
    }

    pub async fn upsert_events(&self, events: Vec<EventRecord>) -> Result<usize, SyncError> {
        ractor::call!(self.actor, DbActorMessage::UpsertEvents, events)
            .map_err(|e| SyncError::RactorError(format!("DbActor UpsertEvents RPC failed: {e}")))?
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobRecord>, SyncError> {
        ractor::call!(self.actor, DbActorMessage::ListJobs)
            .map_err(|e| SyncError::RactorError(format!("DbActor ListJobs RPC failed: {e}")))?
    }

    pub async fn list_events(&self) -> Result<Vec<EventRecord>, SyncError> {
        ractor::call!(self.actor, DbActorMessage::ListEvents)
            .map_err(|e| SyncError::RactorError(format!("DbActor ListEvents RPC failed: {e}")))?
    }

    pub async fn get_job(&self, id: &str) -> Result<Option<JobRecord>, SyncError> {
        ractor::call!(self.actor, DbActorMessage::GetJob, id.to_string())
            .map_err(|e| SyncError::RactorError(format!("DbActor GetJob RPC failed: {e}")))?
    }

    pub async fn get_event(&self, id: &str) -> Result<Option<EventRecord>, SyncError> {
        ractor::call!(self.actor, DbActorMessage::GetEvent, id.to_string())
            .map_err(|e| SyncError::RactorError(format!("DbActor GetEvent RPC failed: {e}")))?
    }

    pub async fn counts(&self) -> Result<StoreCounts, SyncError> {
        ractor::call!(self.actor, DbActorMessage::Counts)
            .map_err(|e| SyncError::RactorError(format!("DbActor Counts RPC failed: {e}")))?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::UpsertJobs(jobs, reply) => {
                let res = self.upsert_jobs(&state.pool, jobs).await;
                let _ = reply.send(res);
            }
            DbActorMessage::UpsertEvents(events, reply) => {
                let res = self.upsert_events(&state.pool, events).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListJobs(reply) => {
                let res = self.list_jobs(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListEvents(reply) => {
                let res = self.list_events(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetJob(id, reply) => {
                let res = self.get_job(&state.pool, &id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetEvent(id, reply) => {
                let res = self.get_event(&state.pool, &id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Counts(reply) => {
                let res = self.counts(&state.pool).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn upsert_jobs(
        &self,
        pool: &SqlitePool,
        jobs: Vec<JobRecord>,
    ) -> Result<usize, SyncError> {
        let count = jobs.len();
        let mut tx = pool.begin().await?;

        for job in jobs {
            sqlx::query(
                r"
            INSERT INTO jobs (id, title, company, location, description, application_url)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                company = excluded.company,
                location = excluded.location,
                description = excluded.description,
                application_url = excluded.application_url
            ",
            )
            .bind(job.id)
            .bind(job.title)
            .bind(job.company)
            .bind(job.location)
            .bind(job.description)
            .bind(job.application_url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(rows = count, "jobs upserted");
        Ok(count)
    }

    async fn upsert_events(
        &self,
        pool: &SqlitePool,
        events: Vec<EventRecord>,
    ) -> Result<usize, SyncError> {
        let count = events.len();
        let mut tx = pool.begin().await?;

        for event in events {
            sqlx::query(
                r"
            INSERT INTO events (id, title, description, location)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                location = excluded.location
            ",
            )
            .bind(event.id)
            .bind(event.title)
            .bind(event.description)
            .bind(event.location)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(rows = count, "events upserted");
        Ok(count)
    }

    async fn list_jobs(&self, pool: &SqlitePool) -> Result<Vec<JobRecord>, SyncError> {
        let rows = sqlx::query_as::<_, JobRecord>(
            r"
        SELECT id, title, company, location, description, application_url
        FROM jobs
        ORDER BY id
        ",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn list_events(&self, pool: &SqlitePool) -> Result<Vec<EventRecord>, SyncError> {
        let rows = sqlx::query_as::<_, EventRecord>(
            r"
        SELECT id, title, description, location
        FROM events
        ORDER BY id
        ",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn get_job(&self, pool: &SqlitePool, id: &str) -> Result<Option<JobRecord>, SyncError> {
        let row = sqlx::query_as::<_, JobRecord>(
            r"
        SELECT id, title, company, location, description, application_url
        FROM jobs
        WHERE id = ?
        ",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn get_event(
        &self,
        pool: &SqlitePool,
        id: &str,
    ) -> Result<Option<EventRecord>, SyncError> {
        let row = sqlx::query_as::<_, EventRecord>(
            r"
        SELECT id, title, description, location
        FROM events
        WHERE id = ?
        ",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn counts(&self, pool: &SqlitePool) -> Result<StoreCounts, SyncError> {
        let jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(pool)
            .await?;
        let events: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(pool)
            .await?;

        Ok(StoreCounts {
            jobs: u64::try_from(jobs).unwrap_or_default(),
            events: u64::try_from(events).unwrap_or_default(),
        })
    }
}

/// Spawn the database actor and return a cloneable handle.
///
/// The handle is the only way into the store; callers own its lifetime and pass it to
/// whatever needs it.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, SyncError> {
    let (actor, _jh) = Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| SyncError::RactorError(format!("DbActor spawn failed: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), SyncError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        // Skip the trailing fragment and comment-only chunks.
        if s.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with("--")) {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
