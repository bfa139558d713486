#![allow(dead_code)]

use alumni_sync::SyncError;
use alumni_sync::db::{EventRecord, JobRecord, LocalStore};
use alumni_sync::remote::{CollectionReader, RemoteDocument};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub fn doc(id: &str, fields: Value) -> RemoteDocument {
    let fields: Map<String, Value> = serde_json::from_value(fields).expect("object fields");
    RemoteDocument::new(id, fields)
}

pub fn temp_database_url(label: &str) -> (String, std::path::PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!(
        "alumni-sync-{label}-{}-{nanos}.sqlite",
        std::process::id()
    ));
    (format!("sqlite:{}", path.display()), path)
}

pub fn remove_database(path: &std::path::Path) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

#[derive(Debug, Clone)]
pub enum Reply {
    Docs(Vec<RemoteDocument>),
    Fail(&'static str),
}

/// Reader that answers each collection from a script of `(delay, reply)` steps.
///
/// Steps are consumed in order; the last one repeats. Unscripted collections are empty.
#[derive(Default)]
pub struct ScriptedReader {
    steps: Mutex<HashMap<String, VecDeque<(Duration, Reply)>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, collection: &str, delay: Duration, reply: Reply) -> Self {
        self.steps
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push_back((delay, reply));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CollectionReader for ScriptedReader {
    async fn get(&self, collection: &str) -> Result<Vec<RemoteDocument>, SyncError> {
        self.calls.lock().unwrap().push(collection.to_string());

        let step = {
            let mut steps = self.steps.lock().unwrap();
            match steps.get_mut(collection) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        let (delay, reply) = step.unwrap_or((Duration::ZERO, Reply::Docs(Vec::new())));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Reply::Docs(docs) => Ok(docs),
            Reply::Fail(msg) => Err(SyncError::UnexpectedError(msg.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub jobs: BTreeMap<String, JobRecord>,
    pub events: BTreeMap<String, EventRecord>,
}

/// In-memory `LocalStore` that records how often each upsert was called.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<StoreSnapshot>,
    job_upserts: Mutex<usize>,
    event_upserts: Mutex<usize>,
    fail_events: AtomicBool,
    reply_delay: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_events() -> Self {
        let store = Self::default();
        store.fail_events.store(true, Ordering::SeqCst);
        store
    }

    /// Commits each batch immediately but answers only after `delay`, like an actor whose
    /// reply arrives late.
    pub fn slow_reply(delay: Duration) -> Self {
        Self {
            reply_delay: delay,
            ..Self::default()
        }
    }

    async fn reply_later(&self) {
        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.data.lock().unwrap().clone()
    }

    pub fn job_upserts(&self) -> usize {
        *self.job_upserts.lock().unwrap()
    }

    pub fn event_upserts(&self) -> usize {
        *self.event_upserts.lock().unwrap()
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn upsert_jobs(&self, jobs: Vec<JobRecord>) -> Result<usize, SyncError> {
        *self.job_upserts.lock().unwrap() += 1;
        let n = jobs.len();
        {
            let mut data = self.data.lock().unwrap();
            for job in jobs {
                data.jobs.insert(job.id.clone(), job);
            }
        }
        self.reply_later().await;
        Ok(n)
    }

    async fn upsert_events(&self, events: Vec<EventRecord>) -> Result<usize, SyncError> {
        *self.event_upserts.lock().unwrap() += 1;
        if self.fail_events.load(Ordering::SeqCst) {
            return Err(SyncError::UnexpectedError("disk I/O error".to_string()));
        }
        let n = events.len();
        {
            let mut data = self.data.lock().unwrap();
            for event in events {
                data.events.insert(event.id.clone(), event);
            }
        }
        self.reply_later().await;
        Ok(n)
    }
}
