mod common;

use alumni_sync::config::SyncConfig;
use alumni_sync::sync::{SyncSchedulerHandle, SyncStatus, SyncTimeouts, SyncWorker, scheduler};
use alumni_sync::SyncOutcome;
use common::{MemoryStore, Reply, ScriptedReader, doc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn quiet_config() -> SyncConfig {
    SyncConfig {
        interval_secs: 3600,
        run_on_start: false,
        retry_min_delay_ms: 60_000,
        retry_max_delay_ms: 60_000,
        retry_jitter: false,
        ..SyncConfig::default()
    }
}

async fn spawn_scheduler(
    reader: &Arc<ScriptedReader>,
    store: &Arc<MemoryStore>,
    cfg: SyncConfig,
) -> SyncSchedulerHandle {
    let worker = SyncWorker::new(reader.clone(), store.clone(), SyncTimeouts::default());
    scheduler::spawn(Arc::new(worker), cfg)
        .await
        .expect("spawn scheduler")
}

async fn wait_for_status(
    handle: &SyncSchedulerHandle,
    done: impl Fn(&SyncStatus) -> bool,
) -> SyncStatus {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let status = handle.status();
            if done(&status) {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    waited.expect("scheduler did not reach the expected status in time")
}

#[tokio::test]
async fn run_now_returns_outcome_and_updates_status() {
    let reader = Arc::new(ScriptedReader::new().with(
        "jobs",
        Duration::ZERO,
        Reply::Docs(vec![doc("j1", json!({"title": "Engineer"}))]),
    ));
    let store = Arc::new(MemoryStore::new());
    let handle = spawn_scheduler(&reader, &store, quiet_config()).await;

    let outcome = handle.run_now().await.expect("run_now");
    assert!(outcome.is_success(), "{outcome:?}");

    let status = handle.status();
    assert_eq!(status.cycles, 1);
    assert_eq!(status.consecutive_failures, 0);
    assert!(status.last_attempt_at.is_some());
    assert!(status.last_success_at.is_some());
    assert_eq!(status.last_outcome, Some(outcome));
    assert_eq!(status.retry_in_ms, None);
    assert_eq!(store.snapshot().jobs.len(), 1);

    handle.stop();
}

#[tokio::test]
async fn failed_cycle_is_retried_after_backoff() {
    let reader = Arc::new(
        ScriptedReader::new()
            .with("jobs", Duration::ZERO, Reply::Fail("connection refused"))
            .with(
                "jobs",
                Duration::ZERO,
                Reply::Docs(vec![doc("j1", json!({"title": "Engineer"}))]),
            ),
    );
    let store = Arc::new(MemoryStore::new());
    let cfg = SyncConfig {
        retry_min_delay_ms: 200,
        retry_max_delay_ms: 400,
        ..quiet_config()
    };
    let handle = spawn_scheduler(&reader, &store, cfg).await;

    let outcome = handle.run_now().await.expect("run_now");
    assert!(outcome.is_retry(), "{outcome:?}");

    let status = handle.status();
    assert_eq!(status.consecutive_failures, 1);
    assert!(status.last_success_at.is_none());
    let delay = status.retry_in_ms.expect("retry scheduled");
    assert!((200..=400).contains(&delay), "unexpected retry delay {delay}");
    assert!(status.retry_due_at.is_some());

    let status = wait_for_status(&handle, |s| s.last_success_at.is_some()).await;
    assert_eq!(status.cycles, 2);
    assert_eq!(status.consecutive_failures, 0);
    assert_eq!(status.retry_in_ms, None);
    assert!(matches!(status.last_outcome, Some(SyncOutcome::Success(_))));
    assert_eq!(store.snapshot().jobs.len(), 1);

    handle.stop();
}

#[tokio::test]
async fn successful_manual_cycle_cancels_pending_retry() {
    let reader = Arc::new(
        ScriptedReader::new()
            .with("events", Duration::ZERO, Reply::Fail("deadline from upstream"))
            .with("events", Duration::ZERO, Reply::Docs(Vec::new())),
    );
    let store = Arc::new(MemoryStore::new());
    let cfg = SyncConfig {
        retry_min_delay_ms: 60_000,
        retry_max_delay_ms: 60_000,
        ..quiet_config()
    };
    let handle = spawn_scheduler(&reader, &store, cfg).await;

    assert!(handle.run_now().await.expect("first run").is_retry());
    assert!(handle.status().retry_in_ms.is_some());

    assert!(handle.run_now().await.expect("second run").is_success());
    let status = handle.status();
    assert_eq!(status.cycles, 2);
    assert_eq!(status.retry_in_ms, None);
    assert_eq!(status.retry_due_at, None);

    handle.stop();
}

#[tokio::test(start_paused = true)]
async fn periodic_ticks_run_cycles() {
    let reader = Arc::new(ScriptedReader::new().with(
        "jobs",
        Duration::ZERO,
        Reply::Docs(vec![doc("j1", json!({"title": "Engineer"}))]),
    ));
    let store = Arc::new(MemoryStore::new());
    let cfg = SyncConfig {
        interval_secs: 1,
        ..quiet_config()
    };
    let handle = spawn_scheduler(&reader, &store, cfg).await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(handle.status().cycles, 0);

    tokio::time::sleep(Duration::from_millis(2_000)).await;
    let status = handle.status();
    assert!(status.cycles >= 2, "cycles = {}", status.cycles);
    assert!(status.last_success_at.is_some());
    assert_eq!(store.snapshot().jobs.len(), 1);

    handle.stop();
}

#[tokio::test(start_paused = true)]
async fn periodic_tick_supersedes_pending_retry() {
    let reader = Arc::new(
        ScriptedReader::new()
            .with("jobs", Duration::ZERO, Reply::Fail("connection refused"))
            .with("jobs", Duration::ZERO, Reply::Docs(Vec::new())),
    );
    let store = Arc::new(MemoryStore::new());
    let cfg = SyncConfig {
        interval_secs: 1,
        retry_min_delay_ms: 60_000,
        retry_max_delay_ms: 60_000,
        ..quiet_config()
    };
    let handle = spawn_scheduler(&reader, &store, cfg).await;

    assert!(handle.run_now().await.expect("run_now").is_retry());
    assert!(handle.status().retry_in_ms.is_some());

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let status = handle.status();
    assert!(status.cycles >= 2, "cycles = {}", status.cycles);
    assert_eq!(status.consecutive_failures, 0);
    assert_eq!(status.retry_in_ms, None);
    assert_eq!(status.retry_due_at, None);

    handle.stop();
}

#[tokio::test(start_paused = true)]
async fn status_is_readable_while_a_cycle_runs() {
    let reader = Arc::new(ScriptedReader::new().with(
        "jobs",
        Duration::from_secs(10),
        Reply::Docs(vec![doc("j1", json!({"title": "Engineer"}))]),
    ));
    let store = Arc::new(MemoryStore::new());
    let handle = spawn_scheduler(&reader, &store, quiet_config()).await;

    handle.trigger().expect("trigger");
    tokio::time::sleep(Duration::from_secs(1)).await;

    let status = handle.status();
    assert!(status.in_progress);
    assert_eq!(status.cycles, 0);
    assert!(status.last_attempt_at.is_some());

    tokio::time::sleep(Duration::from_secs(10)).await;
    let status = handle.status();
    assert!(!status.in_progress);
    assert_eq!(status.cycles, 1);

    handle.stop();
}

#[tokio::test]
async fn run_on_start_and_trigger_run_cycles() {
    let reader = Arc::new(ScriptedReader::new());
    let store = Arc::new(MemoryStore::new());
    let cfg = SyncConfig {
        run_on_start: true,
        ..quiet_config()
    };
    let handle = spawn_scheduler(&reader, &store, cfg).await;

    wait_for_status(&handle, |s| s.cycles >= 1).await;

    handle.trigger().expect("trigger");
    let status = wait_for_status(&handle, |s| s.cycles >= 2).await;
    assert!(matches!(status.last_outcome, Some(SyncOutcome::Success(_))));
    assert_eq!(reader.calls().len(), 4);

    handle.stop();
}
