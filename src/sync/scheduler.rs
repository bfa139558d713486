use backon::{BackoffBuilder, ExponentialBuilder};
use chrono::{DateTime, Utc};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use serde::Serialize;
use std::{fmt, sync::Arc, time::Duration};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{SyncOutcome, SyncWorker};
use crate::config::SyncConfig;
use crate::error::SyncError;

/// Snapshot of the scheduler's view of past and pending cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    /// A cycle is running right now.
    pub in_progress: bool,
    pub cycles: u64,
    pub consecutive_failures: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<SyncOutcome>,
    /// Backoff delay chosen for the pending retry, if one is scheduled.
    pub retry_in_ms: Option<u64>,
    pub retry_due_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub enum SyncSchedulerMessage {
    /// Periodic tick.
    Tick,
    /// On-demand cycle, fire and forget.
    Trigger,
    /// Backoff timer fired; carries the generation it was armed with.
    RetryDue(u64),
    /// On-demand cycle, replying with its outcome.
    RunNow(RpcReplyPort<SyncOutcome>),
}

#[derive(Debug, Clone, Copy)]
enum CycleTrigger {
    Scheduled,
    Manual,
    Retry,
}

impl fmt::Display for CycleTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => f.write_str("scheduled"),
            Self::Manual => f.write_str("manual"),
            Self::Retry => f.write_str("retry"),
        }
    }
}

/// Handle for driving the sync scheduler actor.
///
/// Status is read from a watch channel the actor publishes to, so it never queues behind a
/// running cycle.
#[derive(Clone)]
pub struct SyncSchedulerHandle {
    actor: ActorRef<SyncSchedulerMessage>,
    status: watch::Receiver<SyncStatus>,
}

impl SyncSchedulerHandle {
    /// Queues a cycle without waiting for it.
    pub fn trigger(&self) -> Result<(), SyncError> {
        ractor::cast!(self.actor, SyncSchedulerMessage::Trigger)
            .map_err(|e| SyncError::RactorError(format!("SyncScheduler cast failed: {e}")))
    }

    /// Queues a cycle and waits for its outcome (behind any cycle already running).
    pub async fn run_now(&self) -> Result<SyncOutcome, SyncError> {
        ractor::call!(self.actor, SyncSchedulerMessage::RunNow)
            .map_err(|e| SyncError::RactorError(format!("SyncScheduler RunNow RPC failed: {e}")))
    }

    /// Latest published status.
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    pub fn stop(&self) {
        self.actor.stop(Some("shutdown".to_string()));
    }
}

struct SyncSchedulerState {
    worker: Arc<SyncWorker>,
    interval: Duration,
    run_on_start: bool,
    retry_policy: ExponentialBuilder,
    backoff: <ExponentialBuilder as BackoffBuilder>::Backoff,
    max_retry_delay: Duration,
    retry_generation: u64,
    pending_retry: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
    status: SyncStatus,
    status_tx: watch::Sender<SyncStatus>,
}

impl SyncSchedulerState {
    fn publish(&self) {
        self.status_tx.send_replace(self.status.clone());
    }

    fn cancel_pending_retry(&mut self) {
        if let Some(task) = self.pending_retry.take() {
            task.abort();
            debug!(generation = self.retry_generation, "Pending sync retry superseded");
        }
        // Any RetryDue already queued for the old generation is ignored.
        self.retry_generation += 1;
        self.status.retry_in_ms = None;
        self.status.retry_due_at = None;
    }

    fn schedule_retry(&mut self, myself: &ActorRef<SyncSchedulerMessage>) {
        let delay = self.backoff.next().unwrap_or(self.max_retry_delay);
        self.retry_generation += 1;
        let generation = self.retry_generation;

        let actor = myself.clone();
        self.pending_retry = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = ractor::cast!(actor, SyncSchedulerMessage::RetryDue(generation)) {
                debug!("SyncScheduler gone before retry fired: {}", e);
            }
        }));

        self.status.retry_in_ms = Some(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX));
        self.status.retry_due_at = chrono::Duration::from_std(delay)
            .ok()
            .map(|d| Utc::now() + d);

        info!(
            delay_ms = self.status.retry_in_ms,
            consecutive_failures = self.status.consecutive_failures,
            "Sync retry scheduled"
        );
    }
}

struct SyncSchedulerActor;

impl SyncSchedulerActor {
    async fn run_cycle(
        &self,
        myself: &ActorRef<SyncSchedulerMessage>,
        state: &mut SyncSchedulerState,
        trigger: CycleTrigger,
    ) -> SyncOutcome {
        state.cancel_pending_retry();
        state.status.in_progress = true;
        state.status.last_attempt_at = Some(Utc::now());
        state.publish();
        debug!(%trigger, cycle = state.status.cycles + 1, "Running sync cycle");

        let outcome = state.worker.run().await;
        state.status.cycles += 1;

        match &outcome {
            SyncOutcome::Success(_) => {
                state.status.consecutive_failures = 0;
                state.status.last_success_at = Some(Utc::now());
                state.backoff = state.retry_policy.build();
            }
            SyncOutcome::Retry(_) => {
                state.status.consecutive_failures =
                    state.status.consecutive_failures.saturating_add(1);
                state.schedule_retry(myself);
            }
        }

        state.status.in_progress = false;
        state.status.last_outcome = Some(outcome.clone());
        state.publish();
        outcome
    }
}

#[ractor::async_trait]
impl Actor for SyncSchedulerActor {
    type Msg = SyncSchedulerMessage;
    type State = SyncSchedulerState;
    type Arguments = (Arc<SyncWorker>, SyncConfig, watch::Sender<SyncStatus>);

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        (worker, cfg, status_tx): Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let mut retry_policy = ExponentialBuilder::default()
            .with_min_delay(cfg.retry_min_delay())
            .with_max_delay(cfg.retry_max_delay())
            .with_max_times(usize::MAX);
        if cfg.retry_jitter {
            retry_policy = retry_policy.with_jitter();
        }

        info!(
            interval_secs = cfg.interval().as_secs(),
            run_on_start = cfg.run_on_start,
            cycle_timeout_ms = cfg.cycle_timeout_ms,
            fetch_timeout_ms = cfg.fetch_timeout_ms,
            retry_min_delay_ms = cfg.retry_min_delay_ms,
            retry_max_delay_ms = cfg.retry_max_delay_ms,
            retry_jitter = cfg.retry_jitter,
            "SyncScheduler config loaded"
        );

        Ok(SyncSchedulerState {
            worker,
            interval: cfg.interval(),
            run_on_start: cfg.run_on_start,
            retry_policy,
            backoff: retry_policy.build(),
            max_retry_delay: cfg.retry_max_delay(),
            retry_generation: 0,
            pending_retry: None,
            ticker: None,
            status: SyncStatus::default(),
            status_tx,
        })
    }

    async fn post_start(
        &self,
        myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let actor = myself.clone();
        let period = state.interval;
        state.ticker = Some(tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                if ractor::cast!(actor, SyncSchedulerMessage::Tick).is_err() {
                    break;
                }
            }
        }));

        if state.run_on_start {
            ractor::cast!(myself, SyncSchedulerMessage::Trigger).map_err(|e| {
                ActorProcessingErr::from(format!("initial sync trigger failed: {e}"))
            })?;
        }

        info!("SyncScheduler started");
        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }
        if let Some(retry) = state.pending_retry.take() {
            retry.abort();
        }
        info!(cycles = state.status.cycles, "SyncScheduler stopped");
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SyncSchedulerMessage::Tick => {
                self.run_cycle(&myself, state, CycleTrigger::Scheduled).await;
            }
            SyncSchedulerMessage::Trigger => {
                self.run_cycle(&myself, state, CycleTrigger::Manual).await;
            }
            SyncSchedulerMessage::RetryDue(generation) => {
                if generation == state.retry_generation && state.pending_retry.is_some() {
                    state.pending_retry = None;
                    self.run_cycle(&myself, state, CycleTrigger::Retry).await;
                } else {
                    debug!(generation, "Stale sync retry ignored");
                }
            }
            SyncSchedulerMessage::RunNow(reply) => {
                let outcome = self.run_cycle(&myself, state, CycleTrigger::Manual).await;
                if reply.send(outcome).is_err() {
                    warn!("RunNow caller went away before the outcome was ready");
                }
            }
        }
        Ok(())
    }
}

/// Spawn the sync scheduler actor and return a cloneable handle.
///
/// The actor handles one message at a time, so cycles it runs never overlap.
pub async fn spawn(
    worker: Arc<SyncWorker>,
    cfg: SyncConfig,
) -> Result<SyncSchedulerHandle, SyncError> {
    let (status_tx, status) = watch::channel(SyncStatus::default());
    let (actor, _jh) = Actor::spawn(None, SyncSchedulerActor, (worker, cfg, status_tx))
        .await
        .map_err(|e| SyncError::RactorError(format!("SyncScheduler spawn failed: {e}")))?;

    Ok(SyncSchedulerHandle { actor, status })
}
