use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sync cycle deadlines and scheduler cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Deadline for a whole cycle (both collections).
    /// TOML: `sync.cycle_timeout_ms`. Default: `30000`.
    #[serde(default = "default_cycle_timeout_ms")]
    pub cycle_timeout_ms: u64,

    /// Deadline for fetching a single collection; clamped to the cycle deadline.
    /// TOML: `sync.fetch_timeout_ms`. Default: `20000`.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Period between scheduled cycles.
    /// TOML: `sync.interval_secs`. Default: `7200`.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Run one cycle as soon as the scheduler starts.
    /// TOML: `sync.run_on_start`. Default: `true`.
    #[serde(default = "default_run_on_start")]
    pub run_on_start: bool,

    /// First retry delay after a failed cycle; doubles on each consecutive failure.
    /// TOML: `sync.retry_min_delay_ms`. Default: `30000`.
    #[serde(default = "default_retry_min_delay_ms")]
    pub retry_min_delay_ms: u64,

    /// Upper bound for the retry delay.
    /// TOML: `sync.retry_max_delay_ms`. Default: `18000000` (5h).
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    /// Randomize retry delays.
    /// TOML: `sync.retry_jitter`. Default: `true`.
    #[serde(default = "default_retry_jitter")]
    pub retry_jitter: bool,
}

impl SyncConfig {
    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_millis(self.cycle_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn retry_min_delay(&self) -> Duration {
        Duration::from_millis(self.retry_min_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms.max(self.retry_min_delay_ms))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cycle_timeout_ms: default_cycle_timeout_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            interval_secs: default_interval_secs(),
            run_on_start: default_run_on_start(),
            retry_min_delay_ms: default_retry_min_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            retry_jitter: default_retry_jitter(),
        }
    }
}

fn default_cycle_timeout_ms() -> u64 {
    30_000
}

fn default_fetch_timeout_ms() -> u64 {
    20_000
}

fn default_interval_secs() -> u64 {
    2 * 60 * 60
}

fn default_run_on_start() -> bool {
    true
}

fn default_retry_min_delay_ms() -> u64 {
    30_000
}

fn default_retry_max_delay_ms() -> u64 {
    5 * 60 * 60 * 1000
}

fn default_retry_jitter() -> bool {
    true
}
