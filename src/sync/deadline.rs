use serde::Serialize;
use std::{fmt, future::IntoFuture, time::Duration};
use tokio::time::Instant;

use super::SyncStage;
use crate::error::SyncError;

/// Which budget a deadline came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineScope {
    /// The whole sync cycle.
    Cycle,
    /// A single collection fetch.
    Fetch,
}

impl fmt::Display for DeadlineScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle => f.write_str("cycle"),
            Self::Fetch => f.write_str("fetch"),
        }
    }
}

/// A point in time by which some work must finish, passed explicitly through each step.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    scope: DeadlineScope,
    budget: Duration,
}

impl Deadline {
    pub fn after(scope: DeadlineScope, budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            scope,
            budget,
        }
    }

    /// Derives a deadline for a sub-step: `budget` from now, but never past `self`.
    ///
    /// When the parent expires first the parent is returned unchanged, so the error names the
    /// budget that actually ran out.
    pub fn child(&self, scope: DeadlineScope, budget: Duration) -> Self {
        let own = Instant::now() + budget;
        if own < self.at {
            Self {
                at: own,
                scope,
                budget,
            }
        } else {
            *self
        }
    }

    pub fn instant(&self) -> Instant {
        self.at
    }

    pub fn scope(&self) -> DeadlineScope {
        self.scope
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.at
    }

    pub fn exceeded(&self, stage: SyncStage) -> SyncError {
        SyncError::DeadlineExceeded {
            stage,
            scope: self.scope,
            budget: self.budget,
        }
    }

    /// Drives `fut` until it completes or the deadline passes; on expiry the future is dropped.
    pub async fn run<F, T>(&self, stage: SyncStage, fut: F) -> Result<T, SyncError>
    where
        F: IntoFuture<Output = Result<T, SyncError>>,
    {
        match tokio::time::timeout_at(self.at, fut).await {
            Ok(res) => res,
            Err(_) => Err(self.exceeded(stage)),
        }
    }
}
