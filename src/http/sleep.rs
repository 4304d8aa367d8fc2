//! Suspensions of the fetch loop
//!
//! The engine never calls `tokio::time::sleep` directly, so tests can
//! observe every wait without spending it.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Why the loop is waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// Cool-down after a 429
    RateLimit,
    /// Gap between two successive pages
    Politeness,
}

/// Suspends the single execution path
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, pause: Pause, duration: Duration);
}

/// Real wall-clock sleep
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, _pause: Pause, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Records requested waits and returns immediately. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    calls: Arc<Mutex<Vec<(Pause, Duration)>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every wait so far, in order
    pub fn calls(&self) -> Vec<(Pause, Duration)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Waits of one kind
    pub fn count(&self, pause: Pause) -> usize {
        self.calls().iter().filter(|(p, _)| *p == pause).count()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, pause: Pause, duration: Duration) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((pause, duration));
    }
}
