//! Pagination types
//!
//! Terminal outcomes and per-run statistics of the fetch loop.

use crate::error::Error;
use std::time::Duration;

/// Why a run ended successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No bottom cursor, or a page with neither records nor unavailable posts
    Exhausted,
    /// The configured page limit was hit
    MaxPagesReached,
}

/// Terminal state of a run
#[derive(Debug)]
pub enum Outcome {
    /// Success, possibly partial
    Done(StopReason),
    /// Systemic error; records collected before it are kept
    Failed(Error),
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// What one parsed page contributed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    /// Items normalized and appended
    pub records: usize,
    /// Items the normalizer rejected
    pub dropped: usize,
    /// Tombstones and unavailable posts
    pub unavailable: usize,
    /// Bottom cursor marker, if the page had one
    pub next_cursor: Option<String>,
}

/// Summary of a finished run
#[derive(Debug)]
pub struct RunReport {
    pub outcome: Outcome,
    /// Pages fetched and parsed
    pub pages: u32,
    /// Records appended during this run
    pub records: usize,
    /// Items dropped by the normalizer
    pub dropped: usize,
    /// Tombstones and unavailable posts skipped
    pub unavailable: usize,
    /// Rate-limit waits taken
    pub backoffs: u32,
    pub duration: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_done()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.outcome {
            Outcome::Done(reason) => Some(reason),
            Outcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.outcome {
            Outcome::Failed(e) => Some(e),
            Outcome::Done(_) => None,
        }
    }
}
