//! Pagination engine
//!
//! ```text
//! Start → Fetching → Parsing → Fetching … → Done
//!             │  ↑       └──────────────────→ Failed
//!             ↓  │
//!           Backoff
//! ```
//!
//! Strictly sequential: one request in flight, every wait is a full
//! suspension through the injected [`Sleeper`].

use super::timeline::parse_page;
use super::types::{Outcome, PageSummary, RunReport, StopReason};
use crate::auth::Session;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, PageResponse, Pause, Sleeper, TokioSleeper};
use crate::normalize::{RecordNormalizer, ResultSet};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

enum State {
    Start,
    Fetching,
    Backoff(Duration),
    Parsing(Value),
    Done(StopReason),
    Failed(Error),
}

/// Fetches every reachable bookmark page and normalizes its items
pub struct PaginationEngine {
    // Held for the whole run; the client shares its cookie jar.
    session: Session,
    client: HttpClient,
    normalizer: RecordNormalizer,
    sleeper: Box<dyn Sleeper>,
    max_pages: u32,
    rate_limit_backoff: Duration,
    honor_retry_after: bool,
    max_rate_limit_retries: Option<u32>,
    politeness_delay: Duration,
}

impl PaginationEngine {
    /// Create an engine that owns `session` for its lifetime
    pub fn new(session: Session, config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::new(&session, config)?;

        Ok(Self {
            session,
            client,
            normalizer: RecordNormalizer::new(config),
            sleeper: Box::new(TokioSleeper),
            max_pages: config.max_pages,
            rate_limit_backoff: config.rate_limit_backoff(),
            honor_retry_after: config.honor_retry_after,
            max_rate_limit_retries: config.max_rate_limit_retries,
            politeness_delay: config.politeness_delay(),
        })
    }

    /// Replace the wall-clock sleeper
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run to completion or the first systemic error. Records are appended
    /// to `results` as each page is parsed and stay there on failure.
    pub async fn run(&self, results: &mut ResultSet) -> RunReport {
        let start = Instant::now();
        let initial_len = results.len();

        let mut state = State::Start;
        let mut cursor: Option<String> = None;
        let mut pages = 0u32;
        let mut dropped = 0usize;
        let mut unavailable = 0usize;
        let mut backoffs = 0u32;
        let mut consecutive_rate_limits = 0u32;

        let outcome = loop {
            state = match state {
                State::Start => {
                    info!("Fetching bookmarks from {}", self.client.endpoint());
                    State::Fetching
                }

                State::Fetching => match self.client.fetch_page(cursor.as_deref()).await {
                    Ok(PageResponse::Page(body)) => {
                        consecutive_rate_limits = 0;
                        State::Parsing(body)
                    }
                    Ok(PageResponse::RateLimited { retry_after }) => {
                        consecutive_rate_limits += 1;
                        let wait = self.backoff_for(retry_after);
                        match self.max_rate_limit_retries {
                            Some(max) if consecutive_rate_limits > max => {
                                State::Failed(Error::RateLimited {
                                    retry_after_seconds: wait.as_secs(),
                                })
                            }
                            _ => State::Backoff(wait),
                        }
                    }
                    Err(e) => State::Failed(e),
                },

                State::Backoff(wait) => {
                    warn!("Rate limited (429), waiting {}s before retrying", wait.as_secs());
                    self.sleeper.sleep(Pause::RateLimit, wait).await;
                    backoffs += 1;
                    // Same cursor: the page did not advance
                    State::Fetching
                }

                State::Parsing(body) => match self.parse(&body, results) {
                    Err(e) => State::Failed(e),
                    Ok(page) => {
                        pages += 1;
                        dropped += page.dropped;
                        unavailable += page.unavailable;
                        info!(
                            "Page {pages}: {} bookmarks (total: {})",
                            page.records,
                            results.len() - initial_len
                        );

                        // Tombstones still prove the timeline has content
                        match page.next_cursor {
                            Some(next) if page.records + page.unavailable > 0 => {
                                cursor = Some(next);
                                if pages >= self.max_pages {
                                    State::Done(StopReason::MaxPagesReached)
                                } else {
                                    self.sleeper
                                        .sleep(Pause::Politeness, self.politeness_delay)
                                        .await;
                                    State::Fetching
                                }
                            }
                            _ => State::Done(StopReason::Exhausted),
                        }
                    }
                },

                State::Done(reason) => break Outcome::Done(reason),
                State::Failed(e) => break Outcome::Failed(e),
            };
        };

        let records = results.len() - initial_len;
        match &outcome {
            Outcome::Done(StopReason::Exhausted) => {
                info!("End of bookmarks: {records} records in {pages} pages");
            }
            Outcome::Done(StopReason::MaxPagesReached) => {
                warn!("Stopped at the page limit ({}): {records} records", self.max_pages);
            }
            Outcome::Failed(e) => {
                error!("Pagination stopped after {pages} pages ({records} records kept): {e}");
            }
        }

        RunReport {
            outcome,
            pages,
            records,
            dropped,
            unavailable,
            backoffs,
            duration: start.elapsed(),
        }
    }

    /// Normalize one page into `results`
    fn parse(&self, body: &Value, results: &mut ResultSet) -> Result<PageSummary> {
        let page = parse_page(body)?;
        let mut summary = PageSummary {
            next_cursor: page.bottom_cursor,
            ..PageSummary::default()
        };

        for item in page.items {
            match self.normalizer.try_normalize(item) {
                Ok(Some(record)) => {
                    results.push(record);
                    summary.records += 1;
                }
                Ok(None) => summary.unavailable += 1,
                Err(e) => {
                    debug!("Dropping item: {e}");
                    summary.dropped += 1;
                }
            }
        }

        if summary.dropped > 0 {
            debug!("Dropped {} unreadable items", summary.dropped);
        }
        Ok(summary)
    }

    /// The fixed fallback, extended by a longer server hint when allowed.
    /// A hint never shortens the wait.
    fn backoff_for(&self, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) if self.honor_retry_after => hint.max(self.rate_limit_backoff),
            _ => self.rate_limit_backoff,
        }
    }
}

impl std::fmt::Debug for PaginationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationEngine")
            .field("client", &self.client)
            .field("max_pages", &self.max_pages)
            .field("rate_limit_backoff", &self.rate_limit_backoff)
            .field("politeness_delay", &self.politeness_delay)
            .finish_non_exhaustive()
    }
}
