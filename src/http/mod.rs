//! HTTP module
//!
//! Sends one bookmarks page request at a time and interprets the status.
//!
//! # Features
//!
//! - **Page requests**: `variables` / `features` query parameters
//! - **Status interpretation**: 401, 429 and other failures mapped to errors
//! - **Suspensions**: backoff and politeness waits go through a `Sleeper`

mod client;
mod sleep;

pub use client::{HttpClient, PageResponse};
pub use sleep::{Pause, RecordingSleeper, Sleeper, TokioSleeper};
