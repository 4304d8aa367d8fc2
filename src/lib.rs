// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Bookmark Export
//!
//! Downloads the complete list of bookmarks saved on a social platform
//! account and flattens them into a tabular export.
//!
//! ## Features
//!
//! - **Cookie Sessions**: Authenticate with a browser cookie export
//! - **Cursor Pagination**: Walk the bookmark timeline page by page
//! - **Rate-Limit Backoff**: Wait and retry the same page on HTTP 429
//! - **Tolerant Normalization**: Several post shapes, unreadable items dropped
//! - **Tabular Output**: CSV, JSON lines, Parquet or Excel
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bookmark_export::auth::{CredentialSet, SessionBuilder};
//! use bookmark_export::config::ClientConfig;
//! use bookmark_export::pagination::PaginationEngine;
//! use bookmark_export::{output, OutputFormat, ResultSet, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::default();
//!     let credentials = CredentialSet::from_file("cookies.json")?;
//!     let session = SessionBuilder::new(&config).build(&credentials)?;
//!
//!     let engine = PaginationEngine::new(session, &config)?;
//!     let mut results = ResultSet::new();
//!     let report = engine.run(&mut results).await;
//!
//!     output::export_records(&results, ".".as_ref(), OutputFormat::Csv)?;
//!     println!("{} bookmarks in {} pages", report.records, report.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────────────┐   ┌──────────┐
//! │ CredentialSet│ → │ SessionBuilder   │ → │ PaginationEngine│ → │ Exporter │
//! │ cookies.json │   │ headers + jar    │   │ fetch/backoff   │   │ CSV      │
//! └──────────────┘   └──────────────────┘   │ parse/normalize │   │ JSONL    │
//!                                           └─────────────────┘   │ Parquet  │
//!                                                                 └──────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Cookie credentials and authenticated sessions
pub mod auth;

/// Bookmark page requests and suspensions
pub mod http;

/// Raw post to flat record conversion
pub mod normalize;

/// Timeline traversal
pub mod pagination;

/// CSV/JSON/Parquet export
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ClientConfig;
pub use normalize::{NormalizedRecord, ResultSet};
pub use pagination::{Outcome, PaginationEngine, RunReport, StopReason};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
