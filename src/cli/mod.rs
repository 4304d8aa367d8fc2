//! CLI module
//!
//! Command-line interface for exporting bookmarks.
//!
//! # Flow
//!
//! - Load the cookie export and optional config overrides
//! - Build the session and run the pagination engine
//! - Export whatever was collected, then report

mod commands;
mod runner;

pub use commands::{Cli, FormatArg};
pub use runner::{ExportSummary, Runner};
