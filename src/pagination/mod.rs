//! Pagination module
//!
//! Walks the bookmarks timeline one page at a time.
//!
//! # Overview
//!
//! - `parse_page` - locates the timeline instructions of one response and
//!   classifies its entries into cursor markers and content items
//! - `PaginationEngine` - the fetch loop: request, interpret, back off,
//!   normalize, decide whether to continue
//!
//! The engine appends into a caller-owned [`ResultSet`](crate::normalize::ResultSet)
//! so whatever was collected before a fatal error is still there afterwards.

mod engine;
mod timeline;
mod types;

pub use engine::PaginationEngine;
pub use timeline::{classify_entry, parse_page, TimelineEntry, TimelinePage};
pub use types::{Outcome, PageSummary, RunReport, StopReason};

#[cfg(test)]
mod tests;
