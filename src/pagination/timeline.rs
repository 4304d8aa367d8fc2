//! Timeline response parsing
//!
//! ```text
//! data.bookmark_timeline_v2.timeline.instructions[]
//!   { type: "TimelineAddEntries", entries: [
//!       { entryId: "tweet-…",         content.itemContent.tweet_results.result }
//!       { entryId: "cursor-bottom-…", content: { entryType: "TimelineTimelineCursor", value } }
//!   ] }
//! ```

use crate::error::{Error, Result};
use serde_json::Value;

const INSTRUCTIONS_PATH: [&str; 4] = ["data", "bookmark_timeline_v2", "timeline", "instructions"];

const ADD_ENTRIES: &str = "TimelineAddEntries";
const CURSOR_ENTRY_TYPE: &str = "TimelineTimelineCursor";

/// One classified timeline entry
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEntry<'a> {
    /// Cursor to the next (older) page
    BottomCursor(String),
    /// Cursor marker not used for traversal
    OtherCursor,
    /// Embedded raw post
    Item(&'a Value),
    /// Content entry without a post payload
    Empty,
}

/// Content of one response page, in entry order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelinePage<'a> {
    pub items: Vec<&'a Value>,
    pub bottom_cursor: Option<String>,
}

/// Locate the instructions and collect items and the bottom cursor
pub fn parse_page(body: &Value) -> Result<TimelinePage<'_>> {
    let mut current = body;
    for key in INSTRUCTIONS_PATH {
        current = current.get(key).ok_or_else(|| {
            Error::malformed(format!(
                "missing '{key}' on the way to {}",
                INSTRUCTIONS_PATH.join(".")
            ))
        })?;
    }

    let instructions = current
        .as_array()
        .ok_or_else(|| Error::malformed("'instructions' is not an array"))?;

    let mut page = TimelinePage::default();

    let entries = instructions
        .iter()
        .filter(|i| i.get("type").and_then(Value::as_str) == Some(ADD_ENTRIES))
        .filter_map(|i| i.get("entries").and_then(Value::as_array))
        .flatten();

    for entry in entries {
        match classify_entry(entry) {
            TimelineEntry::BottomCursor(cursor) => page.bottom_cursor = Some(cursor),
            TimelineEntry::Item(item) => page.items.push(item),
            TimelineEntry::OtherCursor | TimelineEntry::Empty => {}
        }
    }

    Ok(page)
}

/// Classify an entry by its `entryId` prefix
pub fn classify_entry(entry: &Value) -> TimelineEntry<'_> {
    let entry_id = entry.get("entryId").and_then(Value::as_str).unwrap_or("");
    let content = entry.get("content");

    if entry_id.contains("cursor-bottom") || entry_id.contains("cursor-top") {
        let is_cursor = content
            .and_then(|c| c.get("entryType"))
            .and_then(Value::as_str)
            == Some(CURSOR_ENTRY_TYPE);

        if is_cursor && entry_id.contains("cursor-bottom") {
            if let Some(value) = content
                .and_then(|c| c.get("value"))
                .and_then(Value::as_str)
                .filter(|v| !v.is_empty())
            {
                return TimelineEntry::BottomCursor(value.to_string());
            }
        }
        return TimelineEntry::OtherCursor;
    }

    let result = content
        .and_then(|c| c.get("itemContent"))
        .and_then(|c| c.get("tweet_results"))
        .and_then(|r| r.get("result"));

    match result {
        Some(Value::Null) | None => TimelineEntry::Empty,
        Some(Value::Object(map)) if map.is_empty() => TimelineEntry::Empty,
        Some(item) => TimelineEntry::Item(item),
    }
}
