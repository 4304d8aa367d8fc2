//! Raw post → [`NormalizedRecord`]

use super::raw::{ItemShape, RawItem, RawTweet};
use super::record::NormalizedRecord;
use crate::config::ClientConfig;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// `created_at` as the API writes it, e.g. `Wed Oct 10 20:19:24 +0000 2018`
const SOURCE_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stateless apart from the site root used for permalinks
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    base_url: String,
}

impl RecordNormalizer {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Normalize a `tweet_results.result` payload, or `None` to drop it.
    /// Never fails past this point; drops are logged at debug level.
    pub fn normalize(&self, raw: &Value) -> Option<NormalizedRecord> {
        match self.try_normalize(raw) {
            Ok(record) => record,
            Err(e) => {
                debug!("Dropping item: {e}");
                None
            }
        }
    }

    /// Like [`normalize`](Self::normalize) but tells an unreadable payload
    /// (`Err`) apart from a tombstone or unavailable post (`Ok(None)`)
    pub fn try_normalize(&self, raw: &Value) -> Result<Option<NormalizedRecord>> {
        match RawItem::from_value(raw)? {
            RawItem::Tweet(tweet) | RawItem::WithVisibility(tweet) => {
                Ok(Some(self.flatten(&tweet)))
            }
            RawItem::Unavailable { typename } => {
                debug!("Skipping {typename}: no content to export");
                Ok(None)
            }
        }
    }

    /// Resolve every output field from a decoded post
    pub fn flatten(&self, tweet: &RawTweet) -> NormalizedRecord {
        let id = tweet.id().unwrap_or_default().to_string();
        let handle = tweet.author_handle().unwrap_or_default().to_string();

        let url = if !handle.is_empty() && !id.is_empty() {
            format!("{}/{handle}/status/{id}", self.base_url)
        } else {
            String::new()
        };

        let media_types = tweet
            .media_kinds()
            .into_iter()
            .collect::<Vec<_>>()
            .join(", ");

        let text = match tweet.shape() {
            ItemShape::Simple => tweet.full_text(),
            ItemShape::WithLongNote => tweet.note_text(),
            // A quote or retweet may still carry a long note of its own
            ItemShape::WithEmbeddedQuoteOrRetweet => tweet.text(),
        };

        NormalizedRecord {
            date: tweet.created_at().map(format_timestamp).unwrap_or_default(),
            author: tweet.author_name().unwrap_or_default().to_string(),
            text: text.unwrap_or_default().to_string(),
            likes: tweet.likes(),
            retweets: tweet.retweets(),
            replies: tweet.replies(),
            quotes: tweet.quotes(),
            views: tweet.view_count(),
            media_types,
            is_retweet: tweet.is_retweet().into(),
            is_quote: tweet.is_quote().into(),
            id,
            handle,
            url,
        }
    }
}

/// Reformat an API timestamp as `YYYY-MM-DD HH:MM:SS` in UTC; a value
/// that does not parse is returned unchanged
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_str(raw, SOURCE_DATE_FORMAT) {
        Ok(dt) => dt.with_timezone(&Utc).format(OUTPUT_DATE_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}
