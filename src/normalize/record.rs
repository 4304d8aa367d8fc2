//! Flat record handed to the exporter

use crate::types::Flag;
use serde::Serialize;

/// Column order of every export
pub const FIELD_SCHEMA: [&str; 14] = [
    "ID",
    "Date",
    "Author",
    "Handle",
    "Text",
    "Likes",
    "Retweets",
    "Replies",
    "Quotes",
    "Views",
    "MediaTypes",
    "IsRetweet",
    "IsQuote",
    "URL",
];

/// One bookmark, flattened
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    #[serde(rename = "ID")]
    pub id: String,
    /// `YYYY-MM-DD HH:MM:SS` (UTC), or the raw value when it did not parse
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Handle")]
    pub handle: String,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Likes")]
    pub likes: u64,
    #[serde(rename = "Retweets")]
    pub retweets: u64,
    #[serde(rename = "Replies")]
    pub replies: u64,
    #[serde(rename = "Quotes")]
    pub quotes: u64,
    #[serde(rename = "Views")]
    pub views: Option<u64>,
    #[serde(rename = "MediaTypes")]
    pub media_types: String,
    #[serde(rename = "IsRetweet")]
    pub is_retweet: Flag,
    #[serde(rename = "IsQuote")]
    pub is_quote: Flag,
    #[serde(rename = "URL")]
    pub url: String,
}

/// Records in fetch order (page order, then entry order). No deduplication.
pub type ResultSet = Vec<NormalizedRecord>;
