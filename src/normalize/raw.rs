//! Raw post payloads
//!
//! The same logical attribute lives in different places depending on the
//! API version, so every field is optional and the accessors below try
//! the known locations in order.

use crate::error::{Error, Result};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeSet;

// ============================================================================
// Envelope
// ============================================================================

/// A `tweet_results.result` payload
#[derive(Debug, Clone)]
pub enum RawItem {
    /// Plain `Tweet`
    Tweet(RawTweet),
    /// `TweetWithVisibilityResults`: the post sits under `tweet`
    WithVisibility(RawTweet),
    /// Tombstones and unavailable posts carry nothing to export
    Unavailable { typename: String },
}

impl RawItem {
    /// Classify and decode a result payload
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::record_parse("item is not an object"));
        }

        let typename = value
            .get("__typename")
            .and_then(Value::as_str)
            .unwrap_or("Tweet");

        if let Some(inner) = value.get("tweet").filter(|v| v.is_object()) {
            return Ok(Self::WithVisibility(RawTweet::from_value(inner)?));
        }

        match typename {
            "TweetTombstone" | "TweetUnavailable" => Ok(Self::Unavailable {
                typename: typename.to_string(),
            }),
            _ => Ok(Self::Tweet(RawTweet::from_value(value)?)),
        }
    }

    /// The post, if there is one
    pub fn tweet(&self) -> Option<&RawTweet> {
        match self {
            Self::Tweet(tweet) | Self::WithVisibility(tweet) => Some(tweet),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Which of the known payload shapes a post has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemShape {
    Simple,
    WithLongNote,
    WithEmbeddedQuoteOrRetweet,
}

// ============================================================================
// Post
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTweet {
    pub rest_id: Option<String>,
    pub core: Option<TweetCore>,
    pub legacy: Option<TweetLegacy>,
    pub note_tweet: Option<NoteTweet>,
    pub views: Option<Views>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TweetCore {
    pub user_results: Option<UserResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserResults {
    pub result: Option<UserResult>,
}

/// Author metadata; `core` is the current layout, `legacy` the older one
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserResult {
    pub core: Option<UserNames>,
    pub legacy: Option<UserNames>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserNames {
    pub name: Option<String>,
    pub screen_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TweetLegacy {
    pub id_str: Option<String>,
    pub full_text: Option<String>,
    pub created_at: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub favorite_count: Option<u64>,
    #[serde(deserialize_with = "lenient_count")]
    pub retweet_count: Option<u64>,
    #[serde(deserialize_with = "lenient_count")]
    pub reply_count: Option<u64>,
    #[serde(deserialize_with = "lenient_count")]
    pub quote_count: Option<u64>,
    pub extended_entities: Option<ExtendedEntities>,
    /// Set whenever the key is present, even with a null value
    #[serde(rename = "retweeted_status_result", deserialize_with = "key_present")]
    pub has_retweeted_status: bool,
    pub is_quote_status: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtendedEntities {
    #[serde(deserialize_with = "lenient_list")]
    pub media: Vec<Media>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoteTweet {
    pub note_tweet_results: Option<NoteTweetResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoteTweetResults {
    pub result: Option<NoteTweetResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoteTweetResult {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Views {
    #[serde(deserialize_with = "lenient_count")]
    pub count: Option<u64>,
}

/// Accept a number or a numeric string; anything else reads as absent
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// `null` reads as an empty list and `null` elements are skipped
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let list = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(list.unwrap_or_default().into_iter().flatten().collect())
}

/// Only called when the key exists
fn key_present<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

impl RawTweet {
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| Error::record_parse(e.to_string()))
    }

    pub fn shape(&self) -> ItemShape {
        if self.is_retweet() || self.is_quote() {
            ItemShape::WithEmbeddedQuoteOrRetweet
        } else if self.note_text().is_some() {
            ItemShape::WithLongNote
        } else {
            ItemShape::Simple
        }
    }

    /// `legacy.id_str`, then `rest_id`
    pub fn id(&self) -> Option<&str> {
        self.legacy
            .as_ref()
            .and_then(|l| l.id_str.as_deref())
            .or(self.rest_id.as_deref())
    }

    pub fn note_text(&self) -> Option<&str> {
        self.note_tweet
            .as_ref()?
            .note_tweet_results
            .as_ref()?
            .result
            .as_ref()?
            .text
            .as_deref()
    }

    pub fn full_text(&self) -> Option<&str> {
        self.legacy.as_ref()?.full_text.as_deref()
    }

    /// Long-form note first, then the (possibly truncated) full text
    pub fn text(&self) -> Option<&str> {
        self.note_text().or_else(|| self.full_text())
    }

    pub fn created_at(&self) -> Option<&str> {
        self.legacy.as_ref()?.created_at.as_deref()
    }

    fn user(&self) -> Option<&UserResult> {
        self.core.as_ref()?.user_results.as_ref()?.result.as_ref()
    }

    /// Display name from the `core` layout, then `legacy`
    pub fn author_name(&self) -> Option<&str> {
        let user = self.user()?;
        user.core
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .or_else(|| user.legacy.as_ref().and_then(|l| l.name.as_deref()))
    }

    /// Handle from the `core` layout, then `legacy`
    pub fn author_handle(&self) -> Option<&str> {
        let user = self.user()?;
        user.core
            .as_ref()
            .and_then(|c| c.screen_name.as_deref())
            .or_else(|| user.legacy.as_ref().and_then(|l| l.screen_name.as_deref()))
    }

    pub fn likes(&self) -> u64 {
        self.legacy.as_ref().and_then(|l| l.favorite_count).unwrap_or(0)
    }

    pub fn retweets(&self) -> u64 {
        self.legacy.as_ref().and_then(|l| l.retweet_count).unwrap_or(0)
    }

    pub fn replies(&self) -> u64 {
        self.legacy.as_ref().and_then(|l| l.reply_count).unwrap_or(0)
    }

    pub fn quotes(&self) -> u64 {
        self.legacy.as_ref().and_then(|l| l.quote_count).unwrap_or(0)
    }

    pub fn view_count(&self) -> Option<u64> {
        self.views.as_ref()?.count
    }

    /// Distinct media kinds, sorted
    pub fn media_kinds(&self) -> BTreeSet<&str> {
        self.legacy
            .as_ref()
            .and_then(|l| l.extended_entities.as_ref())
            .map(|e| {
                e.media
                    .iter()
                    .filter_map(|m| m.kind.as_deref())
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_retweet(&self) -> bool {
        self.legacy
            .as_ref()
            .is_some_and(|l| l.has_retweeted_status)
    }

    pub fn is_quote(&self) -> bool {
        self.legacy
            .as_ref()
            .and_then(|l| l.is_quote_status)
            .unwrap_or(false)
    }
}
