//! Record normalization
//!
//! Turns one schema-variable post payload into a flat [`NormalizedRecord`].
//!
//! # Overview
//!
//! - `RawItem` - envelope of a post as the timeline returns it
//! - `RawTweet` - the post itself, every field optional
//! - `RecordNormalizer` - resolves each output field through an ordered
//!   fallback chain; a payload that cannot be read is dropped, never raised

mod normalizer;
mod raw;
mod record;

pub use normalizer::{format_timestamp, RecordNormalizer};
pub use raw::{ItemShape, RawItem, RawTweet};
pub use record::{NormalizedRecord, ResultSet, FIELD_SCHEMA};
