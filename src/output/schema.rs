//! Arrow schema of an export
//!
//! Column order follows [`FIELD_SCHEMA`]; counts are unsigned integers,
//! `Views` is the only nullable column, flags are written as `Yes`/`No`.

use crate::error::Result;
use crate::normalize::{NormalizedRecord, FIELD_SCHEMA};
use arrow::array::{ArrayRef, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Schema shared by every format
pub fn record_schema() -> Schema {
    let fields: Vec<Field> = FIELD_SCHEMA
        .iter()
        .map(|name| match *name {
            "Likes" | "Retweets" | "Replies" | "Quotes" => Field::new(*name, DataType::UInt64, false),
            "Views" => Field::new(*name, DataType::UInt64, true),
            _ => Field::new(*name, DataType::Utf8, false),
        })
        .collect();
    Schema::new(fields)
}

/// Convert records into one batch, preserving order
pub fn records_to_batch(records: &[NormalizedRecord]) -> Result<RecordBatch> {
    fn strings<'a>(
        records: &'a [NormalizedRecord],
        f: impl Fn(&'a NormalizedRecord) -> &'a str,
    ) -> ArrayRef {
        Arc::new(StringArray::from_iter_values(records.iter().map(f)))
    }

    fn counts(records: &[NormalizedRecord], f: impl Fn(&NormalizedRecord) -> u64) -> ArrayRef {
        Arc::new(UInt64Array::from_iter_values(records.iter().map(f)))
    }

    let columns: Vec<ArrayRef> = vec![
        strings(records, |r| r.id.as_str()),
        strings(records, |r| r.date.as_str()),
        strings(records, |r| r.author.as_str()),
        strings(records, |r| r.handle.as_str()),
        strings(records, |r| r.text.as_str()),
        counts(records, |r| r.likes),
        counts(records, |r| r.retweets),
        counts(records, |r| r.replies),
        counts(records, |r| r.quotes),
        Arc::new(UInt64Array::from(
            records.iter().map(|r| r.views).collect::<Vec<_>>(),
        )),
        strings(records, |r| r.media_types.as_str()),
        strings(records, |r| r.is_retweet.as_str()),
        strings(records, |r| r.is_quote.as_str()),
        strings(records, |r| r.url.as_str()),
    ];

    Ok(RecordBatch::try_new(Arc::new(record_schema()), columns)?)
}
