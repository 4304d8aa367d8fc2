//! Output module
//!
//! Renders the final record set to a tabular file.
//!
//! # Overview
//!
//! This module provides:
//! - The fixed Arrow schema of an export, in column order
//! - Conversion of records into an Arrow RecordBatch
//! - CSV, JSON-lines, Parquet and Excel exporters
//! - Timestamped output file names

mod schema;
mod writer;

pub use schema::{record_schema, records_to_batch};
pub use writer::{
    export_records, exporter_for, output_path, CsvExporter, Exporter, JsonLinesExporter,
    ParquetExporter, ParquetWriterConfig, XlsxExporter,
};
