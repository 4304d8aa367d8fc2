//! Export writers
//!
//! Every exporter receives the ordered record set and writes one file.

use super::schema::records_to_batch;
use crate::error::{Error, Result, ResultExt};
use crate::normalize::{NormalizedRecord, FIELD_SCHEMA};
use crate::types::OutputFormat;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Local};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Renders records to a tabular file
pub trait Exporter {
    /// Write `records` to `path`, returning the number of rows written
    fn export(&self, records: &[NormalizedRecord], path: &Path) -> Result<usize>;

    fn format(&self) -> OutputFormat;
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path)
        .map_err(|e| Error::output(format!("Failed to create {}: {e}", path.display())))
}

// ============================================================================
// CSV
// ============================================================================

/// CSV with a header row
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(&self, records: &[NormalizedRecord], path: &Path) -> Result<usize> {
        let batch = records_to_batch(records)?;
        let mut writer = arrow::csv::WriterBuilder::new()
            .with_header(true)
            .build(create_file(path)?);
        writer.write(&batch)?;
        Ok(batch.num_rows())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}

// ============================================================================
// JSON lines
// ============================================================================

/// One JSON object per record; an absent view count is omitted
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesExporter;

impl Exporter for JsonLinesExporter {
    fn export(&self, records: &[NormalizedRecord], path: &Path) -> Result<usize> {
        let batch = records_to_batch(records)?;
        let mut writer = arrow::json::LineDelimitedWriter::new(create_file(path)?);
        writer.write(&batch)?;
        writer.finish()?;
        Ok(batch.num_rows())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

// ============================================================================
// Parquet
// ============================================================================

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    statistics_enabled: bool,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            statistics_enabled: true,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(parquet::basic::ZstdLevel::default());
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    fn build_properties(&self) -> WriterProperties {
        let mut builder = WriterProperties::builder().set_compression(self.compression);

        if !self.statistics_enabled {
            builder =
                builder.set_statistics_enabled(parquet::file::properties::EnabledStatistics::None);
        }

        builder.build()
    }
}

/// Single-row-group Parquet file
#[derive(Debug, Clone, Default)]
pub struct ParquetExporter {
    config: ParquetWriterConfig,
}

impl ParquetExporter {
    pub fn new(config: ParquetWriterConfig) -> Self {
        Self { config }
    }

    fn write_batch(&self, batch: &RecordBatch, path: &Path) -> Result<usize> {
        let props = self.config.build_properties();
        let mut writer = ArrowWriter::try_new(create_file(path)?, batch.schema(), Some(props))
            .map_err(|e| Error::output(format!("Failed to create Parquet writer: {e}")))?;

        writer
            .write(batch)
            .map_err(|e| Error::output(format!("Failed to write batch: {e}")))?;
        writer
            .close()
            .map_err(|e| Error::output(format!("Failed to close Parquet writer: {e}")))?;
        Ok(batch.num_rows())
    }
}

impl Exporter for ParquetExporter {
    fn export(&self, records: &[NormalizedRecord], path: &Path) -> Result<usize> {
        let batch = records_to_batch(records)?;
        self.write_batch(&batch, path)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Parquet
    }
}

// ============================================================================
// Excel
// ============================================================================

const SHEET_NAME: &str = "Bookmarks";

/// Column widths in [`FIELD_SCHEMA`] order
const COLUMN_WIDTHS: [f64; 14] = [
    20.0, 20.0, 20.0, 18.0, 60.0, 10.0, 12.0, 10.0, 10.0, 10.0, 15.0, 12.0, 10.0, 55.0,
];

const TEXT_COLUMN: u16 = 4;

/// Cell formats for one data row
struct RowStyle {
    cell: Format,
    text: Format,
}

impl RowStyle {
    fn new(banded: bool) -> Self {
        let mut cell = Format::new().set_align(FormatAlign::Top);
        if banded {
            cell = cell.set_background_color(Color::RGB(0x00E8_F5FE));
        }
        let text = cell.clone().set_text_wrap();
        Self { cell, text }
    }
}

/// Single-sheet workbook: colored header row frozen in place, an
/// auto-filter over all columns, banded data rows
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxExporter;

impl XlsxExporter {
    fn write_header(sheet: &mut Worksheet) -> Result<()> {
        let header = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x001D_A1F2))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        for (col, (name, width)) in FIELD_SCHEMA.iter().zip(COLUMN_WIDTHS).enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(0, col, *name, &header)?;
            sheet.set_column_width(col, width)?;
        }
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn write_row(
        sheet: &mut Worksheet,
        row: u32,
        record: &NormalizedRecord,
        style: &RowStyle,
    ) -> Result<()> {
        let strings = [
            (0, record.id.as_str()),
            (1, record.date.as_str()),
            (2, record.author.as_str()),
            (3, record.handle.as_str()),
            (TEXT_COLUMN, record.text.as_str()),
            (10, record.media_types.as_str()),
            (11, record.is_retweet.as_str()),
            (12, record.is_quote.as_str()),
            (13, record.url.as_str()),
        ];
        for (col, value) in strings {
            let format = if col == TEXT_COLUMN { &style.text } else { &style.cell };
            sheet.write_string_with_format(row, col, value, format)?;
        }

        let counts = [
            (5, record.likes),
            (6, record.retweets),
            (7, record.replies),
            (8, record.quotes),
        ];
        for (col, value) in counts {
            sheet.write_number_with_format(row, col, value as f64, &style.cell)?;
        }

        match record.views {
            Some(views) => sheet.write_number_with_format(row, 9, views as f64, &style.cell)?,
            None => sheet.write_blank(row, 9, &style.cell)?,
        };
        Ok(())
    }
}

impl Exporter for XlsxExporter {
    fn export(&self, records: &[NormalizedRecord], path: &Path) -> Result<usize> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        Self::write_header(sheet)?;

        let plain = RowStyle::new(false);
        let banded = RowStyle::new(true);
        for (i, record) in records.iter().enumerate() {
            // First data row is banded
            let style = if i % 2 == 0 { &banded } else { &plain };
            Self::write_row(sheet, i as u32 + 1, record, style)?;
        }

        sheet.set_freeze_panes(1, 0)?;
        sheet.autofilter(0, 0, records.len() as u32, (FIELD_SCHEMA.len() - 1) as u16)?;

        workbook
            .save(path)
            .map_err(|e| Error::output(format!("Failed to save {}: {e}", path.display())))?;
        Ok(records.len())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Xlsx
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Exporter for a format with default settings
pub fn exporter_for(format: OutputFormat) -> Box<dyn Exporter> {
    match format {
        OutputFormat::Csv => Box::new(CsvExporter),
        OutputFormat::Json => Box::new(JsonLinesExporter),
        OutputFormat::Parquet => Box::new(ParquetExporter::default()),
        OutputFormat::Xlsx => Box::new(XlsxExporter),
    }
}

/// `<dir>/bookmarks_<YYYYMMDD_HHMMSS>.<ext>`
pub fn output_path(dir: &Path, format: OutputFormat, generated_at: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "bookmarks_{}.{}",
        generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// Write `records` into a timestamped file under `dir`. Nothing is
/// written for an empty record set.
pub fn export_records(
    records: &[NormalizedRecord],
    dir: &Path,
    format: OutputFormat,
) -> Result<Option<PathBuf>> {
    if records.is_empty() {
        return Ok(None);
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = output_path(dir, format, Local::now());
    let rows = exporter_for(format).export(records, &path)?;
    info!("Wrote {rows} rows to {}", path.display());
    Ok(Some(path))
}
