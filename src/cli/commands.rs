//! CLI arguments

use crate::types::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Export your saved bookmarks to a spreadsheet-friendly file
#[derive(Parser, Debug, Clone)]
#[command(name = "bookmark-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Browser cookie export (JSON)
    #[arg(long, default_value = "cookies.json")]
    pub cookies: PathBuf,

    /// Client configuration overrides (YAML or JSON)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Directory the export is written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: FormatArg,

    /// Stop after this many pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatArg {
    /// Comma separated values
    Csv,
    /// One JSON object per line
    Json,
    /// Parquet files
    Parquet,
    /// Excel workbook
    Xlsx,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Parquet => OutputFormat::Parquet,
            FormatArg::Xlsx => OutputFormat::Xlsx,
        }
    }
}
