//! Common types used throughout the crate
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Flag
// ============================================================================

/// Two-valued flag as the exported sheet shows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Flag {
    Yes,
    #[default]
    No,
}

impl Flag {
    /// Display label
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Yes => "Yes",
            Flag::No => "No",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Flag::Yes)
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        if value {
            Flag::Yes
        } else {
            Flag::No
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Output Format
// ============================================================================

/// Format of the exported artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma separated values with a header row
    #[default]
    Csv,
    /// One JSON object per line
    Json,
    /// Parquet (Snappy)
    Parquet,
    /// Excel workbook with a styled, filterable header
    Xlsx,
}

impl OutputFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "jsonl",
            OutputFormat::Parquet => "parquet",
            OutputFormat::Xlsx => "xlsx",
        }
    }
}
