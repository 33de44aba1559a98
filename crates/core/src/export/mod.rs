//! Report export.
//!
//! CSV is rendered in-process. PDF and XLSX are recognised but refused.

pub mod csv;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::reports::ReportError;

/// Requested export format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// PDF document.
    Pdf,
    /// Excel workbook.
    Xlsx,
}

impl ExportFormat {
    /// File extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
        }
    }

    /// MIME type sent with the download.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Pdf => "application/pdf",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// Fails unless the format can be rendered here.
    ///
    /// # Errors
    ///
    /// `UnsupportedExportFormat` for PDF and XLSX.
    pub fn ensure_supported(self) -> Result<Self, ReportError> {
        match self {
            Self::Csv => Ok(self),
            other => Err(ReportError::UnsupportedExportFormat(
                other.extension().to_string(),
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(ReportError::UnsupportedExportFormat(other.to_string())),
        }
    }
}

/// A rendered export ready to download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    /// Suggested filename.
    pub filename: String,
    /// MIME type.
    pub content_type: &'static str,
    /// File contents.
    pub body: Vec<u8>,
}
