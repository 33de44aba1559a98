//! Report error types.

use bukubesar_shared::AppError;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    FiscalPeriodNotFound(Uuid),

    /// No range given and no period contains the reference date.
    #[error("No fiscal period contains {0}; pass startDate/endDate or periodId")]
    NoFiscalPeriod(NaiveDate),

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// The comparison range would start before the first representable date.
    #[error("No comparison range exists before {0}")]
    NoPrecedingRange(NaiveDate),

    /// Unknown `journalType` value.
    #[error("Invalid journal type '{0}'; expected all, commitment, breakdown, net or paired")]
    InvalidJournalType(String),

    /// Unknown or unsupported export format.
    #[error("Unsupported export format '{0}'; only csv is available")]
    UnsupportedExportFormat(String),

    /// Writing the export failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::FiscalPeriodNotFound(_) => "FISCAL_PERIOD_NOT_FOUND",
            Self::NoFiscalPeriod(_) => "NO_FISCAL_PERIOD",
            Self::InvalidDateRange { .. } | Self::NoPrecedingRange(_) => "INVALID_DATE_RANGE",
            Self::InvalidJournalType(_) => "INVALID_JOURNAL_TYPE",
            Self::UnsupportedExportFormat(_) => "UNSUPPORTED_EXPORT_FORMAT",
            Self::Export(_) => "EXPORT_FAILED",
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        let code = err.error_code();
        let message = err.to_string();
        match err {
            ReportError::AccountNotFound(_) | ReportError::FiscalPeriodNotFound(_) => {
                Self::NotFound { code, message }
            }
            ReportError::Export(detail) => Self::Internal(detail),
            _ => Self::Validation {
                code,
                message,
                values: None,
            },
        }
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}
