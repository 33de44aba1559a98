//! Fiscal period errors.

use bukubesar_shared::AppError;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during fiscal period operations.
#[derive(Debug, Error)]
pub enum FiscalPeriodError {
    /// Start date is after end date.
    #[error("Start date {start} must be on or before end date {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Year/month pair does not name a month.
    #[error("Invalid month {year}-{month}")]
    InvalidMonth {
        /// Year.
        year: i32,
        /// Month (1-12 expected).
        month: u32,
    },

    /// Name is blank.
    #[error("Period name is required")]
    MissingName,

    /// Range intersects another period.
    #[error("Period overlaps with existing period '{0}'")]
    Overlap(String),

    /// Period not found.
    #[error("Fiscal period not found: {0}")]
    NotFound(Uuid),

    /// Draft entries still sit in the period.
    #[error("Cannot close period: {0} draft journal entries remain")]
    HasDraftEntries(u64),

    /// Journal entries reference the period.
    #[error("Cannot delete period: {0} journal entries reference it")]
    HasJournalEntries(u64),

    /// Period already closed.
    #[error("Fiscal period is already closed")]
    AlreadyClosed,

    /// The dates of a closed period cannot change.
    #[error("Cannot change the dates of a closed period")]
    ClosedPeriodDates,

    /// Entries of the period would fall outside its new range.
    #[error("Cannot move period: {0} journal entries would fall outside the new range")]
    EntriesOutsideRange(u64),

    /// Period is not closed.
    #[error("Fiscal period is not closed")]
    NotClosed,
}

impl FiscalPeriodError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::InvalidMonth { .. } => "INVALID_MONTH",
            Self::MissingName => "MISSING_NAME",
            Self::Overlap(_) => "PERIOD_OVERLAP",
            Self::NotFound(_) => "FISCAL_PERIOD_NOT_FOUND",
            Self::HasDraftEntries(_) => "PERIOD_HAS_DRAFTS",
            Self::HasJournalEntries(_) => "PERIOD_IN_USE",
            Self::AlreadyClosed => "PERIOD_ALREADY_CLOSED",
            Self::ClosedPeriodDates => "PERIOD_CLOSED",
            Self::EntriesOutsideRange(_) => "PERIOD_ENTRIES_OUTSIDE_RANGE",
            Self::NotClosed => "PERIOD_NOT_CLOSED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } | Self::InvalidMonth { .. } | Self::MissingName => 400,
            Self::NotFound(_) => 404,
            Self::Overlap(_)
            | Self::HasDraftEntries(_)
            | Self::HasJournalEntries(_)
            | Self::AlreadyClosed
            | Self::ClosedPeriodDates
            | Self::EntriesOutsideRange(_)
            | Self::NotClosed => 409,
        }
    }
}

impl From<FiscalPeriodError> for AppError {
    fn from(err: FiscalPeriodError) -> Self {
        let code = err.error_code();
        let message = err.to_string();
        match err.http_status_code() {
            404 => Self::NotFound { code, message },
            409 => Self::Conflict { code, message },
            _ => Self::Validation {
                code,
                message,
                values: None,
            },
        }
    }
}
