//! Ledger error types for validation and state errors.

use bukubesar_shared::AppError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::JournalStatus;

/// Errors that can occur during journal entry operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Journal entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// Debits do not equal credits.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Line amount cannot be negative.
    #[error("Line {line}: amount cannot be negative")]
    NegativeAmount {
        /// 1-based line number.
        line: usize,
    },

    /// Line must have exactly one positive side.
    #[error("Line {line}: exactly one of debit or credit must be positive")]
    InvalidLineSide {
        /// 1-based line number.
        line: usize,
    },

    /// Description is required.
    #[error("Description is required")]
    MissingDescription,

    /// Journal number is already used.
    #[error("Journal number {0} already exists")]
    DuplicateNumber(String),

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(String),

    /// Account is locked and cannot be used.
    #[error("Account {0} is locked")]
    AccountLocked(String),

    // ========== Fiscal Period Errors ==========
    /// No fiscal period found for the entry date.
    #[error("No fiscal period found for date {0}")]
    NoFiscalPeriod(NaiveDate),

    /// Fiscal period is closed.
    #[error("Fiscal period {0} is closed")]
    PeriodClosed(String),

    // ========== State Errors ==========
    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    JournalNotFound(Uuid),

    /// The requested transition is not allowed from the current status.
    #[error("Cannot {action} a {status} journal entry")]
    InvalidTransition {
        /// Attempted action.
        action: &'static str,
        /// Current status.
        status: JournalStatus,
    },

    // ========== Concurrency Errors ==========
    /// Another request changed the entry's status first.
    #[error("Journal entry was modified concurrently, please reload and retry")]
    ConcurrentModification,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::InvalidLineSide { .. } => "INVALID_LINE_SIDE",
            Self::MissingDescription => "MISSING_DESCRIPTION",
            Self::DuplicateNumber(_) => "DUPLICATE_NUMBER",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AccountLocked(_) => "ACCOUNT_LOCKED",
            Self::NoFiscalPeriod(_) => "NO_FISCAL_PERIOD",
            Self::PeriodClosed(_) => "PERIOD_CLOSED",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InsufficientLines
            | Self::UnbalancedEntry { .. }
            | Self::NegativeAmount { .. }
            | Self::InvalidLineSide { .. }
            | Self::MissingDescription
            | Self::AccountInactive(_)
            | Self::AccountLocked(_)
            | Self::NoFiscalPeriod(_)
            | Self::PeriodClosed(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::JournalNotFound(_) => 404,

            // 409 Conflict
            Self::DuplicateNumber(_)
            | Self::InvalidTransition { .. }
            | Self::ConcurrentModification => 409,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::InsufficientLines.error_code(), "INSUFFICIENT_LINES");
        assert_eq!(
            LedgerError::UnbalancedEntry {
                debit: Decimal::new(100, 2),
                credit: Decimal::new(50, 2),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(
            LedgerError::InvalidLineSide { line: 1 }.error_code(),
            "INVALID_LINE_SIDE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::InsufficientLines.http_status_code(), 400);
        assert_eq!(
            LedgerError::AccountNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(LedgerError::ConcurrentModification.http_status_code(), 409);
        assert_eq!(
            LedgerError::InvalidTransition {
                action: "post",
                status: JournalStatus::Posted,
            }
            .http_status_code(),
            409
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::ConcurrentModification.is_retryable());
        assert!(!LedgerError::InsufficientLines.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedEntry {
            debit: Decimal::new(10000, 2),
            credit: Decimal::new(5000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 100.00, Credit: 50.00"
        );

        let err = LedgerError::InvalidTransition {
            action: "reverse",
            status: JournalStatus::Draft,
        };
        assert_eq!(err.to_string(), "Cannot reverse a DRAFT journal entry");
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = LedgerError::JournalNotFound(Uuid::nil()).into();
        assert_eq!(app.status_code(), 404);
        assert_eq!(app.error_code(), "JOURNAL_NOT_FOUND");

        let app: AppError = LedgerError::ConcurrentModification.into();
        assert_eq!(app.status_code(), 409);

        let app: AppError = LedgerError::InsufficientLines.into();
        assert_eq!(app.status_code(), 400);
    }
}
