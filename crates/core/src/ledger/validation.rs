//! Business rule validation for journal lines.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{JournalLineInput, JournalTotals};

/// Validates a set of journal lines and returns their totals.
///
/// Rules, checked in order:
/// 1. at least two lines
/// 2. no negative amounts
/// 3. exactly one positive side per line
/// 4. total debit equals total credit
///
/// # Errors
///
/// Returns the first rule violated.
pub fn validate_lines(lines: &[JournalLineInput]) -> Result<JournalTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    for (index, line) in lines.iter().enumerate() {
        validate_line(index + 1, line)?;
    }

    let totals = JournalTotals::of(lines);
    if !totals.is_balanced() {
        return Err(LedgerError::UnbalancedEntry {
            debit: totals.total_debit,
            credit: totals.total_credit,
        });
    }

    Ok(totals)
}

/// Validates a single line. `line` is the 1-based position used in messages.
///
/// # Errors
///
/// `NegativeAmount` or `InvalidLineSide`.
pub fn validate_line(line: usize, input: &JournalLineInput) -> Result<(), LedgerError> {
    if input.debit_amount < Decimal::ZERO || input.credit_amount < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount { line });
    }

    let debit_side = input.debit_amount > Decimal::ZERO;
    let credit_side = input.credit_amount > Decimal::ZERO;
    if debit_side == credit_side {
        return Err(LedgerError::InvalidLineSide { line });
    }

    Ok(())
}

/// Trims the description and rejects blanks.
///
/// # Errors
///
/// `MissingDescription` when empty after trimming.
pub fn validate_description(description: &str) -> Result<String, LedgerError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::MissingDescription);
    }
    Ok(trimmed.to_string())
}
