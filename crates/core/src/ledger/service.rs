//! Ledger service for journal entry validation.
//!
//! Pure business logic: callers preload accounts and fiscal periods and pass
//! lookups in, so the same rules run for create, update and post.

use chrono::NaiveDate;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{JournalEntryInput, JournalLineInput, JournalTotals};
use super::validation::{validate_description, validate_lines};

/// Account facts needed to accept a line.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// Account code, for messages.
    pub code: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account is locked.
    pub is_locked: bool,
}

/// Fiscal period facts needed to accept an entry date.
#[derive(Debug, Clone)]
pub struct PeriodInfo {
    /// The period ID.
    pub id: Uuid,
    /// Display name, for messages.
    pub name: String,
    /// Closed periods accept nothing.
    pub is_closed: bool,
}

/// A journal entry that passed every rule.
#[derive(Debug, Clone)]
pub struct ValidatedEntry {
    /// Trimmed description.
    pub description: String,
    /// Trimmed reference, `None` when blank.
    pub reference: Option<String>,
    /// Lines in submitted order.
    pub lines: Vec<JournalLineInput>,
    /// Line totals.
    pub totals: JournalTotals,
    /// Period containing the entry date.
    pub fiscal_period_id: Uuid,
}

/// Ledger service for journal entry validation.
pub struct LedgerService;

impl LedgerService {
    /// Validates a draft entry.
    ///
    /// 1. Description present
    /// 2. Line rules (count, sides, balance)
    /// 3. Every account exists, is active and not locked
    /// 4. Entry date falls in an open fiscal period
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` encountered.
    pub fn validate_entry<A, P>(
        input: &JournalEntryInput,
        account_lookup: A,
        period_lookup: P,
    ) -> Result<ValidatedEntry, LedgerError>
    where
        A: Fn(Uuid) -> Option<AccountInfo>,
        P: Fn(NaiveDate) -> Option<PeriodInfo>,
    {
        let description = validate_description(&input.description)?;
        let totals = validate_lines(&input.lines)?;

        for line in &input.lines {
            let account =
                account_lookup(line.account_id).ok_or(LedgerError::AccountNotFound(line.account_id))?;
            Self::ensure_account_postable(&account)?;
        }

        let period = Self::ensure_period_open(input.entry_date, period_lookup(input.entry_date))?;

        Ok(ValidatedEntry {
            description,
            reference: input
                .reference
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            lines: input.lines.clone(),
            totals,
            fiscal_period_id: period.id,
        })
    }

    /// Rejects inactive or locked accounts.
    ///
    /// # Errors
    ///
    /// `AccountInactive` or `AccountLocked`.
    pub fn ensure_account_postable(account: &AccountInfo) -> Result<(), LedgerError> {
        if !account.is_active {
            return Err(LedgerError::AccountInactive(account.code.clone()));
        }
        if account.is_locked {
            return Err(LedgerError::AccountLocked(account.code.clone()));
        }
        Ok(())
    }

    /// Requires a period for `date` and that it is open.
    ///
    /// # Errors
    ///
    /// `NoFiscalPeriod` or `PeriodClosed`.
    pub fn ensure_period_open(
        date: NaiveDate,
        period: Option<PeriodInfo>,
    ) -> Result<PeriodInfo, LedgerError> {
        let period = period.ok_or(LedgerError::NoFiscalPeriod(date))?;
        if period.is_closed {
            return Err(LedgerError::PeriodClosed(period.name));
        }
        Ok(period)
    }
}
