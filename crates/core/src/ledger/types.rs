//! Ledger domain types for journal entry creation and validation.
//!
//! This module defines the core types used for creating and validating
//! journal entries in the double-entry bookkeeping system.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The side on which an account's balance naturally increases.
///
/// - `Debit`: assets, expenses. Balance = debit - credit.
/// - `Credit`: liabilities, equity, revenue. Balance = credit - debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NormalBalance {
    /// Debit-normal account.
    Debit,
    /// Credit-normal account.
    Credit,
}

impl NormalBalance {
    /// Signed balance of the given movement, seen from this normal side.
    #[must_use]
    pub fn balance_of(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }

    /// Database / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }
}

impl std::str::FromStr for NormalBalance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBIT" => Ok(Self::Debit),
            "CREDIT" => Ok(Self::Credit),
            other => Err(format!("unknown normal balance: {other}")),
        }
    }
}

/// Journal entry status.
///
/// `DRAFT -> POSTED -> REVERSED`. Nothing else is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JournalStatus {
    /// Being drafted, can be edited or deleted.
    Draft,
    /// Counts toward balances. Immutable.
    Posted,
    /// Cancelled by a reversing entry. Immutable.
    Reversed,
}

impl JournalStatus {
    /// Returns true if the entry can be modified.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the entry is immutable.
    #[must_use]
    pub const fn is_immutable(self) -> bool {
        matches!(self, Self::Posted | Self::Reversed)
    }

    /// Database / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Posted => "POSTED",
            Self::Reversed => "REVERSED",
        }
    }
}

impl std::fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JournalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "POSTED" => Ok(Self::Posted),
            "REVERSED" => Ok(Self::Reversed),
            other => Err(format!("unknown journal status: {other}")),
        }
    }
}

/// Input for a single journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// The account to post to.
    pub account_id: Uuid,
    /// Debit amount. Zero when the line is a credit.
    #[serde(default)]
    pub debit_amount: Decimal,
    /// Credit amount. Zero when the line is a debit.
    #[serde(default)]
    pub credit_amount: Decimal,
    /// Optional line description.
    #[serde(default)]
    pub description: Option<String>,
}

impl JournalLineInput {
    /// Debit line.
    #[must_use]
    pub fn debit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            debit_amount: amount,
            credit_amount: Decimal::ZERO,
            description: None,
        }
    }

    /// Credit line.
    #[must_use]
    pub fn credit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            debit_amount: Decimal::ZERO,
            credit_amount: amount,
            description: None,
        }
    }
}

/// Input for creating or replacing a draft journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntryInput {
    /// Journal number. Generated when absent.
    #[serde(default)]
    pub number: Option<String>,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Description.
    pub description: String,
    /// External reference (invoice number, ...).
    #[serde(default)]
    pub reference: Option<String>,
    /// The lines (at least two).
    pub lines: Vec<JournalLineInput>,
}

/// Debit and credit totals of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTotals {
    /// Sum of debit amounts.
    pub total_debit: Decimal,
    /// Sum of credit amounts.
    pub total_credit: Decimal,
}

impl JournalTotals {
    /// Sums a set of lines.
    #[must_use]
    pub fn of(lines: &[JournalLineInput]) -> Self {
        lines.iter().fold(
            Self {
                total_debit: Decimal::ZERO,
                total_credit: Decimal::ZERO,
            },
            |acc, line| Self {
                total_debit: acc.total_debit + line.debit_amount,
                total_credit: acc.total_credit + line.credit_amount,
            },
        )
    }

    /// Returns true when debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }

    /// Debit minus credit.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normal_balance_sign() {
        assert_eq!(
            NormalBalance::Credit.balance_of(dec!(20000), dec!(100000)),
            dec!(80000)
        );
        assert_eq!(
            NormalBalance::Debit.balance_of(dec!(20000), dec!(100000)),
            dec!(-80000)
        );
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("posted".parse::<JournalStatus>(), Ok(JournalStatus::Posted));
        assert_eq!("DRAFT".parse::<JournalStatus>(), Ok(JournalStatus::Draft));
        assert!("void".parse::<JournalStatus>().is_err());
    }

    #[test]
    fn test_status_editability() {
        assert!(JournalStatus::Draft.is_editable());
        assert!(!JournalStatus::Posted.is_editable());
        assert!(JournalStatus::Posted.is_immutable());
        assert!(JournalStatus::Reversed.is_immutable());
    }

    #[test]
    fn test_totals() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let totals = JournalTotals::of(&[
            JournalLineInput::debit(a, dec!(150.25)),
            JournalLineInput::credit(b, dec!(100)),
            JournalLineInput::credit(b, dec!(50.25)),
        ]);
        assert_eq!(totals.total_debit, dec!(150.25));
        assert_eq!(totals.total_credit, dec!(150.25));
        assert!(totals.is_balanced());
        assert_eq!(totals.difference(), Decimal::ZERO);
    }
}
