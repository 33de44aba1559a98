//! `SeaORM` active enums mapped to Postgres enum types.
//!
//! Each enum converts both ways to its core counterpart so repositories can
//! hand domain types to the rest of the workspace.

use bukubesar_core::ledger;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `normal_balance` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "normal_balance")]
#[serde(rename_all = "UPPERCASE")]
pub enum NormalBalance {
    /// Debit-normal.
    #[sea_orm(string_value = "DEBIT")]
    Debit,
    /// Credit-normal.
    #[sea_orm(string_value = "CREDIT")]
    Credit,
}

/// `journal_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_status")]
#[serde(rename_all = "UPPERCASE")]
pub enum JournalStatus {
    /// Editable draft.
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    /// Posted to the ledger.
    #[sea_orm(string_value = "POSTED")]
    Posted,
    /// Offset by a reversing entry.
    #[sea_orm(string_value = "REVERSED")]
    Reversed,
}

/// `account_category` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_category")]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    /// Current assets.
    #[sea_orm(string_value = "current_asset")]
    CurrentAsset,
    /// Fixed assets.
    #[sea_orm(string_value = "fixed_asset")]
    FixedAsset,
    /// Other assets.
    #[sea_orm(string_value = "other_asset")]
    OtherAsset,
    /// Current liabilities.
    #[sea_orm(string_value = "current_liability")]
    CurrentLiability,
    /// Long-term liabilities.
    #[sea_orm(string_value = "long_term_liability")]
    LongTermLiability,
    /// Equity.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Cost of revenue.
    #[sea_orm(string_value = "cost_of_revenue")]
    CostOfRevenue,
    /// Operating expenses.
    #[sea_orm(string_value = "operating_expense")]
    OperatingExpense,
    /// Other income.
    #[sea_orm(string_value = "other_income")]
    OtherIncome,
    /// Other expenses.
    #[sea_orm(string_value = "other_expense")]
    OtherExpense,
}

impl From<NormalBalance> for ledger::NormalBalance {
    fn from(value: NormalBalance) -> Self {
        match value {
            NormalBalance::Debit => Self::Debit,
            NormalBalance::Credit => Self::Credit,
        }
    }
}

impl From<ledger::NormalBalance> for NormalBalance {
    fn from(value: ledger::NormalBalance) -> Self {
        match value {
            ledger::NormalBalance::Debit => Self::Debit,
            ledger::NormalBalance::Credit => Self::Credit,
        }
    }
}

impl From<JournalStatus> for ledger::JournalStatus {
    fn from(value: JournalStatus) -> Self {
        match value {
            JournalStatus::Draft => Self::Draft,
            JournalStatus::Posted => Self::Posted,
            JournalStatus::Reversed => Self::Reversed,
        }
    }
}

impl From<ledger::JournalStatus> for JournalStatus {
    fn from(value: ledger::JournalStatus) -> Self {
        match value {
            ledger::JournalStatus::Draft => Self::Draft,
            ledger::JournalStatus::Posted => Self::Posted,
            ledger::JournalStatus::Reversed => Self::Reversed,
        }
    }
}

impl From<AccountCategory> for ledger::AccountCategory {
    fn from(value: AccountCategory) -> Self {
        match value {
            AccountCategory::CurrentAsset => Self::CurrentAsset,
            AccountCategory::FixedAsset => Self::FixedAsset,
            AccountCategory::OtherAsset => Self::OtherAsset,
            AccountCategory::CurrentLiability => Self::CurrentLiability,
            AccountCategory::LongTermLiability => Self::LongTermLiability,
            AccountCategory::Equity => Self::Equity,
            AccountCategory::Revenue => Self::Revenue,
            AccountCategory::CostOfRevenue => Self::CostOfRevenue,
            AccountCategory::OperatingExpense => Self::OperatingExpense,
            AccountCategory::OtherIncome => Self::OtherIncome,
            AccountCategory::OtherExpense => Self::OtherExpense,
        }
    }
}

impl From<ledger::AccountCategory> for AccountCategory {
    fn from(value: ledger::AccountCategory) -> Self {
        match value {
            ledger::AccountCategory::CurrentAsset => Self::CurrentAsset,
            ledger::AccountCategory::FixedAsset => Self::FixedAsset,
            ledger::AccountCategory::OtherAsset => Self::OtherAsset,
            ledger::AccountCategory::CurrentLiability => Self::CurrentLiability,
            ledger::AccountCategory::LongTermLiability => Self::LongTermLiability,
            ledger::AccountCategory::Equity => Self::Equity,
            ledger::AccountCategory::Revenue => Self::Revenue,
            ledger::AccountCategory::CostOfRevenue => Self::CostOfRevenue,
            ledger::AccountCategory::OperatingExpense => Self::OperatingExpense,
            ledger::AccountCategory::OtherIncome => Self::OtherIncome,
            ledger::AccountCategory::OtherExpense => Self::OtherExpense,
        }
    }
}
