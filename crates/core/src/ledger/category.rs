//! Stable report category of an account group.
//!
//! Reports bucket accounts by this code, never by the group's display name.
//! Every category belongs to exactly one statement.

use serde::{Deserialize, Serialize};

use super::types::NormalBalance;

/// Report category assigned to an account group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    /// Cash, receivables, inventory.
    CurrentAsset,
    /// Property, plant, equipment.
    FixedAsset,
    /// Any other asset.
    OtherAsset,
    /// Payables due within a year.
    CurrentLiability,
    /// Loans and other long-term obligations.
    LongTermLiability,
    /// Capital and retained earnings.
    Equity,
    /// Operating revenue.
    Revenue,
    /// Cost of goods sold.
    CostOfRevenue,
    /// Operating expenses.
    OperatingExpense,
    /// Non-operating income.
    OtherIncome,
    /// Non-operating expense.
    OtherExpense,
}

/// The statement a category reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// Balance sheet (cumulative).
    BalanceSheet,
    /// Profit and loss (per range).
    ProfitLoss,
}

impl AccountCategory {
    /// All categories, in report order.
    pub const ALL: [Self; 11] = [
        Self::CurrentAsset,
        Self::FixedAsset,
        Self::OtherAsset,
        Self::CurrentLiability,
        Self::LongTermLiability,
        Self::Equity,
        Self::Revenue,
        Self::CostOfRevenue,
        Self::OperatingExpense,
        Self::OtherIncome,
        Self::OtherExpense,
    ];

    /// The statement this category appears on.
    #[must_use]
    pub const fn statement(self) -> Statement {
        match self {
            Self::CurrentAsset
            | Self::FixedAsset
            | Self::OtherAsset
            | Self::CurrentLiability
            | Self::LongTermLiability
            | Self::Equity => Statement::BalanceSheet,
            Self::Revenue
            | Self::CostOfRevenue
            | Self::OperatingExpense
            | Self::OtherIncome
            | Self::OtherExpense => Statement::ProfitLoss,
        }
    }

    /// Conventional normal side, used when a group does not override it.
    #[must_use]
    pub const fn default_normal_balance(self) -> NormalBalance {
        match self {
            Self::CurrentAsset
            | Self::FixedAsset
            | Self::OtherAsset
            | Self::CostOfRevenue
            | Self::OperatingExpense
            | Self::OtherExpense => NormalBalance::Debit,
            Self::CurrentLiability
            | Self::LongTermLiability
            | Self::Equity
            | Self::Revenue
            | Self::OtherIncome => NormalBalance::Credit,
        }
    }

    /// Snake-case code as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentAsset => "current_asset",
            Self::FixedAsset => "fixed_asset",
            Self::OtherAsset => "other_asset",
            Self::CurrentLiability => "current_liability",
            Self::LongTermLiability => "long_term_liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::CostOfRevenue => "cost_of_revenue",
            Self::OperatingExpense => "operating_expense",
            Self::OtherIncome => "other_income",
            Self::OtherExpense => "other_expense",
        }
    }

    /// Section heading used in reports and exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CurrentAsset => "Current Assets",
            Self::FixedAsset => "Fixed Assets",
            Self::OtherAsset => "Other Assets",
            Self::CurrentLiability => "Current Liabilities",
            Self::LongTermLiability => "Long-term Liabilities",
            Self::Equity => "Equity",
            Self::Revenue => "Revenue",
            Self::CostOfRevenue => "Cost of Revenue",
            Self::OperatingExpense => "Operating Expenses",
            Self::OtherIncome => "Other Income",
            Self::OtherExpense => "Other Expenses",
        }
    }
}

impl std::fmt::Display for AccountCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown account category: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_round_trips_through_its_code() {
        for category in AccountCategory::ALL {
            assert_eq!(category.as_str().parse::<AccountCategory>(), Ok(category));
        }
    }

    #[test]
    fn test_statements_partition_categories() {
        let balance_sheet = AccountCategory::ALL
            .iter()
            .filter(|c| c.statement() == Statement::BalanceSheet)
            .count();
        let profit_loss = AccountCategory::ALL
            .iter()
            .filter(|c| c.statement() == Statement::ProfitLoss)
            .count();
        assert_eq!(balance_sheet, 6);
        assert_eq!(profit_loss, 5);
    }

    #[test]
    fn test_revenue_is_credit_normal() {
        assert_eq!(
            AccountCategory::Revenue.default_normal_balance(),
            NormalBalance::Credit
        );
        assert_eq!(
            AccountCategory::OperatingExpense.default_normal_balance(),
            NormalBalance::Debit
        );
    }
}
