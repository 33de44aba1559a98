//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::balance::{AccountRow, JournalTypeFilter};
use crate::fiscal::PeriodRange;
use crate::ledger::AccountCategory;

/// Header printed on every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportHeader {
    /// Report title.
    pub title: String,
    /// Company name.
    pub company_name: String,
    /// Currency label.
    pub currency: String,
    /// First day covered.
    pub start_date: NaiveDate,
    /// Last day covered (the as-of date for the balance sheet).
    pub end_date: NaiveDate,
    /// Journal-type filter applied.
    pub journal_type: JournalTypeFilter,
}

/// Presentation settings shared by report generators.
#[derive(Debug, Clone)]
pub struct ReportContext {
    /// Company name.
    pub company_name: String,
    /// Currency label.
    pub currency: String,
    /// Range being reported.
    pub range: PeriodRange,
    /// Journal-type filter.
    pub journal_type: JournalTypeFilter,
}

impl ReportContext {
    /// Builds the header for a report titled `title`.
    #[must_use]
    pub fn header(&self, title: &str) -> ReportHeader {
        ReportHeader {
            title: title.to_string(),
            company_name: self.company_name.clone(),
            currency: self.currency.clone(),
            start_date: self.range.start(),
            end_date: self.range.end(),
            journal_type: self.journal_type,
        }
    }
}

/// A reported amount with optional comparison columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    /// Amount for the reported range.
    pub amount: Decimal,
    /// Amount for the comparison range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Decimal>,
    /// `amount - previous`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,
    /// Share of total revenue, in percent (2 dp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_of_revenue: Option<Decimal>,
}

impl Figure {
    /// Figure without comparison.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self {
            amount,
            previous: None,
            change: None,
            percent_of_revenue: None,
        }
    }

    /// Figure compared with `previous`, when given.
    #[must_use]
    pub fn compared(amount: Decimal, previous: Option<Decimal>) -> Self {
        Self {
            amount,
            previous,
            change: previous.map(|p| amount - p),
            percent_of_revenue: None,
        }
    }
}

// ============================================================================
// Trial balance
// ============================================================================

/// Trial balance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account facts.
    #[serde(flatten)]
    pub account: AccountRow,
    /// Opening balance, signed from the normal side.
    pub opening: Decimal,
    /// Debit movement.
    pub debit: Decimal,
    /// Credit movement.
    pub credit: Decimal,
    /// Closing balance, signed from the normal side.
    pub closing: Decimal,
    /// Whether the closing balance sits on the debit side.
    pub is_debit: bool,
    /// Closing balance in the debit column.
    pub closing_debit: Decimal,
    /// Closing balance in the credit column.
    pub closing_credit: Decimal,
}

/// Trial balance totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Sum of debit movement.
    pub debit: Decimal,
    /// Sum of credit movement.
    pub credit: Decimal,
    /// Sum of the debit column.
    pub closing_debit: Decimal,
    /// Sum of the credit column.
    pub closing_credit: Decimal,
    /// Whether both columns agree.
    pub is_balanced: bool,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Header.
    pub header: ReportHeader,
    /// One row per account with a balance or activity.
    pub rows: Vec<TrialBalanceRow>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

// ============================================================================
// Profit & loss
// ============================================================================

/// One account on the profit & loss statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLine {
    /// Account ID.
    pub account_id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Tree depth.
    pub level: i32,
    /// Amount and comparison.
    #[serde(flatten)]
    pub figure: Figure,
}

/// A category section of a statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementSection {
    /// Category.
    pub category: AccountCategory,
    /// Heading.
    pub label: String,
    /// Account lines.
    pub lines: Vec<StatementLine>,
    /// Section total.
    pub total: Figure,
}

/// Profit & loss options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfitLossOptions {
    /// Add previous-range and change columns.
    pub compare_with_previous: bool,
    /// Add percent-of-revenue column.
    pub show_percentages: bool,
}

/// Profit & loss report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitLossReport {
    /// Header.
    pub header: ReportHeader,
    /// Comparison range, when requested.
    pub previous_range: Option<PeriodRange>,
    /// Revenue.
    pub revenue: StatementSection,
    /// Cost of revenue.
    pub cost_of_revenue: StatementSection,
    /// Revenue minus cost of revenue.
    pub gross_profit: Figure,
    /// Operating expenses.
    pub operating_expense: StatementSection,
    /// Gross profit minus operating expenses.
    pub operating_income: Figure,
    /// Other income.
    pub other_income: StatementSection,
    /// Other expenses.
    pub other_expense: StatementSection,
    /// Operating income plus other income minus other expenses.
    pub net_income: Figure,
}

// ============================================================================
// Balance sheet
// ============================================================================

/// Assets, liabilities or equity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetGroup {
    /// Heading.
    pub label: String,
    /// Category sections.
    pub sections: Vec<StatementSection>,
    /// Group total.
    pub total: Figure,
}

/// Balance sheet report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// Header. `end_date` is the as-of date.
    pub header: ReportHeader,
    /// Comparison as-of date, when requested.
    pub previous_as_of: Option<NaiveDate>,
    /// Assets.
    pub assets: BalanceSheetGroup,
    /// Liabilities.
    pub liabilities: BalanceSheetGroup,
    /// Equity, including current earnings.
    pub equity: BalanceSheetGroup,
    /// Cumulative net income not yet closed to equity.
    pub current_earnings: Figure,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Figure,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

// ============================================================================
// General ledger
// ============================================================================

/// One line of the general ledger detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlDetailLine {
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Journal entry ID.
    pub journal_entry_id: Uuid,
    /// Journal number.
    pub journal_number: String,
    /// Journal description.
    pub journal_description: String,
    /// Journal reference.
    pub reference: Option<String>,
    /// Line description.
    pub description: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Balance after this line, signed from the normal side.
    pub running_balance: Decimal,
}

/// General ledger detail for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlDetailAccount {
    /// Account facts.
    pub account: AccountRow,
    /// Balance before the range.
    pub opening: Decimal,
    /// Lines ordered by date, journal number and line number.
    pub lines: Vec<GlDetailLine>,
    /// Debit inside the range.
    pub total_debit: Decimal,
    /// Credit inside the range.
    pub total_credit: Decimal,
    /// Balance after the last line.
    pub closing: Decimal,
}

/// General ledger detail report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlDetailReport {
    /// Header.
    pub header: ReportHeader,
    /// Accounts with a balance or activity, or the requested account.
    pub accounts: Vec<GlDetailAccount>,
}

/// Account row of the general ledger summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlSummaryRow {
    /// Account facts.
    #[serde(flatten)]
    pub account: AccountRow,
    /// Opening balance.
    pub opening: Decimal,
    /// Debit movement.
    pub debit: Decimal,
    /// Credit movement.
    pub credit: Decimal,
    /// Closing balance.
    pub closing: Decimal,
}

/// Accounts of one account group with subtotals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlSummaryGroup {
    /// Group ID.
    pub group_id: Uuid,
    /// Group code.
    pub group_code: String,
    /// Group name.
    pub group_name: String,
    /// Category.
    pub category: AccountCategory,
    /// Accounts.
    pub accounts: Vec<GlSummaryRow>,
    /// Sum of opening balances.
    pub opening: Decimal,
    /// Sum of debit movement.
    pub debit: Decimal,
    /// Sum of credit movement.
    pub credit: Decimal,
    /// Sum of closing balances.
    pub closing: Decimal,
}

/// General ledger summary report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlSummaryReport {
    /// Header.
    pub header: ReportHeader,
    /// Groups in category then code order.
    pub groups: Vec<GlSummaryGroup>,
    /// Total debit movement.
    pub total_debit: Decimal,
    /// Total credit movement.
    pub total_credit: Decimal,
}

// ============================================================================
// Account balance (precomputed)
// ============================================================================

/// A stored `account_balances` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBalance {
    /// Account ID.
    pub account_id: Uuid,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Debit movement.
    pub debit_movement: Decimal,
    /// Credit movement.
    pub credit_movement: Decimal,
    /// Closing balance.
    pub closing_balance: Decimal,
}

/// Row of the account balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalanceRow {
    /// Account facts.
    #[serde(flatten)]
    pub account: AccountRow,
    /// Stored figures, `None` when the snapshot has no row.
    pub stored: Option<StoredBalance>,
    /// Closing balance from live aggregation.
    pub live_closing: Decimal,
    /// Whether stored and live closing agree.
    pub in_sync: bool,
}

/// Account balance report for one fiscal period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalanceReport {
    /// Header.
    pub header: ReportHeader,
    /// Period ID.
    pub fiscal_period_id: Uuid,
    /// Period name.
    pub fiscal_period_name: String,
    /// Rows for accounts with a stored or live balance.
    pub rows: Vec<AccountBalanceRow>,
    /// Number of rows out of sync.
    pub discrepancies: usize,
}

impl From<&crate::balance::PeriodBalance> for StoredBalance {
    fn from(b: &crate::balance::PeriodBalance) -> Self {
        Self {
            account_id: b.account.account_id,
            opening_balance: b.opening,
            debit_movement: b.debit,
            credit_movement: b.credit,
            closing_balance: b.closing,
        }
    }
}
