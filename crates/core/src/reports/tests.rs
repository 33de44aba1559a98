//! Report generator tests.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::service::{ReportService, percent_of};
use super::types::{ProfitLossOptions, ReportContext, StoredBalance};
use crate::balance::{AccountRow, BalanceAggregator, JournalTypeFilter, PostedLine};
use crate::fiscal::{FiscalPeriod, PeriodRange};
use crate::ledger::{AccountCategory, NormalBalance};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn account(code: &str, category: AccountCategory) -> AccountRow {
    AccountRow {
        account_id: Uuid::new_v4(),
        code: code.to_string(),
        name: format!("Account {code}"),
        account_type: category.as_str().to_uppercase(),
        group_id: group_id(category),
        group_code: category.as_str().to_string(),
        group_name: category.label().to_string(),
        category,
        level: 1,
        normal_balance: category.default_normal_balance(),
    }
}

fn group_id(category: AccountCategory) -> Uuid {
    let index = AccountCategory::ALL
        .iter()
        .position(|c| *c == category)
        .unwrap();
    Uuid::from_u128(index as u128 + 1)
}

fn ctx(start: NaiveDate, end: NaiveDate) -> ReportContext {
    ReportContext {
        company_name: "Test Co".into(),
        currency: "IDR".into(),
        range: PeriodRange::new(start, end).unwrap(),
        journal_type: JournalTypeFilter::All,
    }
}

/// Builds a two-line balanced entry.
fn entry(
    number: &str,
    date: NaiveDate,
    debit: &AccountRow,
    credit: &AccountRow,
    amount: Decimal,
) -> Vec<PostedLine> {
    let id = Uuid::new_v4();
    let line = |n: i32, acc: &AccountRow, dr: Decimal, cr: Decimal| PostedLine {
        journal_entry_id: id,
        journal_number: number.to_string(),
        entry_date: date,
        journal_description: format!("Entry {number}"),
        reference: None,
        line_number: n,
        description: None,
        account_id: acc.account_id,
        debit: dr,
        credit: cr,
    };
    vec![
        line(1, debit, amount, Decimal::ZERO),
        line(2, credit, Decimal::ZERO, amount),
    ]
}

struct Ledger {
    cash: AccountRow,
    equipment: AccountRow,
    depreciation: AccountRow,
    payable: AccountRow,
    capital: AccountRow,
    sales: AccountRow,
    cogs: AccountRow,
    rent: AccountRow,
    lines: Vec<PostedLine>,
}

impl Ledger {
    fn accounts(&self) -> Vec<AccountRow> {
        vec![
            self.cash.clone(),
            self.equipment.clone(),
            self.depreciation.clone(),
            self.payable.clone(),
            self.capital.clone(),
            self.sales.clone(),
            self.cogs.clone(),
            self.rent.clone(),
        ]
    }
}

fn sample_ledger() -> Ledger {
    let cash = account("1101", AccountCategory::CurrentAsset);
    let equipment = account("1201", AccountCategory::FixedAsset);
    let mut depreciation = account("1209", AccountCategory::FixedAsset);
    depreciation.normal_balance = NormalBalance::Credit;
    let payable = account("2101", AccountCategory::CurrentLiability);
    let capital = account("3101", AccountCategory::Equity);
    let sales = account("4101", AccountCategory::Revenue);
    let cogs = account("5101", AccountCategory::CostOfRevenue);
    let rent = account("6101", AccountCategory::OperatingExpense);

    let mut lines = Vec::new();
    lines.extend(entry("JU/202312/0001", d(2023, 12, 1), &cash, &capital, dec!(10000)));
    lines.extend(entry("JU/202401/0001", d(2024, 1, 3), &equipment, &payable, dec!(3000)));
    lines.extend(entry("JU/202401/0002", d(2024, 1, 10), &cash, &sales, dec!(5000)));
    lines.extend(entry("JU/202401/0003", d(2024, 1, 11), &cogs, &cash, dec!(2000)));
    lines.extend(entry("JU/202401/0004", d(2024, 1, 20), &rent, &cash, dec!(500)));
    lines.extend(entry("JU/202401/0005", d(2024, 1, 31), &rent, &depreciation, dec!(250)));

    Ledger {
        cash,
        equipment,
        depreciation,
        payable,
        capital,
        sales,
        cogs,
        rent,
        lines,
    }
}

#[test]
fn test_trial_balance_skips_empty_and_balances() {
    let ledger = sample_ledger();
    let range = PeriodRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
    let balances = BalanceAggregator::period_balances(
        &ledger.accounts(),
        &ledger.lines,
        &range,
        JournalTypeFilter::All,
    );

    let report = ReportService::trial_balance(&ctx(range.start(), range.end()), balances);

    assert_eq!(report.rows.len(), 8);
    assert!(report.totals.is_balanced);
    assert_eq!(report.totals.debit, report.totals.credit);
    assert_eq!(report.totals.debit, dec!(10750));

    let cash = report
        .rows
        .iter()
        .find(|r| r.account.account_id == ledger.cash.account_id)
        .unwrap();
    assert_eq!(cash.opening, dec!(10000));
    assert_eq!(cash.closing, dec!(12500));
    assert_eq!(cash.closing_debit, dec!(12500));
    assert!(cash.is_debit);

    let codes: Vec<&str> = report.rows.iter().map(|r| r.account.code.as_str()).collect();
    let mut sorted = codes.clone();
    sorted.sort_unstable();
    assert_eq!(codes, sorted);
}

#[test]
fn test_profit_loss_sections() {
    let ledger = sample_ledger();
    let range = PeriodRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
    let balances = BalanceAggregator::period_balances(
        &ledger.accounts(),
        &ledger.lines,
        &range,
        JournalTypeFilter::All,
    );

    let report = ReportService::profit_loss(
        &ctx(range.start(), range.end()),
        &balances,
        None,
        ProfitLossOptions {
            compare_with_previous: false,
            show_percentages: true,
        },
    );

    assert_eq!(report.revenue.total.amount, dec!(5000));
    assert_eq!(report.cost_of_revenue.total.amount, dec!(2000));
    assert_eq!(report.gross_profit.amount, dec!(3000));
    assert_eq!(report.operating_expense.total.amount, dec!(750));
    assert_eq!(report.operating_income.amount, dec!(2250));
    assert_eq!(report.net_income.amount, dec!(2250));
    assert_eq!(report.net_income.percent_of_revenue, Some(dec!(45)));
    assert_eq!(report.gross_profit.percent_of_revenue, Some(dec!(60)));
    assert!(report.other_income.lines.is_empty());
    assert!(report.previous_range.is_none());
    assert!(report.net_income.previous.is_none());
    assert_eq!(report.revenue.lines[0].account_id, ledger.sales.account_id);
}

#[test]
fn test_profit_loss_comparison() {
    let ledger = sample_ledger();
    let range = PeriodRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
    let previous_range = range.preceding().unwrap();
    let accounts = ledger.accounts();
    let current =
        BalanceAggregator::period_balances(&accounts, &ledger.lines, &range, JournalTypeFilter::All);
    let previous = BalanceAggregator::period_balances(
        &accounts,
        &ledger.lines,
        &previous_range,
        JournalTypeFilter::All,
    );

    let report = ReportService::profit_loss(
        &ctx(range.start(), range.end()),
        &current,
        Some((previous_range, previous.as_slice())),
        ProfitLossOptions {
            compare_with_previous: true,
            show_percentages: false,
        },
    );

    assert_eq!(report.previous_range, Some(previous_range));
    assert_eq!(report.revenue.total.previous, Some(Decimal::ZERO));
    assert_eq!(report.revenue.total.change, Some(dec!(5000)));
    assert_eq!(report.net_income.previous, Some(Decimal::ZERO));
    assert!(report.net_income.percent_of_revenue.is_none());
}

#[test]
fn test_balance_sheet_contra_and_current_earnings() {
    let ledger = sample_ledger();
    let cumulative = BalanceAggregator::aggregate(
        &ledger.accounts(),
        &ledger.lines,
        JournalTypeFilter::All,
    );

    let report = ReportService::balance_sheet(&ctx(d(2024, 1, 1), d(2024, 1, 31)), &cumulative, None);

    let fixed = &report.assets.sections[1];
    assert_eq!(fixed.category, AccountCategory::FixedAsset);
    assert_eq!(fixed.total.amount, dec!(2750));
    let contra = fixed
        .lines
        .iter()
        .find(|l| l.account_id == ledger.depreciation.account_id)
        .unwrap();
    assert_eq!(contra.figure.amount, dec!(-250));

    assert_eq!(report.current_earnings.amount, dec!(2250));
    assert_eq!(report.liabilities.total.amount, dec!(3000));
    assert_eq!(report.equity.total.amount, dec!(12250));
    assert_eq!(report.assets.total.amount, dec!(15250));
    assert!(report.is_balanced);
    assert_eq!(report.header.end_date, d(2024, 1, 31));
}

#[test]
fn test_gl_detail_running_balance() {
    let ledger = sample_ledger();
    let report = ReportService::gl_detail(
        &ctx(d(2024, 1, 1), d(2024, 1, 31)),
        &ledger.accounts(),
        &ledger.lines,
        Some(ledger.cash.account_id),
    )
    .unwrap();

    assert_eq!(report.accounts.len(), 1);
    let cash = &report.accounts[0];
    assert_eq!(cash.opening, dec!(10000));
    let running: Vec<Decimal> = cash.lines.iter().map(|l| l.running_balance).collect();
    assert_eq!(running, vec![dec!(15000), dec!(13000), dec!(12500)]);
    assert_eq!(cash.total_debit, dec!(5000));
    assert_eq!(cash.total_credit, dec!(2500));
    assert_eq!(cash.closing, dec!(12500));
}

#[test]
fn test_gl_detail_unknown_account() {
    let ledger = sample_ledger();
    let missing = Uuid::new_v4();
    let result = ReportService::gl_detail(
        &ctx(d(2024, 1, 1), d(2024, 1, 31)),
        &ledger.accounts(),
        &ledger.lines,
        Some(missing),
    );
    assert!(matches!(result, Err(super::ReportError::AccountNotFound(id)) if id == missing));
}

#[test]
fn test_gl_detail_requested_idle_account() {
    let ledger = sample_ledger();
    let mut accounts = ledger.accounts();
    let idle = account("1999", AccountCategory::OtherAsset);
    let idle_id = idle.account_id;
    accounts.push(idle);

    let report = ReportService::gl_detail(
        &ctx(d(2024, 1, 1), d(2024, 1, 31)),
        &accounts,
        &ledger.lines,
        Some(idle_id),
    )
    .unwrap();

    assert_eq!(report.accounts.len(), 1);
    assert!(report.accounts[0].lines.is_empty());
    assert_eq!(report.accounts[0].closing, Decimal::ZERO);
}

#[test]
fn test_gl_detail_all_accounts_skips_idle() {
    let ledger = sample_ledger();
    let mut accounts = ledger.accounts();
    accounts.push(account("1999", AccountCategory::OtherAsset));

    let report = ReportService::gl_detail(
        &ctx(d(2024, 1, 1), d(2024, 1, 31)),
        &accounts,
        &ledger.lines,
        None,
    )
    .unwrap();

    assert!(report.accounts.iter().all(|a| a.account.code != "1999"));
    assert!(report.accounts.iter().any(|a| a.account.code == "3101"));
}

#[test]
fn test_gl_summary_groups() {
    let ledger = sample_ledger();
    let range = PeriodRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
    let balances = BalanceAggregator::period_balances(
        &ledger.accounts(),
        &ledger.lines,
        &range,
        JournalTypeFilter::All,
    );

    let report = ReportService::gl_summary(&ctx(range.start(), range.end()), balances);

    assert_eq!(report.total_debit, report.total_credit);
    let categories: Vec<AccountCategory> = report.groups.iter().map(|g| g.category).collect();
    let mut sorted = categories.clone();
    sorted.sort();
    assert_eq!(categories, sorted);

    let fixed = report
        .groups
        .iter()
        .find(|g| g.category == AccountCategory::FixedAsset)
        .unwrap();
    assert_eq!(fixed.accounts.len(), 2);
    assert_eq!(fixed.debit, dec!(3000));
    assert_eq!(fixed.credit, dec!(250));
}

#[test]
fn test_account_balance_reconciliation() {
    let ledger = sample_ledger();
    let period = FiscalPeriod {
        id: Uuid::new_v4(),
        name: "January 2024".into(),
        start_date: d(2024, 1, 1),
        end_date: d(2024, 1, 31),
        is_closed: false,
    };
    let range = PeriodRange::new(period.start_date, period.end_date).unwrap();
    let live = BalanceAggregator::period_balances(
        &ledger.accounts(),
        &ledger.lines,
        &range,
        JournalTypeFilter::All,
    );

    let mut stored: Vec<StoredBalance> = live
        .iter()
        .filter(|b| !b.is_empty())
        .map(StoredBalance::from)
        .collect();
    let stale = stored
        .iter_mut()
        .find(|s| s.account_id == ledger.rent.account_id)
        .unwrap();
    stale.closing_balance = dec!(500);

    let report =
        ReportService::account_balance(&ctx(range.start(), range.end()), &period, stored, live);

    assert_eq!(report.fiscal_period_name, "January 2024");
    assert_eq!(report.discrepancies, 1);
    let rent = report
        .rows
        .iter()
        .find(|r| r.account.account_id == ledger.rent.account_id)
        .unwrap();
    assert!(!rent.in_sync);
    assert_eq!(rent.live_closing, dec!(750));
}

#[test]
fn test_percent_of_zero_revenue() {
    assert_eq!(percent_of(dec!(100), Decimal::ZERO), None);
    assert_eq!(percent_of(dec!(1), dec!(3)), Some(dec!(33.33)));
}

fn category_strategy() -> impl Strategy<Value = AccountCategory> {
    prop::sample::select(AccountCategory::ALL.to_vec())
}

proptest! {
    /// With balanced entries the trial balance debit and credit columns agree.
    #[test]
    fn prop_trial_balance_balanced(
        categories in prop::collection::vec(category_strategy(), 2..8),
        entries in prop::collection::vec((0usize..8, 0usize..8, 1i64..1_000_000, 1u32..28), 1..30),
    ) {
        let accounts: Vec<AccountRow> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| account(&format!("{}", 1000 + i), *c))
            .collect();
        let mut lines = Vec::new();
        for (n, (dr, cr, cents, day)) in entries.iter().enumerate() {
            let dr = &accounts[dr % accounts.len()];
            let cr = &accounts[cr % accounts.len()];
            lines.extend(entry(&format!("JU/202401/{n:04}"), d(2024, 1, *day), dr, cr, Decimal::new(*cents, 2)));
        }
        let range = PeriodRange::new(d(2024, 1, 10), d(2024, 1, 20)).unwrap();
        let balances = BalanceAggregator::period_balances(&accounts, &lines, &range, JournalTypeFilter::All);

        let report = ReportService::trial_balance(&ctx(range.start(), range.end()), balances);

        prop_assert!(report.totals.is_balanced);
        prop_assert_eq!(report.totals.debit, report.totals.credit);
    }

    /// Assets equal liabilities plus equity once current earnings are included.
    #[test]
    fn prop_balance_sheet_balances(
        categories in prop::collection::vec(category_strategy(), 2..8),
        entries in prop::collection::vec((0usize..8, 0usize..8, 1i64..1_000_000), 1..30),
    ) {
        let accounts: Vec<AccountRow> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| account(&format!("{}", 1000 + i), *c))
            .collect();
        let mut lines = Vec::new();
        for (n, (dr, cr, cents)) in entries.iter().enumerate() {
            let dr = &accounts[dr % accounts.len()];
            let cr = &accounts[cr % accounts.len()];
            lines.extend(entry(&format!("JU/202401/{n:04}"), d(2024, 1, 15), dr, cr, Decimal::new(*cents, 2)));
        }
        let cumulative = BalanceAggregator::aggregate(&accounts, &lines, JournalTypeFilter::All);

        let report = ReportService::balance_sheet(&ctx(d(2024, 1, 1), d(2024, 1, 31)), &cumulative, None);

        prop_assert!(report.is_balanced);
        prop_assert_eq!(report.assets.total.amount, report.liabilities_and_equity.amount);
    }
}
