//! Report generation service.
//!
//! Every generator takes rows from the balance aggregator and buckets them
//! by the account group's category. Statement amounts are signed by the
//! category's side, so contra accounts (accumulated depreciation under fixed
//! assets, for instance) reduce their section instead of inflating it.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::ReportError;
use super::types::{
    AccountBalanceReport, AccountBalanceRow, BalanceSheetGroup, BalanceSheetReport, Figure,
    GlDetailAccount, GlDetailLine, GlDetailReport, GlSummaryGroup, GlSummaryReport, GlSummaryRow,
    ProfitLossOptions, ProfitLossReport, ReportContext, StatementLine, StatementSection,
    StoredBalance, TrialBalanceReport, TrialBalanceRow, TrialBalanceTotals,
};
use crate::balance::{AccountRow, AggregatedBalance, BalanceAggregator, PeriodBalance, PostedLine};
use crate::fiscal::{FiscalPeriod, PeriodRange};
use crate::ledger::AccountCategory;

/// Amount of an account as shown on a statement section.
#[must_use]
pub fn statement_amount(category: AccountCategory, debit: Decimal, credit: Decimal) -> Decimal {
    category.default_normal_balance().balance_of(debit, credit)
}

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Trial balance: opening, movement and closing per account.
    ///
    /// Accounts without balance or activity are left out. The report is
    /// balanced when the debit and credit columns of the closing balance agree.
    #[must_use]
    pub fn trial_balance(ctx: &ReportContext, balances: Vec<PeriodBalance>) -> TrialBalanceReport {
        let mut rows: Vec<TrialBalanceRow> = balances
            .into_iter()
            .filter(|b| !b.is_empty())
            .map(|b| TrialBalanceRow {
                closing_debit: b.closing_debit(),
                closing_credit: b.closing_credit(),
                account: b.account,
                opening: b.opening,
                debit: b.debit,
                credit: b.credit,
                closing: b.closing,
                is_debit: b.is_debit,
            })
            .collect();
        rows.sort_by(|a, b| a.account.code.cmp(&b.account.code));

        let mut totals = rows.iter().fold(TrialBalanceTotals::default(), |mut t, r| {
            t.debit += r.debit;
            t.credit += r.credit;
            t.closing_debit += r.closing_debit;
            t.closing_credit += r.closing_credit;
            t
        });
        totals.is_balanced = totals.closing_debit == totals.closing_credit;

        TrialBalanceReport {
            header: ctx.header("Trial Balance"),
            rows,
            totals,
        }
    }

    /// Profit & loss for the range, optionally compared with the preceding
    /// range of equal length.
    #[must_use]
    pub fn profit_loss(
        ctx: &ReportContext,
        current: &[PeriodBalance],
        previous: Option<(PeriodRange, &[PeriodBalance])>,
        options: ProfitLossOptions,
    ) -> ProfitLossReport {
        let current_amounts = movement_amounts(current);
        let previous_amounts = previous
            .filter(|_| options.compare_with_previous)
            .map(|(_, rows)| movement_amounts(rows));
        let accounts: Vec<&AccountRow> = current.iter().map(|b| &b.account).collect();

        let section = |category| {
            build_section(category, &accounts, &current_amounts, previous_amounts.as_ref())
        };
        let mut revenue = section(AccountCategory::Revenue);
        let mut cost_of_revenue = section(AccountCategory::CostOfRevenue);
        let mut operating_expense = section(AccountCategory::OperatingExpense);
        let mut other_income = section(AccountCategory::OtherIncome);
        let mut other_expense = section(AccountCategory::OtherExpense);

        let mut gross_profit = subtract(revenue.total, cost_of_revenue.total);
        let mut operating_income = subtract(gross_profit, operating_expense.total);
        let mut net_income = subtract(add(operating_income, other_income.total), other_expense.total);

        if options.show_percentages {
            let base = revenue.total.amount;
            for s in [
                &mut revenue,
                &mut cost_of_revenue,
                &mut operating_expense,
                &mut other_income,
                &mut other_expense,
            ] {
                apply_percentages(s, base);
            }
            for f in [&mut gross_profit, &mut operating_income, &mut net_income] {
                f.percent_of_revenue = percent_of(f.amount, base);
            }
        }

        ProfitLossReport {
            header: ctx.header("Profit and Loss"),
            previous_range: previous
                .filter(|_| options.compare_with_previous)
                .map(|(range, _)| range),
            revenue,
            cost_of_revenue,
            gross_profit,
            operating_expense,
            operating_income,
            other_income,
            other_expense,
            net_income,
        }
    }

    /// Balance sheet as of the range end.
    ///
    /// `current` and `previous` are cumulative balances (every line up to the
    /// as-of date). Profit & loss accounts roll into a current earnings line
    /// under equity.
    #[must_use]
    pub fn balance_sheet(
        ctx: &ReportContext,
        current: &[AggregatedBalance],
        previous: Option<(NaiveDate, &[AggregatedBalance])>,
    ) -> BalanceSheetReport {
        let current_amounts = cumulative_amounts(current);
        let previous_amounts = previous.map(|(_, rows)| cumulative_amounts(rows));
        let accounts: Vec<&AccountRow> = current.iter().map(|b| &b.account).collect();

        let group = |label: &str, categories: &[AccountCategory]| {
            let sections: Vec<StatementSection> = categories
                .iter()
                .map(|c| build_section(*c, &accounts, &current_amounts, previous_amounts.as_ref()))
                .collect();
            let total = sections
                .iter()
                .fold(zero_like(previous_amounts.is_some()), |acc, s| add(acc, s.total));
            BalanceSheetGroup {
                label: label.to_string(),
                sections,
                total,
            }
        };

        let assets = group(
            "Assets",
            &[
                AccountCategory::CurrentAsset,
                AccountCategory::FixedAsset,
                AccountCategory::OtherAsset,
            ],
        );
        let liabilities = group(
            "Liabilities",
            &[
                AccountCategory::CurrentLiability,
                AccountCategory::LongTermLiability,
            ],
        );
        let mut equity = group("Equity", &[AccountCategory::Equity]);

        let previous_earnings = previous.zip(previous_amounts.as_ref()).map(|((_, rows), amounts)| {
            let prev_accounts: Vec<&AccountRow> = rows.iter().map(|b| &b.account).collect();
            earnings(&prev_accounts, amounts)
        });
        let current_earnings =
            Figure::compared(earnings(&accounts, &current_amounts), previous_earnings);
        equity.total = add(equity.total, current_earnings);

        let liabilities_and_equity = add(liabilities.total, equity.total);
        let is_balanced = assets.total.amount == liabilities_and_equity.amount;

        BalanceSheetReport {
            header: ctx.header("Balance Sheet"),
            previous_as_of: previous.map(|(d, _)| d),
            assets,
            liabilities,
            equity,
            current_earnings,
            liabilities_and_equity,
            is_balanced,
        }
    }

    /// General ledger detail with running balances.
    ///
    /// `lines` may include lines before the range (they form the opening
    /// balance); lines after the range end are ignored.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` when `account_id` is not among `accounts`.
    pub fn gl_detail(
        ctx: &ReportContext,
        accounts: &[AccountRow],
        lines: &[PostedLine],
        account_id: Option<Uuid>,
    ) -> Result<GlDetailReport, ReportError> {
        let selected: Vec<&AccountRow> = match account_id {
            Some(id) => vec![
                accounts
                    .iter()
                    .find(|a| a.account_id == id)
                    .ok_or(ReportError::AccountNotFound(id))?,
            ],
            None => accounts.iter().collect(),
        };

        let range = ctx.range;
        let relevant: Vec<PostedLine> = lines
            .iter()
            .filter(|l| l.entry_date <= range.end())
            .cloned()
            .collect();
        let kept = BalanceAggregator::filter_lines(&relevant, ctx.journal_type);

        let opening = BalanceAggregator::movements(
            kept.iter().copied().filter(|l| l.entry_date < range.start()),
        );
        let mut in_range: HashMap<Uuid, Vec<&PostedLine>> = HashMap::new();
        for line in kept.iter().copied().filter(|l| range.contains(l.entry_date)) {
            in_range.entry(line.account_id).or_default().push(line);
        }

        let mut out = Vec::new();
        for account in selected {
            let normal = account.normal_balance;
            let opening_balance = opening
                .get(&account.account_id)
                .map_or(Decimal::ZERO, |m| m.balance(normal));
            let mut account_lines = in_range.remove(&account.account_id).unwrap_or_default();

            if account_id.is_none() && account_lines.is_empty() && opening_balance.is_zero() {
                continue;
            }

            account_lines.sort_by(|a, b| {
                (a.entry_date, &a.journal_number, a.line_number)
                    .cmp(&(b.entry_date, &b.journal_number, b.line_number))
            });

            let mut running = opening_balance;
            let mut total_debit = Decimal::ZERO;
            let mut total_credit = Decimal::ZERO;
            let detail: Vec<GlDetailLine> = account_lines
                .into_iter()
                .map(|l| {
                    running += normal.balance_of(l.debit, l.credit);
                    total_debit += l.debit;
                    total_credit += l.credit;
                    GlDetailLine {
                        entry_date: l.entry_date,
                        journal_entry_id: l.journal_entry_id,
                        journal_number: l.journal_number.clone(),
                        journal_description: l.journal_description.clone(),
                        reference: l.reference.clone(),
                        description: l.description.clone(),
                        debit: l.debit,
                        credit: l.credit,
                        running_balance: running,
                    }
                })
                .collect();

            out.push(GlDetailAccount {
                account: account.clone(),
                opening: opening_balance,
                lines: detail,
                total_debit,
                total_credit,
                closing: running,
            });
        }
        out.sort_by(|a, b| a.account.code.cmp(&b.account.code));

        Ok(GlDetailReport {
            header: ctx.header("General Ledger Detail"),
            accounts: out,
        })
    }

    /// General ledger summary grouped by account group.
    #[must_use]
    pub fn gl_summary(ctx: &ReportContext, balances: Vec<PeriodBalance>) -> GlSummaryReport {
        let mut groups: BTreeMap<(AccountCategory, String, Uuid), GlSummaryGroup> = BTreeMap::new();

        for b in balances.into_iter().filter(|b| !b.is_empty()) {
            let key = (b.account.category, b.account.group_code.clone(), b.account.group_id);
            let group = groups.entry(key).or_insert_with(|| GlSummaryGroup {
                group_id: b.account.group_id,
                group_code: b.account.group_code.clone(),
                group_name: b.account.group_name.clone(),
                category: b.account.category,
                accounts: Vec::new(),
                opening: Decimal::ZERO,
                debit: Decimal::ZERO,
                credit: Decimal::ZERO,
                closing: Decimal::ZERO,
            });
            group.opening += b.opening;
            group.debit += b.debit;
            group.credit += b.credit;
            group.closing += b.closing;
            group.accounts.push(GlSummaryRow {
                account: b.account,
                opening: b.opening,
                debit: b.debit,
                credit: b.credit,
                closing: b.closing,
            });
        }

        let groups: Vec<GlSummaryGroup> = groups
            .into_values()
            .map(|mut g| {
                g.accounts.sort_by(|a, b| a.account.code.cmp(&b.account.code));
                g
            })
            .collect();
        let total_debit = groups.iter().map(|g| g.debit).sum();
        let total_credit = groups.iter().map(|g| g.credit).sum();

        GlSummaryReport {
            header: ctx.header("General Ledger Summary"),
            groups,
            total_debit,
            total_credit,
        }
    }

    /// Precomputed balances of a period, reconciled against live aggregation.
    #[must_use]
    pub fn account_balance(
        ctx: &ReportContext,
        period: &FiscalPeriod,
        stored: Vec<StoredBalance>,
        live: Vec<PeriodBalance>,
    ) -> AccountBalanceReport {
        let mut stored: HashMap<Uuid, StoredBalance> =
            stored.into_iter().map(|s| (s.account_id, s)).collect();

        let mut rows: Vec<AccountBalanceRow> = live
            .into_iter()
            .filter_map(|b| {
                let snapshot = stored.remove(&b.account.account_id);
                if snapshot.is_none() && b.is_empty() {
                    return None;
                }
                let in_sync = snapshot.as_ref().map_or(b.closing.is_zero(), |s| {
                    s.closing_balance == b.closing
                        && s.opening_balance == b.opening
                        && s.debit_movement == b.debit
                        && s.credit_movement == b.credit
                });
                Some(AccountBalanceRow {
                    account: b.account,
                    stored: snapshot,
                    live_closing: b.closing,
                    in_sync,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.account.code.cmp(&b.account.code));
        let discrepancies = rows.iter().filter(|r| !r.in_sync).count();

        AccountBalanceReport {
            header: ctx.header("Account Balance"),
            fiscal_period_id: period.id,
            fiscal_period_name: period.name.clone(),
            rows,
            discrepancies,
        }
    }
}

/// Statement amount of each account's movement inside the range.
fn movement_amounts(rows: &[PeriodBalance]) -> HashMap<Uuid, Decimal> {
    rows.iter()
        .map(|b| {
            (
                b.account.account_id,
                statement_amount(b.account.category, b.debit, b.credit),
            )
        })
        .collect()
}

/// Statement amount of each account's cumulative balance.
fn cumulative_amounts(rows: &[AggregatedBalance]) -> HashMap<Uuid, Decimal> {
    rows.iter()
        .map(|b| {
            (
                b.account.account_id,
                statement_amount(b.account.category, b.debit, b.credit),
            )
        })
        .collect()
}

fn build_section(
    category: AccountCategory,
    accounts: &[&AccountRow],
    current: &HashMap<Uuid, Decimal>,
    previous: Option<&HashMap<Uuid, Decimal>>,
) -> StatementSection {
    let mut lines: Vec<StatementLine> = accounts
        .iter()
        .filter(|a| a.category == category)
        .filter_map(|a| {
            let amount = current.get(&a.account_id).copied().unwrap_or_default();
            let prev = previous.map(|p| p.get(&a.account_id).copied().unwrap_or_default());
            if amount.is_zero() && prev.is_none_or(|p| p.is_zero()) {
                return None;
            }
            Some(StatementLine {
                account_id: a.account_id,
                code: a.code.clone(),
                name: a.name.clone(),
                level: a.level,
                figure: Figure::compared(amount, prev),
            })
        })
        .collect();
    lines.sort_by(|a, b| a.code.cmp(&b.code));

    let total = lines
        .iter()
        .fold(zero_like(previous.is_some()), |acc, l| add(acc, l.figure));

    StatementSection {
        category,
        label: category.label().to_string(),
        lines,
        total,
    }
}

/// Net income from cumulative statement amounts.
fn earnings(accounts: &[&AccountRow], amounts: &HashMap<Uuid, Decimal>) -> Decimal {
    accounts
        .iter()
        .map(|a| {
            let amount = amounts.get(&a.account_id).copied().unwrap_or_default();
            match a.category {
                AccountCategory::Revenue | AccountCategory::OtherIncome => amount,
                AccountCategory::CostOfRevenue
                | AccountCategory::OperatingExpense
                | AccountCategory::OtherExpense => -amount,
                _ => Decimal::ZERO,
            }
        })
        .sum()
}

fn zero_like(compare: bool) -> Figure {
    Figure::compared(Decimal::ZERO, compare.then_some(Decimal::ZERO))
}

fn add(a: Figure, b: Figure) -> Figure {
    Figure::compared(
        a.amount + b.amount,
        a.previous.zip(b.previous).map(|(x, y)| x + y),
    )
}

fn subtract(a: Figure, b: Figure) -> Figure {
    Figure::compared(
        a.amount - b.amount,
        a.previous.zip(b.previous).map(|(x, y)| x - y),
    )
}

/// `amount / base * 100`, rounded to 2 dp. `None` when `base` is zero.
#[must_use]
pub fn percent_of(amount: Decimal, base: Decimal) -> Option<Decimal> {
    if base.is_zero() {
        return None;
    }
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|n| n.checked_div(base))
        .map(|p| p.round_dp(2))
}

fn apply_percentages(section: &mut StatementSection, base: Decimal) {
    for line in &mut section.lines {
        line.figure.percent_of_revenue = percent_of(line.figure.amount, base);
    }
    section.total.percent_of_revenue = percent_of(section.total.amount, base);
}
