//! Account balance aggregation.
//!
//! Sums posted journal lines per account and signs the result by the
//! account's normal balance:
//!
//! - `DEBIT` accounts: balance = debit - credit
//! - `CREDIT` accounts: balance = credit - debit
//!
//! Lines of REVERSED entries still count; their reversing entry offsets them.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::filter::JournalTypeFilter;
use crate::fiscal::PeriodRange;
use crate::ledger::{AccountCategory, NormalBalance};

/// Account facts carried into every report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRow {
    /// Account ID.
    pub account_id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type code (ASSET, REVENUE, ...).
    pub account_type: String,
    /// Group ID.
    pub group_id: Uuid,
    /// Group code.
    pub group_code: String,
    /// Group name.
    pub group_name: String,
    /// Report category of the group.
    pub category: AccountCategory,
    /// Tree depth, 1 for roots.
    pub level: i32,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
}

/// A line of a posted (or since reversed) journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedLine {
    /// Journal entry ID.
    pub journal_entry_id: Uuid,
    /// Journal number.
    pub journal_number: String,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Journal description.
    pub journal_description: String,
    /// Journal reference.
    pub reference: Option<String>,
    /// Line number inside the entry.
    pub line_number: i32,
    /// Line description.
    pub description: Option<String>,
    /// Account posted to.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// Raw debit and credit sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Total debit.
    pub debit: Decimal,
    /// Total credit.
    pub credit: Decimal,
}

impl Movement {
    /// Adds a line.
    pub fn add(&mut self, debit: Decimal, credit: Decimal) {
        self.debit += debit;
        self.credit += credit;
    }

    /// Debit minus credit.
    #[must_use]
    pub fn net_debit(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Signed balance from the normal side.
    #[must_use]
    pub fn balance(&self, normal: NormalBalance) -> Decimal {
        normal.balance_of(self.debit, self.credit)
    }
}

impl std::ops::Add for Movement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            debit: self.debit + rhs.debit,
            credit: self.credit + rhs.credit,
        }
    }
}

/// Which side a net amount sits on.
///
/// Positive net debit is a debit balance, negative a credit balance; a zero
/// balance is shown on the account's normal side.
#[must_use]
pub fn sits_on_debit(net_debit: Decimal, normal: NormalBalance) -> bool {
    if net_debit > Decimal::ZERO {
        true
    } else if net_debit < Decimal::ZERO {
        false
    } else {
        normal == NormalBalance::Debit
    }
}

/// Movement and balance of one account over a range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedBalance {
    /// Account facts.
    #[serde(flatten)]
    pub account: AccountRow,
    /// Total debit.
    pub debit: Decimal,
    /// Total credit.
    pub credit: Decimal,
    /// Signed balance from the normal side.
    pub balance: Decimal,
    /// Whether the balance sits on the debit side.
    pub is_debit: bool,
}

/// Opening, movement and closing of one account for a range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodBalance {
    /// Account facts.
    #[serde(flatten)]
    pub account: AccountRow,
    /// Balance before the range, signed from the normal side.
    pub opening: Decimal,
    /// Debit inside the range.
    pub debit: Decimal,
    /// Credit inside the range.
    pub credit: Decimal,
    /// Opening plus the signed movement.
    pub closing: Decimal,
    /// Whether the closing balance sits on the debit side.
    pub is_debit: bool,
}

impl PeriodBalance {
    /// True when the account had no balance and no activity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.opening.is_zero() && self.debit.is_zero() && self.credit.is_zero()
    }

    /// Closing balance as an unsigned amount on its side.
    #[must_use]
    pub fn closing_debit(&self) -> Decimal {
        if self.is_debit { self.closing.abs() } else { Decimal::ZERO }
    }

    /// Closing balance as an unsigned amount on its side.
    #[must_use]
    pub fn closing_credit(&self) -> Decimal {
        if self.is_debit { Decimal::ZERO } else { self.closing.abs() }
    }
}

/// Stateless balance aggregator.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Keeps only lines whose journal number passes `filter`.
    #[must_use]
    pub fn filter_lines(lines: &[PostedLine], filter: JournalTypeFilter) -> Vec<&PostedLine> {
        if filter == JournalTypeFilter::All {
            return lines.iter().collect();
        }
        let admitted = filter.admitted(lines.iter().map(|l| l.journal_number.as_str()));
        lines
            .iter()
            .filter(|l| admitted.contains(l.journal_number.as_str()))
            .collect()
    }

    /// Sums debit and credit per account.
    #[must_use]
    pub fn movements<'a, I>(lines: I) -> HashMap<Uuid, Movement>
    where
        I: IntoIterator<Item = &'a PostedLine>,
    {
        let mut out: HashMap<Uuid, Movement> = HashMap::new();
        for line in lines {
            out.entry(line.account_id)
                .or_default()
                .add(line.debit, line.credit);
        }
        out
    }

    /// Movement and balance per account over every given line.
    ///
    /// One row per account, in the given order. Accounts without lines get
    /// zero rows.
    #[must_use]
    pub fn aggregate(
        accounts: &[AccountRow],
        lines: &[PostedLine],
        filter: JournalTypeFilter,
    ) -> Vec<AggregatedBalance> {
        let movements = Self::movements(Self::filter_lines(lines, filter));
        accounts
            .iter()
            .map(|account| {
                let m = movements.get(&account.account_id).copied().unwrap_or_default();
                AggregatedBalance {
                    account: account.clone(),
                    debit: m.debit,
                    credit: m.credit,
                    balance: m.balance(account.normal_balance),
                    is_debit: sits_on_debit(m.net_debit(), account.normal_balance),
                }
            })
            .collect()
    }

    /// Opening, movement and closing per account for `range`.
    ///
    /// Lines dated before the range form the opening balance; lines after
    /// the range are ignored. The journal-type filter sees every line up to
    /// the range end, so a pair split across the boundary still matches.
    #[must_use]
    pub fn period_balances(
        accounts: &[AccountRow],
        lines: &[PostedLine],
        range: &PeriodRange,
        filter: JournalTypeFilter,
    ) -> Vec<PeriodBalance> {
        let relevant: Vec<PostedLine> = lines
            .iter()
            .filter(|l| l.entry_date <= range.end())
            .cloned()
            .collect();
        let kept = Self::filter_lines(&relevant, filter);

        let opening = Self::movements(kept.iter().copied().filter(|l| l.entry_date < range.start()));
        let inside = Self::movements(kept.iter().copied().filter(|l| range.contains(l.entry_date)));

        accounts
            .iter()
            .map(|account| {
                let normal = account.normal_balance;
                let before = opening.get(&account.account_id).copied().unwrap_or_default();
                let during = inside.get(&account.account_id).copied().unwrap_or_default();
                let total = before + during;
                PeriodBalance {
                    account: account.clone(),
                    opening: before.balance(normal),
                    debit: during.debit,
                    credit: during.credit,
                    closing: total.balance(normal),
                    is_debit: sits_on_debit(total.net_debit(), normal),
                }
            })
            .collect()
    }
}
