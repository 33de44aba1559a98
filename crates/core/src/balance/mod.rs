//! Balance aggregation over posted journal lines.
//!
//! - `filter` - journal-type filter (commitment / breakdown / net / paired)
//! - `aggregator` - per-account movement, balance and period roll-forward

pub mod aggregator;
pub mod filter;

pub use aggregator::{
    AccountRow, AggregatedBalance, BalanceAggregator, Movement, PeriodBalance, PostedLine,
    sits_on_debit,
};
pub use filter::JournalTypeFilter;
