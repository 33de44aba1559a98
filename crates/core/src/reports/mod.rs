//! Financial report generation.
//!
//! Pure shaping of aggregated balances into:
//! - Trial Balance
//! - Profit & Loss (with comparison and percent of revenue)
//! - Balance Sheet (with current earnings)
//! - General Ledger detail and summary
//! - Account Balance (stored snapshot vs live aggregation)

pub mod error;
pub mod range;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use range::{RangeQuery, resolve_range};
pub use service::{ReportService, percent_of, statement_amount};
pub use types::*;
