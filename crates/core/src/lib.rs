//! Core business logic for Bukubesar.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping: validation, lifecycle, numbering, reversal
//! - `fiscal` - Fiscal period ranges, overlap and close rules
//! - `balance` - Per-account aggregation of posted lines and journal-type filters
//! - `reports` - Trial balance, profit & loss, balance sheet, general ledger
//! - `export` - CSV rendering of reports

pub mod balance;
pub mod export;
pub mod fiscal;
pub mod ledger;
pub mod reports;
