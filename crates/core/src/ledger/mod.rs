//! Double-entry bookkeeping logic.
//!
//! This module implements the journal side of the ledger:
//! - Domain types (normal balance, journal status, lines)
//! - Stable account categories for report bucketing
//! - Line validation and entry validation against accounts and periods
//! - The DRAFT -> POSTED -> REVERSED state machine
//! - Reversing entries and automatic numbering

pub mod category;
pub mod error;
pub mod lifecycle;
pub mod numbering;
pub mod reversal;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use category::{AccountCategory, Statement};
pub use error::LedgerError;
pub use lifecycle::{JournalAction, check_guarded_update, ensure_allowed};
pub use reversal::{OriginalLine, ReversalPlan, ReversalService};
pub use service::{AccountInfo, LedgerService, PeriodInfo, ValidatedEntry};
pub use types::{JournalEntryInput, JournalLineInput, JournalStatus, JournalTotals, NormalBalance};
