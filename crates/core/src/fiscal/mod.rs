//! Fiscal period management.

pub mod error;
pub mod period;

pub use error::FiscalPeriodError;
pub use period::{
    FiscalPeriod, PeriodRange, date_ranges_overlap, ensure_can_close, ensure_can_delete,
    ensure_can_move, find_overlap, month_name, validate_period,
};
