//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod account_group;
pub mod account_type;
pub mod balance;
pub mod fiscal;
pub mod journal;
pub mod report;
pub mod user;

pub use account::{AccountError, AccountFilter, AccountInput, AccountRepository};
pub use account_group::{AccountGroupError, AccountGroupInput, AccountGroupRepository};
pub use account_type::{AccountTypeError, AccountTypeInput, AccountTypeRepository};
pub use balance::{BalanceError, BalanceRepository};
pub use fiscal::{FiscalError, FiscalRepository};
pub use journal::{JournalError, JournalFilter, JournalRepository, JournalWithLines, ReverseInput};
pub use report::{ReportError, ReportRepository};
pub use user::UserRepository;

use sea_orm::{DbErr, SqlErr};

/// True when `err` is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
