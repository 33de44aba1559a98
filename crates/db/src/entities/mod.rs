//! `SeaORM` entity definitions.

pub mod account_balances;
pub mod account_groups;
pub mod account_types;
pub mod chart_of_accounts;
pub mod fiscal_periods;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod sea_orm_active_enums;
pub mod users;
