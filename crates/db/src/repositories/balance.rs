//! Precomputed account balances.
//!
//! `account_balances` is a snapshot derived from posted lines. It is rebuilt
//! for every period a posting can affect: the entry's own period and every
//! later one, whose opening balances move with it.

use bukubesar_core::balance::{BalanceAggregator, JournalTypeFilter};
use bukubesar_core::fiscal::{FiscalPeriod, FiscalPeriodError, PeriodRange};
use bukubesar_core::reports::StoredBalance;
use bukubesar_shared::AppError;
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::report::{load_account_rows, load_posted_lines};
use crate::entities::{account_balances, fiscal_periods};

/// Error types for balance snapshot operations.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// Fiscal rule violation.
    #[error(transparent)]
    Period(#[from] FiscalPeriodError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BalanceError> for AppError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::Period(e) => e.into(),
            BalanceError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Recomputes the snapshot of one period inside `conn`.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns an error if a query fails.
pub async fn refresh_period<C: ConnectionTrait>(
    conn: &C,
    period: &fiscal_periods::Model,
) -> Result<usize, BalanceError> {
    let range = PeriodRange::new(period.start_date, period.end_date)?;
    let lines = load_posted_lines(conn, range.end()).await?;
    let accounts = load_account_rows(conn, &lines, None).await?;
    let snapshot: Vec<StoredBalance> =
        BalanceAggregator::period_balances(&accounts, &lines, &range, JournalTypeFilter::All)
            .iter()
            .filter(|b| !b.is_empty())
            .map(StoredBalance::from)
            .collect();

    account_balances::Entity::delete_many()
        .filter(account_balances::Column::FiscalPeriodId.eq(period.id))
        .exec(conn)
        .await?;

    if snapshot.is_empty() {
        return Ok(0);
    }

    let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
    let written = snapshot.len();
    let models = snapshot.into_iter().map(|s| account_balances::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(s.account_id),
        fiscal_period_id: Set(period.id),
        opening_balance: Set(s.opening_balance),
        debit_movement: Set(s.debit_movement),
        credit_movement: Set(s.credit_movement),
        closing_balance: Set(s.closing_balance),
        updated_at: Set(now),
    });
    account_balances::Entity::insert_many(models).exec(conn).await?;

    tracing::debug!(period = %period.name, rows = written, "Refreshed account balances");
    Ok(written)
}

/// Refreshes every period ending on or after `from`.
///
/// # Errors
///
/// Returns an error if a query fails.
pub async fn refresh_from<C: ConnectionTrait>(conn: &C, from: NaiveDate) -> Result<(), BalanceError> {
    let periods = fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::EndDate.gte(from))
        .order_by_asc(fiscal_periods::Column::StartDate)
        .all(conn)
        .await?;
    for period in &periods {
        refresh_period(conn, period).await?;
    }
    Ok(())
}

/// Repository for the precomputed balance snapshot.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Rebuilds the snapshot of one period in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the period does not exist.
    pub async fn rebuild(&self, fiscal_period_id: Uuid) -> Result<(FiscalPeriod, usize), BalanceError> {
        let txn = self.db.begin().await?;
        let period = fiscal_periods::Entity::find_by_id(fiscal_period_id)
            .one(&txn)
            .await?
            .ok_or(FiscalPeriodError::NotFound(fiscal_period_id))?;
        let written = refresh_period(&txn, &period).await?;
        txn.commit().await?;

        tracing::info!(period = %period.name, rows = written, "Rebuilt account balances");
        Ok((FiscalPeriod::from(period), written))
    }
}
