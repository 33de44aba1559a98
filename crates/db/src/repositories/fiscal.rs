//! Fiscal period repository.
//!
//! Overlap, close and delete rules live in `bukubesar_core::fiscal`; this
//! module loads the comparison set and persists the outcome. The database
//! also carries an exclusion constraint, so two concurrent creates cannot
//! both slip past the check.

use bukubesar_core::fiscal::{
    FiscalPeriod, FiscalPeriodError, PeriodRange, ensure_can_close, ensure_can_delete,
    ensure_can_move, validate_period,
};
use bukubesar_shared::AppError;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::balance::{self, BalanceError};
use crate::entities::{fiscal_periods, journal_entries, sea_orm_active_enums::JournalStatus};

const OVERLAP_CONSTRAINT: &str = "excl_period_overlap";

/// Error types for fiscal period operations.
#[derive(Debug, thiserror::Error)]
pub enum FiscalError {
    /// Fiscal rule violation.
    #[error(transparent)]
    Period(#[from] FiscalPeriodError),

    /// Refreshing the balance snapshot failed.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<FiscalError> for AppError {
    fn from(err: FiscalError) -> Self {
        match err {
            FiscalError::Period(e) => e.into(),
            FiscalError::Balance(e) => e.into(),
            FiscalError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Fiscal period repository.
#[derive(Debug, Clone)]
pub struct FiscalRepository {
    db: DatabaseConnection,
}

impl FiscalRepository {
    /// Creates a new fiscal period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists periods ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<fiscal_periods::Model>, FiscalError> {
        Ok(fiscal_periods::Entity::find()
            .order_by_asc(fiscal_periods::Column::StartDate)
            .all(&self.db)
            .await?)
    }

    /// Finds a period by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the period does not exist.
    pub async fn get(&self, id: Uuid) -> Result<fiscal_periods::Model, FiscalError> {
        fiscal_periods::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FiscalError::Period(FiscalPeriodError::NotFound(id)))
    }

    /// Finds the period containing `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<fiscal_periods::Model>, FiscalError> {
        Ok(fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::StartDate.lte(date))
            .filter(fiscal_periods::Column::EndDate.gte(date))
            .one(&self.db)
            .await?)
    }

    /// Creates a period. A missing name defaults to the month name of the start.
    ///
    /// # Errors
    ///
    /// Returns `MissingName` or `Overlap`.
    pub async fn create(
        &self,
        name: Option<String>,
        range: PeriodRange,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        let name = name.unwrap_or_else(|| bukubesar_core::fiscal::month_name(&range));
        let existing = self.all_periods().await?;
        validate_period(&name, &range, &existing, None)?;

        let now = chrono::Utc::now().into();
        let model = fiscal_periods::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.trim().to_string()),
            start_date: Set(range.start()),
            end_date: Set(range.end()),
            is_closed: Set(false),
            closed_at: Set(None),
            closed_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(&self.db).await.map_err(|e| overlap_or(e, &name))
    }

    /// Renames a period or moves its range.
    ///
    /// The edited period is left out of the overlap comparison. A move is
    /// refused on closed periods and when any of the period's entries would
    /// fall outside the new range; otherwise the snapshot is refreshed from
    /// the earlier of the old and new start dates.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `MissingName`, `Overlap`, `ClosedPeriodDates` or
    /// `EntriesOutsideRange`.
    pub async fn update(
        &self,
        id: Uuid,
        name: String,
        range: PeriodRange,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        let period = self.get(id).await?;
        let existing = self.all_periods().await?;
        validate_period(&name, &range, &existing, Some(id))?;

        let txn = self.db.begin().await?;
        let outside = journal_entries::Entity::find()
            .filter(journal_entries::Column::FiscalPeriodId.eq(id))
            .filter(
                Condition::any()
                    .add(journal_entries::Column::EntryDate.lt(range.start()))
                    .add(journal_entries::Column::EntryDate.gt(range.end())),
            )
            .count(&txn)
            .await?;
        ensure_can_move(&FiscalPeriod::from(period.clone()), &range, outside)?;

        let moved = period.start_date != range.start() || period.end_date != range.end();
        let refresh_from = period.start_date.min(range.start());

        let mut active: fiscal_periods::ActiveModel = period.into();
        active.name = Set(name.trim().to_string());
        active.start_date = Set(range.start());
        active.end_date = Set(range.end());
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await.map_err(|e| overlap_or(e, &name))?;

        if moved {
            balance::refresh_from(&txn, refresh_from).await?;
            tracing::info!(
                period = %updated.name,
                start = %updated.start_date,
                end = %updated.end_date,
                "Fiscal period moved"
            );
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Closes a period that holds no drafts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `AlreadyClosed` or `HasDraftEntries`.
    pub async fn close(
        &self,
        id: Uuid,
        closed_by: Uuid,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        let period = self.get(id).await?;
        let drafts = journal_entries::Entity::find()
            .filter(journal_entries::Column::FiscalPeriodId.eq(id))
            .filter(journal_entries::Column::Status.eq(JournalStatus::Draft))
            .count(&self.db)
            .await?;
        ensure_can_close(&FiscalPeriod::from(period.clone()), drafts)?;

        let now = chrono::Utc::now().into();
        let mut active: fiscal_periods::ActiveModel = period.into();
        active.is_closed = Set(true);
        active.closed_at = Set(Some(now));
        active.closed_by = Set(Some(closed_by));
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    /// Reopens a closed period.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `NotClosed`.
    pub async fn reopen(&self, id: Uuid) -> Result<fiscal_periods::Model, FiscalError> {
        let period = self.get(id).await?;
        if !period.is_closed {
            return Err(FiscalPeriodError::NotClosed.into());
        }

        let mut active: fiscal_periods::ActiveModel = period.into();
        active.is_closed = Set(false);
        active.closed_at = Set(None);
        active.closed_by = Set(None);
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a period no journal entry references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `HasJournalEntries`.
    pub async fn delete(&self, id: Uuid) -> Result<(), FiscalError> {
        self.get(id).await?;
        let journals = journal_entries::Entity::find()
            .filter(journal_entries::Column::FiscalPeriodId.eq(id))
            .count(&self.db)
            .await?;
        ensure_can_delete(journals)?;

        fiscal_periods::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn all_periods(&self) -> Result<Vec<FiscalPeriod>, FiscalError> {
        Ok(self.list().await?.into_iter().map(FiscalPeriod::from).collect())
    }
}

fn overlap_or(err: DbErr, name: &str) -> FiscalError {
    if err.to_string().contains(OVERLAP_CONSTRAINT) {
        FiscalPeriodError::Overlap(name.to_string()).into()
    } else {
        err.into()
    }
}
