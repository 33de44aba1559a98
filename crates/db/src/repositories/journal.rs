//! Journal entry repository.
//!
//! Every mutation runs in one database transaction. Status changes are
//! guarded updates (`WHERE id = ? AND status = expected`); a zero row count
//! means another request won the race.

use std::collections::HashMap;

use bukubesar_core::ledger::{
    AccountInfo, JournalAction, JournalEntryInput, JournalLineInput, LedgerError, LedgerService,
    OriginalLine, PeriodInfo, ReversalService, ValidatedEntry, check_guarded_update,
    ensure_allowed, numbering,
};
use bukubesar_shared::{AppError, PageRequest, PageResponse};
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{balance, is_unique_violation};
use crate::entities::{
    chart_of_accounts, fiscal_periods, journal_entries, journal_entry_lines,
    sea_orm_active_enums::JournalStatus,
};

/// Error types for journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Ledger rule violation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Balance snapshot refresh failed.
    #[error(transparent)]
    Balance(#[from] balance::BalanceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::Ledger(e) => e.into(),
            JournalError::Balance(e) => e.into(),
            JournalError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Filter options for listing journal entries.
#[derive(Debug, Clone, Default)]
pub struct JournalFilter {
    /// Filter by status.
    pub status: Option<JournalStatus>,
    /// Entries dated on or after.
    pub date_from: Option<NaiveDate>,
    /// Entries dated on or before.
    pub date_to: Option<NaiveDate>,
    /// Filter by fiscal period.
    pub fiscal_period_id: Option<Uuid>,
    /// Case-insensitive match on number, description or reference.
    pub search: Option<String>,
}

/// Input for reversing a posted entry.
#[derive(Debug, Clone, Default)]
pub struct ReverseInput {
    /// Date of the reversing entry; today when absent.
    pub date: Option<NaiveDate>,
    /// Reason appended to the reversal description.
    pub reason: Option<String>,
}

/// Journal entry with its lines.
#[derive(Debug, Clone)]
pub struct JournalWithLines {
    /// Header.
    pub entry: journal_entries::Model,
    /// Lines ordered by line number.
    pub lines: Vec<journal_entry_lines::Model>,
}

/// Journal entry repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: JournalFilter,
        page: PageRequest,
    ) -> Result<PageResponse<journal_entries::Model>, JournalError> {
        let mut query = journal_entries::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(journal_entries::Column::Status.eq(status));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }
        if let Some(period_id) = filter.fiscal_period_id {
            query = query.filter(journal_entries::Column::FiscalPeriodId.eq(period_id));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            let col = |c: journal_entries::Column| Expr::col((journal_entries::Entity, c));
            query = query.filter(
                Condition::any()
                    .add(col(journal_entries::Column::Number).ilike(pattern.clone()))
                    .add(col(journal_entries::Column::Description).ilike(pattern.clone()))
                    .add(col(journal_entries::Column::Reference).ilike(pattern)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let entries = query
            .order_by_desc(journal_entries::Column::EntryDate)
            .order_by_desc(journal_entries::Column::Number)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(entries, page.page, page.per_page, total))
    }

    /// Finds an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` if the entry does not exist.
    pub async fn get(&self, id: Uuid) -> Result<JournalWithLines, JournalError> {
        let entry = find_entry(&self.db, id).await?;
        let lines = load_lines(&self.db, id).await?;
        Ok(JournalWithLines { entry, lines })
    }

    /// Creates a DRAFT entry.
    ///
    /// # Errors
    ///
    /// Returns a `LedgerError` when validation fails, or `DuplicateNumber`.
    pub async fn create(
        &self,
        input: JournalEntryInput,
        created_by: Uuid,
    ) -> Result<JournalWithLines, JournalError> {
        let txn = self.db.begin().await?;

        let validated = validate(&txn, &input).await?;
        let number = match explicit_number(&input) {
            Some(number) => {
                ensure_number_free(&txn, &number, None).await?;
                number
            }
            None => generate_number(&txn, input.entry_date).await?,
        };

        let now = Utc::now().into();
        let entry = journal_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            number: Set(number.clone()),
            entry_date: Set(input.entry_date),
            description: Set(validated.description.clone()),
            reference: Set(validated.reference.clone()),
            status: Set(JournalStatus::Draft),
            total_debit: Set(validated.totals.total_debit),
            total_credit: Set(validated.totals.total_credit),
            fiscal_period_id: Set(validated.fiscal_period_id),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| duplicate_or(e, &number))?;

        let lines = insert_lines(&txn, entry.id, &validated.lines).await?;
        txn.commit().await?;

        tracing::info!(journal_id = %entry.id, number = %entry.number, "Journal entry created");
        Ok(JournalWithLines { entry, lines })
    }

    /// Replaces a DRAFT entry's header and lines.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound`, `InvalidTransition`, a validation error or
    /// `ConcurrentModification`.
    pub async fn update(
        &self,
        id: Uuid,
        input: JournalEntryInput,
    ) -> Result<JournalWithLines, JournalError> {
        let txn = self.db.begin().await?;

        let existing = find_entry(&txn, id).await?;
        ensure_allowed(JournalAction::Update, existing.status.into())?;
        let validated = validate(&txn, &input).await?;

        let number = match explicit_number(&input) {
            Some(number) if number != existing.number => {
                ensure_number_free(&txn, &number, Some(id)).await?;
                number
            }
            _ => existing.number.clone(),
        };

        let result = journal_entries::Entity::update_many()
            .set(journal_entries::ActiveModel {
                number: Set(number.clone()),
                entry_date: Set(input.entry_date),
                description: Set(validated.description.clone()),
                reference: Set(validated.reference.clone()),
                total_debit: Set(validated.totals.total_debit),
                total_credit: Set(validated.totals.total_credit),
                fiscal_period_id: Set(validated.fiscal_period_id),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .filter(journal_entries::Column::Id.eq(id))
            .filter(journal_entries::Column::Status.eq(JournalStatus::Draft))
            .exec(&txn)
            .await
            .map_err(|e| duplicate_or(e, &number))?;
        check_guarded_update(result.rows_affected)?;

        journal_entry_lines::Entity::delete_many()
            .filter(journal_entry_lines::Column::JournalEntryId.eq(id))
            .exec(&txn)
            .await?;
        let lines = insert_lines(&txn, id, &validated.lines).await?;
        let entry = find_entry(&txn, id).await?;

        txn.commit().await?;
        tracing::info!(journal_id = %id, "Journal entry updated");
        Ok(JournalWithLines { entry, lines })
    }

    /// Deletes a DRAFT entry.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound`, `InvalidTransition` or `ConcurrentModification`.
    pub async fn delete(&self, id: Uuid) -> Result<(), JournalError> {
        let entry = find_entry(&self.db, id).await?;
        ensure_allowed(JournalAction::Delete, entry.status.into())?;

        let result = journal_entries::Entity::delete_many()
            .filter(journal_entries::Column::Id.eq(id))
            .filter(journal_entries::Column::Status.eq(JournalStatus::Draft))
            .exec(&self.db)
            .await?;
        check_guarded_update(result.rows_affected)?;

        tracing::info!(journal_id = %id, "Journal entry deleted");
        Ok(())
    }

    /// Posts a DRAFT entry and refreshes the affected balance snapshots.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound`, `InvalidTransition`, `PeriodClosed`,
    /// `AccountInactive`, `AccountLocked` or `ConcurrentModification`.
    pub async fn post(&self, id: Uuid, posted_by: Uuid) -> Result<JournalWithLines, JournalError> {
        let txn = self.db.begin().await?;

        let entry = find_entry(&txn, id).await?;
        ensure_allowed(JournalAction::Post, entry.status.into())?;

        let period = fiscal_periods::Entity::find_by_id(entry.fiscal_period_id)
            .one(&txn)
            .await?
            .map(period_info);
        LedgerService::ensure_period_open(entry.entry_date, period)?;

        let lines = load_lines(&txn, id).await?;
        let accounts = account_infos(&txn, lines.iter().map(|l| l.account_id)).await?;
        for line in &lines {
            let account = accounts
                .get(&line.account_id)
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;
            LedgerService::ensure_account_postable(account)?;
        }

        let now = Utc::now().into();
        let result = journal_entries::Entity::update_many()
            .set(journal_entries::ActiveModel {
                status: Set(JournalStatus::Posted),
                posted_by: Set(Some(posted_by)),
                posted_at: Set(Some(now)),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(journal_entries::Column::Id.eq(id))
            .filter(journal_entries::Column::Status.eq(JournalStatus::Draft))
            .exec(&txn)
            .await?;
        check_guarded_update(result.rows_affected)?;

        balance::refresh_from(&txn, entry.entry_date).await?;
        let entry = find_entry(&txn, id).await?;
        txn.commit().await?;

        tracing::info!(journal_id = %id, number = %entry.number, "Journal entry posted");
        Ok(JournalWithLines { entry, lines })
    }

    /// Reverses a POSTED entry.
    ///
    /// Creates a POSTED `{number}-R` entry with swapped sides, links both
    /// entries and marks the original REVERSED. Returns `(original, reversal)`.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound`, `InvalidTransition`, `NoFiscalPeriod`,
    /// `PeriodClosed`, `DuplicateNumber` or `ConcurrentModification`.
    pub async fn reverse(
        &self,
        id: Uuid,
        input: ReverseInput,
        reversed_by: Uuid,
    ) -> Result<(JournalWithLines, JournalWithLines), JournalError> {
        let txn = self.db.begin().await?;

        let original = find_entry(&txn, id).await?;
        ensure_allowed(JournalAction::Reverse, original.status.into())?;

        let date = input.date.unwrap_or_else(|| Utc::now().date_naive());
        let period = LedgerService::ensure_period_open(date, period_for_date(&txn, date).await?)?;

        let original_lines = load_lines(&txn, id).await?;
        let source: Vec<OriginalLine> = original_lines
            .iter()
            .map(|l| OriginalLine {
                account_id: l.account_id,
                debit: l.debit_amount,
                credit: l.credit_amount,
                description: l.description.clone(),
            })
            .collect();
        let plan = ReversalService::plan(&original.number, &source, input.reason.as_deref());
        ensure_number_free(&txn, &plan.number, None).await?;

        let now = Utc::now().into();
        let reversal = journal_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            number: Set(plan.number.clone()),
            entry_date: Set(date),
            description: Set(plan.description.clone()),
            reference: Set(original.reference.clone()),
            status: Set(JournalStatus::Posted),
            total_debit: Set(plan.totals.total_debit),
            total_credit: Set(plan.totals.total_credit),
            fiscal_period_id: Set(period.id),
            created_by: Set(reversed_by),
            posted_by: Set(Some(reversed_by)),
            posted_at: Set(Some(now)),
            reverses_entry_id: Set(Some(id)),
            reversed_by_entry_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| duplicate_or(e, &plan.number))?;
        let reversal_lines = insert_lines(&txn, reversal.id, &plan.lines).await?;

        let result = journal_entries::Entity::update_many()
            .set(journal_entries::ActiveModel {
                status: Set(JournalStatus::Reversed),
                reversed_by_entry_id: Set(Some(reversal.id)),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(journal_entries::Column::Id.eq(id))
            .filter(journal_entries::Column::Status.eq(JournalStatus::Posted))
            .exec(&txn)
            .await?;
        check_guarded_update(result.rows_affected)?;

        balance::refresh_from(&txn, date.min(original.entry_date)).await?;
        let original = find_entry(&txn, id).await?;
        txn.commit().await?;

        tracing::info!(
            journal_id = %id,
            reversal_id = %reversal.id,
            number = %reversal.number,
            "Journal entry reversed"
        );
        Ok((
            JournalWithLines {
                entry: original,
                lines: original_lines,
            },
            JournalWithLines {
                entry: reversal,
                lines: reversal_lines,
            },
        ))
    }
}

async fn find_entry<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<journal_entries::Model, JournalError> {
    journal_entries::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(JournalError::Ledger(LedgerError::JournalNotFound(id)))
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    journal_entry_id: Uuid,
) -> Result<Vec<journal_entry_lines::Model>, DbErr> {
    journal_entry_lines::Entity::find()
        .filter(journal_entry_lines::Column::JournalEntryId.eq(journal_entry_id))
        .order_by_asc(journal_entry_lines::Column::LineNumber)
        .all(conn)
        .await
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    journal_entry_id: Uuid,
    lines: &[JournalLineInput],
) -> Result<Vec<journal_entry_lines::Model>, DbErr> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    let mut out = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let model = journal_entry_lines::ActiveModel {
            id: Set(Uuid::new_v4()),
            journal_entry_id: Set(journal_entry_id),
            account_id: Set(line.account_id),
            line_number: Set(line_number(index)),
            description: Set(line
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)),
            debit_amount: Set(line.debit_amount),
            credit_amount: Set(line.credit_amount),
            created_at: Set(now),
        };
        out.push(model.insert(txn).await?);
    }
    Ok(out)
}

/// 1-based line number for the line at `index`.
fn line_number(index: usize) -> i32 {
    i32::try_from(index + 1).unwrap_or(i32::MAX)
}

/// Runs core validation with accounts and period loaded inside `txn`.
async fn validate(
    txn: &DatabaseTransaction,
    input: &JournalEntryInput,
) -> Result<ValidatedEntry, JournalError> {
    let accounts = account_infos(txn, input.lines.iter().map(|l| l.account_id)).await?;
    let period = period_for_date(txn, input.entry_date).await?;

    Ok(LedgerService::validate_entry(
        input,
        |id| accounts.get(&id).cloned(),
        |_| period.clone(),
    )?)
}

async fn account_infos<C: ConnectionTrait>(
    conn: &C,
    ids: impl Iterator<Item = Uuid>,
) -> Result<HashMap<Uuid, AccountInfo>, DbErr> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let accounts = chart_of_accounts::Entity::find()
        .filter(chart_of_accounts::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(accounts
        .into_iter()
        .map(|a| {
            (
                a.id,
                AccountInfo {
                    id: a.id,
                    code: a.code,
                    is_active: a.is_active,
                    is_locked: a.is_locked,
                },
            )
        })
        .collect())
}

fn period_info(p: fiscal_periods::Model) -> PeriodInfo {
    PeriodInfo {
        id: p.id,
        name: p.name,
        is_closed: p.is_closed,
    }
}

async fn period_for_date<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
) -> Result<Option<PeriodInfo>, DbErr> {
    Ok(fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::StartDate.lte(date))
        .filter(fiscal_periods::Column::EndDate.gte(date))
        .one(conn)
        .await?
        .map(period_info))
}

fn explicit_number(input: &JournalEntryInput) -> Option<String> {
    input
        .number
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

async fn ensure_number_free<C: ConnectionTrait>(
    conn: &C,
    number: &str,
    exclude: Option<Uuid>,
) -> Result<(), JournalError> {
    let mut query =
        journal_entries::Entity::find().filter(journal_entries::Column::Number.eq(number));
    if let Some(id) = exclude {
        query = query.filter(journal_entries::Column::Id.ne(id));
    }
    if query.one(conn).await?.is_some() {
        return Err(LedgerError::DuplicateNumber(number.to_string()).into());
    }
    Ok(())
}

async fn generate_number<C: ConnectionTrait>(conn: &C, date: NaiveDate) -> Result<String, DbErr> {
    let prefix = numbering::month_prefix(date);
    let existing: Vec<String> = journal_entries::Entity::find()
        .select_only()
        .column(journal_entries::Column::Number)
        .filter(journal_entries::Column::Number.starts_with(&prefix))
        .into_tuple()
        .all(conn)
        .await?;
    Ok(numbering::next_number(date, existing.iter().map(String::as_str)))
}

fn duplicate_or(err: DbErr, number: &str) -> JournalError {
    if is_unique_violation(&err) {
        LedgerError::DuplicateNumber(number.to_string()).into()
    } else {
        err.into()
    }
}
