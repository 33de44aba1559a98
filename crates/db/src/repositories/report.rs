//! Report repository: loads the account rows and posted lines the report
//! shapers consume.
//!
//! Lines of POSTED and REVERSED entries are both loaded; a reversal is
//! itself a POSTED entry that offsets the original.

use std::collections::HashSet;

use bukubesar_core::balance::{AccountRow, PostedLine};
use bukubesar_core::fiscal::FiscalPeriod;
use bukubesar_core::reports::{ReportError as CoreReportError, StoredBalance};
use bukubesar_shared::AppError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use crate::entities::{
    account_balances, account_groups, account_types, chart_of_accounts, fiscal_periods,
    journal_entries, journal_entry_lines,
    sea_orm_active_enums::{AccountCategory, JournalStatus, NormalBalance},
};

/// Error types for report queries.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Report rule violation.
    #[error(transparent)]
    Report(#[from] CoreReportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Report(e) => e.into(),
            ReportError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Journal statuses whose lines count toward balances.
pub const COUNTED_STATUSES: [JournalStatus; 2] = [JournalStatus::Posted, JournalStatus::Reversed];

#[derive(Debug, FromQueryResult)]
struct AccountRowResult {
    account_id: Uuid,
    code: String,
    name: String,
    account_type: String,
    group_id: Uuid,
    group_code: String,
    group_name: String,
    category: AccountCategory,
    level: i32,
    normal_balance: NormalBalance,
    is_active: bool,
}

impl From<AccountRowResult> for AccountRow {
    fn from(r: AccountRowResult) -> Self {
        Self {
            account_id: r.account_id,
            code: r.code,
            name: r.name,
            account_type: r.account_type,
            group_id: r.group_id,
            group_code: r.group_code,
            group_name: r.group_name,
            category: r.category.into(),
            level: r.level,
            normal_balance: r.normal_balance.into(),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct PostedLineResult {
    journal_entry_id: Uuid,
    journal_number: String,
    entry_date: NaiveDate,
    journal_description: String,
    reference: Option<String>,
    line_number: i32,
    description: Option<String>,
    account_id: Uuid,
    debit_amount: Decimal,
    credit_amount: Decimal,
}

impl From<PostedLineResult> for PostedLine {
    fn from(r: PostedLineResult) -> Self {
        Self {
            journal_entry_id: r.journal_entry_id,
            journal_number: r.journal_number,
            entry_date: r.entry_date,
            journal_description: r.journal_description,
            reference: r.reference,
            line_number: r.line_number,
            description: r.description,
            account_id: r.account_id,
            debit: r.debit_amount,
            credit: r.credit_amount,
        }
    }
}

/// Posted lines dated on or before `until`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn load_posted_lines<C: ConnectionTrait>(
    conn: &C,
    until: NaiveDate,
) -> Result<Vec<PostedLine>, DbErr> {
    let rows = journal_entry_lines::Entity::find()
        .select_only()
        .column(journal_entry_lines::Column::JournalEntryId)
        .column_as(journal_entries::Column::Number, "journal_number")
        .column(journal_entries::Column::EntryDate)
        .column_as(journal_entries::Column::Description, "journal_description")
        .column(journal_entries::Column::Reference)
        .column(journal_entry_lines::Column::LineNumber)
        .column(journal_entry_lines::Column::Description)
        .column(journal_entry_lines::Column::AccountId)
        .column(journal_entry_lines::Column::DebitAmount)
        .column(journal_entry_lines::Column::CreditAmount)
        .join(
            JoinType::InnerJoin,
            journal_entry_lines::Relation::JournalEntries.def(),
        )
        .filter(journal_entries::Column::Status.is_in(COUNTED_STATUSES))
        .filter(journal_entries::Column::EntryDate.lte(until))
        .order_by_asc(journal_entries::Column::EntryDate)
        .order_by_asc(journal_entries::Column::Number)
        .order_by_asc(journal_entry_lines::Column::LineNumber)
        .into_model::<PostedLineResult>()
        .all(conn)
        .await?;

    Ok(rows.into_iter().map(PostedLine::from).collect())
}

/// Account rows for reporting.
///
/// Active accounts are always included; inactive ones only when they carry
/// lines in `lines`, so historical balances still add up, or when they are
/// the `requested` account.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn load_account_rows<C: ConnectionTrait>(
    conn: &C,
    lines: &[PostedLine],
    requested: Option<Uuid>,
) -> Result<Vec<AccountRow>, DbErr> {
    let rows = chart_of_accounts::Entity::find()
        .select_only()
        .column_as(chart_of_accounts::Column::Id, "account_id")
        .column(chart_of_accounts::Column::Code)
        .column(chart_of_accounts::Column::Name)
        .column_as(account_types::Column::Code, "account_type")
        .column_as(chart_of_accounts::Column::AccountGroupId, "group_id")
        .column_as(account_groups::Column::Code, "group_code")
        .column_as(account_groups::Column::Name, "group_name")
        .column(account_groups::Column::Category)
        .column(chart_of_accounts::Column::Level)
        .column(chart_of_accounts::Column::NormalBalance)
        .column(chart_of_accounts::Column::IsActive)
        .join(
            JoinType::InnerJoin,
            chart_of_accounts::Relation::AccountGroups.def(),
        )
        .join(JoinType::InnerJoin, account_groups::Relation::AccountTypes.def())
        .order_by_asc(chart_of_accounts::Column::Code)
        .into_model::<AccountRowResult>()
        .all(conn)
        .await?;

    let used: HashSet<Uuid> = lines.iter().map(|l| l.account_id).collect();
    Ok(rows
        .into_iter()
        .filter(|r| {
            r.is_active || used.contains(&r.account_id) || requested == Some(r.account_id)
        })
        .map(AccountRow::from)
        .collect())
}

/// Report repository for financial report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Accounts and posted lines up to `until`.
    ///
    /// `requested` names an account that must be present even when it is
    /// inactive and idle.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn dataset(
        &self,
        until: NaiveDate,
        requested: Option<Uuid>,
    ) -> Result<(Vec<AccountRow>, Vec<PostedLine>), ReportError> {
        let lines = load_posted_lines(&self.db, until).await?;
        let accounts = load_account_rows(&self.db, &lines, requested).await?;
        Ok((accounts, lines))
    }

    /// Finds a fiscal period by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_period(&self, id: Uuid) -> Result<Option<FiscalPeriod>, ReportError> {
        Ok(fiscal_periods::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(FiscalPeriod::from))
    }

    /// Finds the fiscal period containing `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn period_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<FiscalPeriod>, ReportError> {
        Ok(fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::StartDate.lte(date))
            .filter(fiscal_periods::Column::EndDate.gte(date))
            .one(&self.db)
            .await?
            .map(FiscalPeriod::from))
    }

    /// Stored snapshot rows of a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn stored_balances(
        &self,
        fiscal_period_id: Uuid,
    ) -> Result<Vec<StoredBalance>, ReportError> {
        Ok(account_balances::Entity::find()
            .filter(account_balances::Column::FiscalPeriodId.eq(fiscal_period_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(StoredBalance::from)
            .collect())
    }
}
