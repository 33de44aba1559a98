//! Account repository for chart of accounts database operations.

use std::collections::HashMap;

use bukubesar_shared::{AppError, PageRequest, PageResponse};
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::is_unique_violation;
use crate::entities::{
    account_groups, chart_of_accounts, journal_entry_lines, sea_orm_active_enums::NormalBalance,
};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Account code already exists.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Account group not found.
    #[error("Account group not found: {0}")]
    GroupNotFound(Uuid),

    /// Parent account not found.
    #[error("Parent account not found: {0}")]
    ParentNotFound(Uuid),

    /// Parent is the account itself or one of its descendants.
    #[error("Account cannot be its own ancestor")]
    ParentCycle,

    /// Account is locked.
    #[error("Account '{0}' is locked")]
    Locked(String),

    /// Journal lines still reference the account.
    #[error("Cannot delete account: {0} journal lines reference it")]
    HasJournalLines(u64),

    /// Child accounts still reference the account.
    #[error("Cannot delete account: it has {0} child accounts")]
    HasChildren(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::NotFound(_) => Self::not_found("ACCOUNT_NOT_FOUND", message),
            AccountError::DuplicateCode(_) => Self::conflict("DUPLICATE_CODE", message),
            AccountError::GroupNotFound(_) => Self::validation("ACCOUNT_GROUP_NOT_FOUND", message),
            AccountError::ParentNotFound(_) => Self::validation("PARENT_NOT_FOUND", message),
            AccountError::ParentCycle => Self::validation("INVALID_PARENT", message),
            AccountError::Locked(_) => Self::conflict("ACCOUNT_LOCKED", message),
            AccountError::HasJournalLines(_) | AccountError::HasChildren(_) => {
                Self::conflict("ACCOUNT_IN_USE", message)
            }
            AccountError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or replacing an account.
#[derive(Debug, Clone)]
pub struct AccountInput {
    /// Account code (unique).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Parent account ID.
    pub parent_id: Option<Uuid>,
    /// Owning group.
    pub account_group_id: Uuid,
    /// Normal balance; defaults to the group's.
    pub normal_balance: Option<NormalBalance>,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by group.
    pub account_group_id: Option<Uuid>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Case-insensitive match on code or name.
    pub search: Option<String>,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: AccountFilter,
        page: PageRequest,
    ) -> Result<PageResponse<chart_of_accounts::Model>, AccountError> {
        let mut query = chart_of_accounts::Entity::find();

        if let Some(group_id) = filter.account_group_id {
            query = query.filter(chart_of_accounts::Column::AccountGroupId.eq(group_id));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(chart_of_accounts::Column::IsActive.eq(is_active));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::col((chart_of_accounts::Entity, chart_of_accounts::Column::Code))
                            .ilike(pattern.clone()),
                    )
                    .add(
                        Expr::col((chart_of_accounts::Entity, chart_of_accounts::Column::Name))
                            .ilike(pattern),
                    ),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let accounts = query
            .order_by_asc(chart_of_accounts::Column::Code)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(accounts, page.page, page.per_page, total))
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn get(&self, id: Uuid) -> Result<chart_of_accounts::Model, AccountError> {
        chart_of_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))
    }

    /// Creates an account. Level is derived from the parent.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound`, `ParentNotFound` or `DuplicateCode`.
    pub async fn create(&self, input: AccountInput) -> Result<chart_of_accounts::Model, AccountError> {
        let group = self.find_group(input.account_group_id).await?;
        self.ensure_code_free(&input.code, None).await?;
        let level = self.level_under(input.parent_id).await?;

        let now = chrono::Utc::now().into();
        let model = chart_of_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code.clone()),
            name: Set(input.name),
            description: Set(input.description),
            parent_id: Set(input.parent_id),
            level: Set(level),
            account_group_id: Set(input.account_group_id),
            normal_balance: Set(input.normal_balance.unwrap_or(group.normal_balance)),
            is_active: Set(input.is_active),
            is_locked: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| duplicate_code_or(e, input.code))
    }

    /// Replaces an account's fields.
    ///
    /// Moving an account re-levels its whole subtree in the same transaction.
    /// An omitted normal balance keeps the current side while the group is
    /// unchanged, and takes the new group's side on a move.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Locked`, `GroupNotFound`, `ParentNotFound`,
    /// `ParentCycle` or `DuplicateCode`.
    pub async fn update(
        &self,
        id: Uuid,
        input: AccountInput,
    ) -> Result<chart_of_accounts::Model, AccountError> {
        let existing = self.get(id).await?;
        if existing.is_locked {
            return Err(AccountError::Locked(existing.code));
        }
        let group = self.find_group(input.account_group_id).await?;
        if existing.code != input.code {
            self.ensure_code_free(&input.code, Some(id)).await?;
        }

        let hierarchy = self.hierarchy().await?;
        if let Some(parent_id) = input.parent_id
            && creates_cycle(id, parent_id, &hierarchy)
        {
            return Err(AccountError::ParentCycle);
        }
        let level = self.level_under(input.parent_id).await?;
        let relevel = level != existing.level;
        let normal_balance = side_on_update(
            input.normal_balance,
            &existing,
            input.account_group_id,
            group.normal_balance,
        );
        let code = input.code.clone();

        let txn = self.db.begin().await?;

        let mut active: chart_of_accounts::ActiveModel = existing.into();
        active.code = Set(input.code);
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.parent_id = Set(input.parent_id);
        active.level = Set(level);
        active.account_group_id = Set(input.account_group_id);
        active.normal_balance = Set(normal_balance);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| duplicate_code_or(e, code))?;

        if relevel {
            for (child_id, child_level) in subtree_levels(id, level, &hierarchy) {
                chart_of_accounts::Entity::update_many()
                    .col_expr(chart_of_accounts::Column::Level, Expr::value(child_level))
                    .filter(chart_of_accounts::Column::Id.eq(child_id))
                    .exec(&txn)
                    .await?;
            }
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes an account that no journal line or child references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Locked`, `HasJournalLines` or `HasChildren`.
    pub async fn delete(&self, id: Uuid) -> Result<(), AccountError> {
        let account = self.get(id).await?;
        if account.is_locked {
            return Err(AccountError::Locked(account.code));
        }

        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::AccountId.eq(id))
            .count(&self.db)
            .await?;
        if lines > 0 {
            return Err(AccountError::HasJournalLines(lines));
        }

        let children = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::ParentId.eq(id))
            .count(&self.db)
            .await?;
        if children > 0 {
            return Err(AccountError::HasChildren(children));
        }

        chart_of_accounts::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Locks or unlocks an account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn set_locked(
        &self,
        id: Uuid,
        locked: bool,
    ) -> Result<chart_of_accounts::Model, AccountError> {
        let account = self.get(id).await?;
        let mut active: chart_of_accounts::ActiveModel = account.into();
        active.is_locked = Set(locked);
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    async fn find_group(&self, id: Uuid) -> Result<account_groups::Model, AccountError> {
        account_groups::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::GroupNotFound(id))
    }

    async fn level_under(&self, parent_id: Option<Uuid>) -> Result<i32, AccountError> {
        match parent_id {
            None => Ok(1),
            Some(pid) => {
                let parent = chart_of_accounts::Entity::find_by_id(pid)
                    .one(&self.db)
                    .await?
                    .ok_or(AccountError::ParentNotFound(pid))?;
                Ok(parent.level + 1)
            }
        }
    }

    async fn ensure_code_free(&self, code: &str, exclude: Option<Uuid>) -> Result<(), AccountError> {
        let mut query =
            chart_of_accounts::Entity::find().filter(chart_of_accounts::Column::Code.eq(code));
        if let Some(id) = exclude {
            query = query.filter(chart_of_accounts::Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(AccountError::DuplicateCode(code.to_string()));
        }
        Ok(())
    }

    /// Parent link of every account.
    async fn hierarchy(&self) -> Result<HashMap<Uuid, Option<Uuid>>, AccountError> {
        let rows: Vec<(Uuid, Option<Uuid>)> = chart_of_accounts::Entity::find()
            .select_only()
            .column(chart_of_accounts::Column::Id)
            .column(chart_of_accounts::Column::ParentId)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().collect())
    }
}

/// Whether making `parent_id` the parent of `id` would close a loop.
fn creates_cycle(id: Uuid, parent_id: Uuid, parents: &HashMap<Uuid, Option<Uuid>>) -> bool {
    let mut cursor = Some(parent_id);
    let mut steps = 0;
    while let Some(current) = cursor {
        if current == id {
            return true;
        }
        steps += 1;
        if steps > parents.len() {
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    false
}

/// New levels for every descendant of `root` when `root` sits at `root_level`.
fn subtree_levels(
    root: Uuid,
    root_level: i32,
    parents: &HashMap<Uuid, Option<Uuid>>,
) -> Vec<(Uuid, i32)> {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (id, parent) in parents {
        if let Some(p) = parent {
            children.entry(*p).or_default().push(*id);
        }
    }

    let mut out = Vec::new();
    let mut stack = vec![(root, root_level)];
    while let Some((node, level)) = stack.pop() {
        for child in children.get(&node).into_iter().flatten() {
            out.push((*child, level + 1));
            stack.push((*child, level + 1));
        }
    }
    out
}

fn duplicate_code_or(err: DbErr, code: String) -> AccountError {
    if is_unique_violation(&err) {
        AccountError::DuplicateCode(code)
    } else {
        err.into()
    }
}

fn side_on_update(
    requested: Option<NormalBalance>,
    existing: &chart_of_accounts::Model,
    group_id: Uuid,
    group_default: NormalBalance,
) -> NormalBalance {
    requested.unwrap_or(if existing.account_group_id == group_id {
        existing.normal_balance
    } else {
        group_default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contra_asset(group_id: Uuid) -> chart_of_accounts::Model {
        let now = chrono::Utc::now().into();
        chart_of_accounts::Model {
            id: Uuid::new_v4(),
            code: "1202".to_string(),
            name: "Accumulated Depreciation".to_string(),
            description: None,
            parent_id: None,
            level: 1,
            account_group_id: group_id,
            normal_balance: NormalBalance::Credit,
            is_active: true,
            is_locked: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_update_keeps_side_within_group() {
        let group_id = Uuid::new_v4();
        let existing = contra_asset(group_id);
        assert_eq!(
            side_on_update(None, &existing, group_id, NormalBalance::Debit),
            NormalBalance::Credit
        );
        assert_eq!(
            side_on_update(Some(NormalBalance::Debit), &existing, group_id, NormalBalance::Debit),
            NormalBalance::Debit
        );
    }

    #[test]
    fn test_update_takes_side_of_new_group() {
        let existing = contra_asset(Uuid::new_v4());
        assert_eq!(
            side_on_update(None, &existing, Uuid::new_v4(), NormalBalance::Debit),
            NormalBalance::Debit
        );
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = duplicate_code_or(DbErr::Custom("boom".to_string()), "1101".to_string());
        assert!(matches!(err, AccountError::Database(_)));
    }

    fn chain() -> (Vec<Uuid>, HashMap<Uuid, Option<Uuid>>) {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let mut parents = HashMap::new();
        parents.insert(ids[0], None);
        parents.insert(ids[1], Some(ids[0]));
        parents.insert(ids[2], Some(ids[1]));
        parents.insert(ids[3], None);
        (ids, parents)
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let (ids, parents) = chain();
        assert!(creates_cycle(ids[0], ids[0], &parents));
    }

    #[test]
    fn test_descendant_parent_is_cycle() {
        let (ids, parents) = chain();
        assert!(creates_cycle(ids[0], ids[2], &parents));
        assert!(!creates_cycle(ids[2], ids[0], &parents));
        assert!(!creates_cycle(ids[0], ids[3], &parents));
    }

    #[test]
    fn test_subtree_levels() {
        let (ids, parents) = chain();
        let mut levels = subtree_levels(ids[0], 2, &parents);
        levels.sort_by_key(|(_, l)| *l);
        assert_eq!(levels, vec![(ids[1], 3), (ids[2], 4)]);
        assert!(subtree_levels(ids[3], 1, &parents).is_empty());
    }
}
