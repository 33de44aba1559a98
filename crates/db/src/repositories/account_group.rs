//! Account group repository.
//!
//! Groups carry the report category that decides where their accounts land
//! on the balance sheet or profit & loss.

use bukubesar_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::is_unique_violation;
use crate::entities::{
    account_groups, account_types, chart_of_accounts,
    sea_orm_active_enums::{AccountCategory, NormalBalance},
};

/// Error types for account group operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountGroupError {
    /// Group not found.
    #[error("Account group not found: {0}")]
    NotFound(Uuid),

    /// Referenced account type does not exist.
    #[error("Account type not found: {0}")]
    AccountTypeNotFound(Uuid),

    /// Code already taken.
    #[error("Account group code '{0}' already exists")]
    DuplicateCode(String),

    /// Accounts still reference the group.
    #[error("Cannot delete account group: {0} accounts reference it")]
    InUse(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountGroupError> for AppError {
    fn from(err: AccountGroupError) -> Self {
        let message = err.to_string();
        match err {
            AccountGroupError::NotFound(_) => Self::not_found("ACCOUNT_GROUP_NOT_FOUND", message),
            AccountGroupError::AccountTypeNotFound(_) => {
                Self::validation("ACCOUNT_TYPE_NOT_FOUND", message)
            }
            AccountGroupError::DuplicateCode(_) => Self::conflict("DUPLICATE_CODE", message),
            AccountGroupError::InUse(_) => Self::conflict("ACCOUNT_GROUP_IN_USE", message),
            AccountGroupError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or replacing an account group.
#[derive(Debug, Clone)]
pub struct AccountGroupInput {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Owning account type.
    pub account_type_id: Uuid,
    /// Normal balance; defaults to the account type's.
    pub normal_balance: Option<NormalBalance>,
    /// Report category.
    pub category: AccountCategory,
}

/// Account group repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountGroupRepository {
    db: DatabaseConnection,
}

impl AccountGroupRepository {
    /// Creates a new account group repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists groups ordered by code, optionally for one account type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        account_type_id: Option<Uuid>,
    ) -> Result<Vec<account_groups::Model>, AccountGroupError> {
        let mut query = account_groups::Entity::find().order_by_asc(account_groups::Column::Code);
        if let Some(type_id) = account_type_id {
            query = query.filter(account_groups::Column::AccountTypeId.eq(type_id));
        }
        Ok(query.all(&self.db).await?)
    }

    /// Finds a group by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub async fn get(&self, id: Uuid) -> Result<account_groups::Model, AccountGroupError> {
        account_groups::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountGroupError::NotFound(id))
    }

    /// Creates a group.
    ///
    /// # Errors
    ///
    /// Returns `AccountTypeNotFound` or `DuplicateCode`.
    pub async fn create(
        &self,
        input: AccountGroupInput,
    ) -> Result<account_groups::Model, AccountGroupError> {
        let account_type = self.find_type(input.account_type_id).await?;
        self.ensure_code_free(&input.code, None).await?;

        let now = chrono::Utc::now().into();
        let model = account_groups::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code.clone()),
            name: Set(input.name),
            account_type_id: Set(input.account_type_id),
            normal_balance: Set(input.normal_balance.unwrap_or(account_type.normal_balance)),
            category: Set(input.category),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AccountGroupError::DuplicateCode(input.code)
            } else {
                e.into()
            }
        })
    }

    /// Replaces a group's fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `AccountTypeNotFound` or `DuplicateCode`.
    pub async fn update(
        &self,
        id: Uuid,
        input: AccountGroupInput,
    ) -> Result<account_groups::Model, AccountGroupError> {
        let existing = self.get(id).await?;
        let account_type = self.find_type(input.account_type_id).await?;
        if existing.code != input.code {
            self.ensure_code_free(&input.code, Some(id)).await?;
        }

        let mut active: account_groups::ActiveModel = existing.into();
        active.code = Set(input.code);
        active.name = Set(input.name);
        active.account_type_id = Set(input.account_type_id);
        active.normal_balance = Set(input.normal_balance.unwrap_or(account_type.normal_balance));
        active.category = Set(input.category);
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a group that no account references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InUse`.
    pub async fn delete(&self, id: Uuid) -> Result<(), AccountGroupError> {
        self.get(id).await?;

        let accounts = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::AccountGroupId.eq(id))
            .count(&self.db)
            .await?;
        if accounts > 0 {
            return Err(AccountGroupError::InUse(accounts));
        }

        account_groups::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn find_type(&self, id: Uuid) -> Result<account_types::Model, AccountGroupError> {
        account_types::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountGroupError::AccountTypeNotFound(id))
    }

    async fn ensure_code_free(
        &self,
        code: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), AccountGroupError> {
        let mut query =
            account_groups::Entity::find().filter(account_groups::Column::Code.eq(code));
        if let Some(id) = exclude {
            query = query.filter(account_groups::Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(AccountGroupError::DuplicateCode(code.to_string()));
        }
        Ok(())
    }
}
