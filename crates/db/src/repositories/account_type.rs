//! Account type repository.

use bukubesar_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::is_unique_violation;
use crate::entities::{account_groups, account_types, sea_orm_active_enums::NormalBalance};

/// Error types for account type operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountTypeError {
    /// Account type not found.
    #[error("Account type not found: {0}")]
    NotFound(Uuid),

    /// Code already taken.
    #[error("Account type code '{0}' already exists")]
    DuplicateCode(String),

    /// Groups still reference the type.
    #[error("Cannot delete account type: {0} account groups reference it")]
    InUse(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountTypeError> for AppError {
    fn from(err: AccountTypeError) -> Self {
        let message = err.to_string();
        match err {
            AccountTypeError::NotFound(_) => Self::not_found("ACCOUNT_TYPE_NOT_FOUND", message),
            AccountTypeError::DuplicateCode(_) => Self::conflict("DUPLICATE_CODE", message),
            AccountTypeError::InUse(_) => Self::conflict("ACCOUNT_TYPE_IN_USE", message),
            AccountTypeError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or replacing an account type.
#[derive(Debug, Clone)]
pub struct AccountTypeInput {
    /// Unique code, e.g. `ASSET`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
}

/// Account type repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountTypeRepository {
    db: DatabaseConnection,
}

impl AccountTypeRepository {
    /// Creates a new account type repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists account types ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<account_types::Model>, AccountTypeError> {
        Ok(account_types::Entity::find()
            .order_by_asc(account_types::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Finds an account type by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the type does not exist.
    pub async fn get(&self, id: Uuid) -> Result<account_types::Model, AccountTypeError> {
        account_types::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountTypeError::NotFound(id))
    }

    /// Creates an account type.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` if the code is taken.
    pub async fn create(
        &self,
        input: AccountTypeInput,
    ) -> Result<account_types::Model, AccountTypeError> {
        self.ensure_code_free(&input.code, None).await?;

        let now = chrono::Utc::now().into();
        let model = account_types::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code.clone()),
            name: Set(input.name),
            normal_balance: Set(input.normal_balance),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AccountTypeError::DuplicateCode(input.code)
            } else {
                e.into()
            }
        })
    }

    /// Replaces an account type's fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `DuplicateCode`.
    pub async fn update(
        &self,
        id: Uuid,
        input: AccountTypeInput,
    ) -> Result<account_types::Model, AccountTypeError> {
        let existing = self.get(id).await?;
        if existing.code != input.code {
            self.ensure_code_free(&input.code, Some(id)).await?;
        }

        let mut active: account_types::ActiveModel = existing.into();
        active.code = Set(input.code);
        active.name = Set(input.name);
        active.normal_balance = Set(input.normal_balance);
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes an account type that no group references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InUse`.
    pub async fn delete(&self, id: Uuid) -> Result<(), AccountTypeError> {
        self.get(id).await?;

        let groups = account_groups::Entity::find()
            .filter(account_groups::Column::AccountTypeId.eq(id))
            .count(&self.db)
            .await?;
        if groups > 0 {
            return Err(AccountTypeError::InUse(groups));
        }

        account_types::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn ensure_code_free(
        &self,
        code: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), AccountTypeError> {
        let mut query = account_types::Entity::find().filter(account_types::Column::Code.eq(code));
        if let Some(id) = exclude {
            query = query.filter(account_types::Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(AccountTypeError::DuplicateCode(code.to_string()));
        }
        Ok(())
    }
}
