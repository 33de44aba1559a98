//! User repository.
//!
//! Users are owned by the identity provider. A row is created the first
//! time a token subject writes something, so audit columns can reference it.

use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::users;

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Inserts the user if missing. Existing rows are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn ensure(
        &self,
        id: Uuid,
        email: Option<String>,
        full_name: Option<String>,
    ) -> Result<(), DbErr> {
        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(id),
            email: Set(email),
            full_name: Set(full_name.unwrap_or_else(|| id.to_string())),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        users::Entity::insert(user)
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .do_nothing()
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
