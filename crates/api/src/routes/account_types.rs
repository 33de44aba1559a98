//! Account type routes.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{ApiError, AppState, extract::IdPath, middleware::AuthUser};
use bukubesar_db::{
    entities::{account_types, sea_orm_active_enums::NormalBalance},
    repositories::{AccountTypeInput, AccountTypeRepository},
};

/// Creates the account type routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/account-types", get(list_account_types).post(create_account_type))
        .route(
            "/account-types/{id}",
            get(get_account_type)
                .put(update_account_type)
                .delete(delete_account_type),
        )
}

/// Request body for creating or replacing an account type.
#[derive(Debug, Deserialize, Serialize)]
pub struct AccountTypeRequest {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// `DEBIT` or `CREDIT`.
    pub normal_balance: NormalBalance,
}

impl From<AccountTypeRequest> for AccountTypeInput {
    fn from(req: AccountTypeRequest) -> Self {
        Self {
            code: req.code.trim().to_string(),
            name: req.name.trim().to_string(),
            normal_balance: req.normal_balance,
        }
    }
}

async fn list_account_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<account_types::Model>>, ApiError> {
    let repo = AccountTypeRepository::new((*state.db).clone());
    Ok(Json(repo.list().await?))
}

async fn get_account_type(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<account_types::Model>, ApiError> {
    let repo = AccountTypeRepository::new((*state.db).clone());
    Ok(Json(repo.get(id).await?))
}

async fn create_account_type(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<AccountTypeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<account_types::Model>), ApiError> {
    let Json(body) = body?;
    let values = json!(body);
    let repo = AccountTypeRepository::new((*state.db).clone());

    let created = repo
        .create(body.into())
        .await
        .map_err(|e| ApiError::from(e).with_values(values))?;

    info!(account_type_id = %created.id, code = %created.code, user_id = %auth.user_id(), "Account type created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_account_type(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    body: Result<Json<AccountTypeRequest>, JsonRejection>,
) -> Result<Json<account_types::Model>, ApiError> {
    let Json(body) = body?;
    let values = json!(body);
    let repo = AccountTypeRepository::new((*state.db).clone());

    let updated = repo
        .update(id, body.into())
        .await
        .map_err(|e| ApiError::from(e).with_values(values))?;
    Ok(Json(updated))
}

async fn delete_account_type(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let repo = AccountTypeRepository::new((*state.db).clone());
    repo.delete(id).await?;
    info!(account_type_id = %id, "Account type deleted");
    Ok(StatusCode::NO_CONTENT)
}
