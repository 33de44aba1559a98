//! Account group routes.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, AppState, extract::IdPath};
use bukubesar_db::{
    entities::{
        account_groups,
        sea_orm_active_enums::{AccountCategory, NormalBalance},
    },
    repositories::{AccountGroupInput, AccountGroupRepository},
};

/// Creates the account group routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/account-groups", get(list_account_groups).post(create_account_group))
        .route(
            "/account-groups/{id}",
            get(get_account_group)
                .put(update_account_group)
                .delete(delete_account_group),
        )
}

/// Query parameters for listing groups.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGroupsQuery {
    /// Only groups of this account type.
    pub account_type_id: Option<Uuid>,
}

/// Request body for creating or replacing an account group.
#[derive(Debug, Deserialize, Serialize)]
pub struct AccountGroupRequest {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Owning account type.
    pub account_type_id: Uuid,
    /// Defaults to the account type's normal balance.
    #[serde(default)]
    pub normal_balance: Option<NormalBalance>,
    /// Report category (`current_asset`, `revenue`, ...).
    pub category: AccountCategory,
}

impl From<AccountGroupRequest> for AccountGroupInput {
    fn from(req: AccountGroupRequest) -> Self {
        Self {
            code: req.code.trim().to_string(),
            name: req.name.trim().to_string(),
            account_type_id: req.account_type_id,
            normal_balance: req.normal_balance,
            category: req.category,
        }
    }
}

async fn list_account_groups(
    State(state): State<AppState>,
    Query(query): Query<ListGroupsQuery>,
) -> Result<Json<Vec<account_groups::Model>>, ApiError> {
    let repo = AccountGroupRepository::new((*state.db).clone());
    Ok(Json(repo.list(query.account_type_id).await?))
}

async fn get_account_group(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<account_groups::Model>, ApiError> {
    let repo = AccountGroupRepository::new((*state.db).clone());
    Ok(Json(repo.get(id).await?))
}

async fn create_account_group(
    State(state): State<AppState>,
    body: Result<Json<AccountGroupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<account_groups::Model>), ApiError> {
    let Json(body) = body?;
    let values = json!(body);
    let repo = AccountGroupRepository::new((*state.db).clone());

    let created = repo
        .create(body.into())
        .await
        .map_err(|e| ApiError::from(e).with_values(values))?;

    info!(account_group_id = %created.id, code = %created.code, "Account group created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_account_group(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    body: Result<Json<AccountGroupRequest>, JsonRejection>,
) -> Result<Json<account_groups::Model>, ApiError> {
    let Json(body) = body?;
    let values = json!(body);
    let repo = AccountGroupRepository::new((*state.db).clone());

    let updated = repo
        .update(id, body.into())
        .await
        .map_err(|e| ApiError::from(e).with_values(values))?;
    Ok(Json(updated))
}

async fn delete_account_group(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let repo = AccountGroupRepository::new((*state.db).clone());
    repo.delete(id).await?;
    info!(account_group_id = %id, "Account group deleted");
    Ok(StatusCode::NO_CONTENT)
}
