//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, AppState, extract::IdPath, middleware::AuthUser};
use bukubesar_db::{
    entities::{chart_of_accounts, sea_orm_active_enums::NormalBalance},
    repositories::{AccountFilter, AccountInput, AccountRepository},
};
use bukubesar_shared::types::{PageRequest, PageResponse};

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{id}",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/accounts/{id}/lock", post(lock_account))
        .route("/accounts/{id}/unlock", post(unlock_account))
}

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsQuery {
    /// Filter by group.
    pub account_group_id: Option<Uuid>,
    /// Filter by active status.
    pub active: Option<bool>,
    /// Text search on code or name.
    pub search: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for creating or replacing an account.
#[derive(Debug, Deserialize, Serialize)]
pub struct AccountRequest {
    /// Account code (must be unique).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account description.
    #[serde(default)]
    pub description: Option<String>,
    /// Parent account ID for the hierarchy.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Owning account group.
    pub account_group_id: Uuid,
    /// Defaults to the group's normal balance.
    #[serde(default)]
    pub normal_balance: Option<NormalBalance>,
    /// Whether the account is active (default: true).
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<AccountRequest> for AccountInput {
    fn from(req: AccountRequest) -> Self {
        Self {
            code: req.code.trim().to_string(),
            name: req.name.trim().to_string(),
            description: req
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            parent_id: req.parent_id,
            account_group_id: req.account_group_id,
            normal_balance: req.normal_balance,
            is_active: req.is_active.unwrap_or(true),
        }
    }
}

/// GET `/accounts` - List accounts, ordered by code.
async fn list_accounts(
    State(state): State<AppState>,
    query: Result<Query<ListAccountsQuery>, QueryRejection>,
) -> Result<Json<PageResponse<chart_of_accounts::Model>>, ApiError> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page.unwrap_or(1), query.per_page.unwrap_or(50));
    let filter = AccountFilter {
        account_group_id: query.account_group_id,
        is_active: query.active,
        search: query.search,
    };

    let repo = AccountRepository::new((*state.db).clone());
    Ok(Json(repo.list(filter, page).await?))
}

async fn get_account(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<chart_of_accounts::Model>, ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    Ok(Json(repo.get(id).await?))
}

async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<AccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<chart_of_accounts::Model>), ApiError> {
    let Json(body) = body?;
    let values = json!(body);
    let repo = AccountRepository::new((*state.db).clone());

    let account = repo
        .create(body.into())
        .await
        .map_err(|e| ApiError::from(e).with_values(values))?;

    info!(
        account_id = %account.id,
        code = %account.code,
        user_id = %auth.user_id(),
        "Account created"
    );
    Ok((StatusCode::CREATED, Json(account)))
}

async fn update_account(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    body: Result<Json<AccountRequest>, JsonRejection>,
) -> Result<Json<chart_of_accounts::Model>, ApiError> {
    let Json(body) = body?;
    let values = json!(body);
    let repo = AccountRepository::new((*state.db).clone());

    let account = repo
        .update(id, body.into())
        .await
        .map_err(|e| ApiError::from(e).with_values(values))?;
    Ok(Json(account))
}

async fn delete_account(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    repo.delete(id).await?;
    info!(account_id = %id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn lock_account(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<chart_of_accounts::Model>, ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    let account = repo.set_locked(id, true).await?;
    info!(account_id = %id, user_id = %auth.user_id(), "Account locked");
    Ok(Json(account))
}

async fn unlock_account(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<chart_of_accounts::Model>, ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    let account = repo.set_locked(id, false).await?;
    info!(account_id = %id, user_id = %auth.user_id(), "Account unlocked");
    Ok(Json(account))
}
