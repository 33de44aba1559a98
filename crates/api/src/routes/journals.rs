//! Journal entry routes.
//!
//! Create, update and delete work on DRAFT entries only. Posting and
//! reversing are separate actions so the status change is explicit.

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, AppState, extract::IdPath, middleware::AuthUser};
use bukubesar_core::ledger::JournalEntryInput;
use bukubesar_db::{
    entities::{journal_entries, journal_entry_lines, sea_orm_active_enums::JournalStatus},
    repositories::{JournalFilter, JournalRepository, JournalWithLines, ReverseInput},
};
use bukubesar_shared::types::{PageRequest, PageResponse};

/// Creates the journal entry routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal-entries", get(list_journals).post(create_journal))
        .route(
            "/journal-entries/{id}",
            get(get_journal).put(update_journal).delete(delete_journal),
        )
        .route("/journal-entries/{id}/post", post(post_journal))
        .route("/journal-entries/{id}/reverse", post(reverse_journal))
}

/// Query parameters for listing journal entries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJournalsQuery {
    /// `DRAFT`, `POSTED` or `REVERSED`.
    pub status: Option<JournalStatus>,
    /// Entries dated on or after.
    pub date_from: Option<NaiveDate>,
    /// Entries dated on or before.
    pub date_to: Option<NaiveDate>,
    /// Entries of one fiscal period.
    pub period_id: Option<Uuid>,
    /// Text search on number, description or reference.
    pub search: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for reversing an entry.
#[derive(Debug, Default, Deserialize)]
pub struct ReverseRequest {
    /// Date of the reversing entry. Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Reason, appended to the reversal description.
    #[serde(default)]
    pub reason: Option<String>,
}

/// A journal entry with its lines.
#[derive(Debug, Serialize)]
pub struct JournalResponse {
    /// Header fields.
    #[serde(flatten)]
    pub entry: journal_entries::Model,
    /// Lines ordered by line number.
    pub lines: Vec<journal_entry_lines::Model>,
}

impl From<JournalWithLines> for JournalResponse {
    fn from(j: JournalWithLines) -> Self {
        Self {
            entry: j.entry,
            lines: j.lines,
        }
    }
}

/// Response for a reversal.
#[derive(Debug, Serialize)]
pub struct ReverseResponse {
    /// The original entry, now REVERSED.
    pub original: JournalResponse,
    /// The new POSTED reversing entry.
    pub reversal: JournalResponse,
}

/// GET `/journal-entries` - List entries, newest first.
async fn list_journals(
    State(state): State<AppState>,
    query: Result<Query<ListJournalsQuery>, QueryRejection>,
) -> Result<Json<PageResponse<journal_entries::Model>>, ApiError> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page.unwrap_or(1), query.per_page.unwrap_or(50));
    let filter = JournalFilter {
        status: query.status,
        date_from: query.date_from,
        date_to: query.date_to,
        fiscal_period_id: query.period_id,
        search: query.search,
    };

    let repo = JournalRepository::new((*state.db).clone());
    Ok(Json(repo.list(filter, page).await?))
}

async fn get_journal(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<JournalResponse>, ApiError> {
    let repo = JournalRepository::new((*state.db).clone());
    Ok(Json(repo.get(id).await?.into()))
}

/// POST `/journal-entries` - Create a DRAFT entry.
async fn create_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<JournalEntryInput>, JsonRejection>,
) -> Result<(StatusCode, Json<JournalResponse>), ApiError> {
    let Json(body) = body?;
    let values = json!(body);
    let user_id = auth.ensure_recorded(&state).await?;
    let repo = JournalRepository::new((*state.db).clone());

    let created = repo
        .create(body, user_id)
        .await
        .map_err(|e| ApiError::from(e).with_values(values))?;

    info!(
        journal_id = %created.entry.id,
        number = %created.entry.number,
        user_id = %user_id,
        "Journal entry created"
    );
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// PUT `/journal-entries/{id}` - Replace a DRAFT entry.
async fn update_journal(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    body: Result<Json<JournalEntryInput>, JsonRejection>,
) -> Result<Json<JournalResponse>, ApiError> {
    let Json(body) = body?;
    let values = json!(body);
    let repo = JournalRepository::new((*state.db).clone());

    let updated = repo
        .update(id, body)
        .await
        .map_err(|e| ApiError::from(e).with_values(values))?;
    Ok(Json(updated.into()))
}

async fn delete_journal(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let repo = JournalRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/journal-entries/{id}/post` - DRAFT to POSTED.
async fn post_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<JournalResponse>, ApiError> {
    let user_id = auth.ensure_recorded(&state).await?;
    let repo = JournalRepository::new((*state.db).clone());
    let posted = repo.post(id, user_id).await?;
    Ok(Json(posted.into()))
}

/// POST `/journal-entries/{id}/reverse` - POSTED to REVERSED, creating the offset entry.
async fn reverse_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    body: Option<Json<ReverseRequest>>,
) -> Result<Json<ReverseResponse>, ApiError> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let user_id = auth.ensure_recorded(&state).await?;
    let repo = JournalRepository::new((*state.db).clone());

    let (original, reversal) = repo
        .reverse(
            id,
            ReverseInput {
                date: request.date,
                reason: request.reason,
            },
            user_id,
        )
        .await?;

    Ok(Json(ReverseResponse {
        original: original.into(),
        reversal: reversal.into(),
    }))
}
