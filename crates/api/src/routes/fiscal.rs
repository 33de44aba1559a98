//! Fiscal period routes.

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
use bukubesar_core::fiscal::PeriodRange;
use bukubesar_db::{
    entities::fiscal_periods,
    repositories::{BalanceRepository, FiscalRepository},
};
use bukubesar_shared::AppError;

/// Creates the fiscal routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fiscal-periods", get(list_periods).post(create_period))
        .route("/fiscal-periods/for-date", get(period_for_date))
        .route(
            "/fiscal-periods/{id}",
            get(get_period).put(update_period).delete(delete_period),
        )
        .route("/fiscal-periods/{id}/close", post(close_period))
        .route("/fiscal-periods/{id}/reopen", post(reopen_period))
        .route(
            "/fiscal-periods/{id}/account-balances/rebuild",
            post(rebuild_balances),
        )
}

/// Request body for creating or updating a fiscal period.
///
/// Either `start_date` + `end_date` or `year` + `month` describe the range.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PeriodRequest {
    /// Period name. Defaults to the month name on create.
    #[serde(default)]
    pub name: Option<String>,
    /// Start date (YYYY-MM-DD).
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// End date (YYYY-MM-DD).
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Calendar year, with `month`.
    #[serde(default)]
    pub year: Option<i32>,
    /// Calendar month 1-12, with `year`.
    #[serde(default)]
    pub month: Option<u32>,
}

impl PeriodRequest {
    /// Resolves the requested range, falling back to `current` when nothing is given.
    fn range(&self, current: Option<PeriodRange>) -> Result<PeriodRange, ApiError> {
        match (self.start_date, self.end_date, self.year, self.month) {
            (Some(start), Some(end), _, _) => Ok(PeriodRange::new(start, end)?),
            (None, None, Some(year), Some(month)) => Ok(PeriodRange::for_month(year, month)?),
            (None, None, None, None) => current.ok_or_else(|| missing_range().into()),
            _ => Err(missing_range().into()),
        }
    }
}

fn missing_range() -> AppError {
    AppError::validation(
        "MISSING_DATE_RANGE",
        "Provide start_date and end_date, or year and month",
    )
}

/// Query for the period containing a date.
#[derive(Debug, Deserialize)]
pub struct ForDateQuery {
    /// Date to look up (YYYY-MM-DD).
    pub date: NaiveDate,
}

/// Response for a balance rebuild.
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    /// Period ID.
    pub fiscal_period_id: Uuid,
    /// Period name.
    pub fiscal_period_name: String,
    /// Rows written to the snapshot.
    pub rows: usize,
}

async fn list_periods(
    State(state): State<AppState>,
) -> Result<Json<Vec<fiscal_periods::Model>>, ApiError> {
    let repo = FiscalRepository::new((*state.db).clone());
    Ok(Json(repo.list().await?))
}

async fn get_period(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<fiscal_periods::Model>, ApiError> {
    let repo = FiscalRepository::new((*state.db).clone());
    Ok(Json(repo.get(id).await?))
}

/// GET `/fiscal-periods/for-date?date=` - The period containing a date.
async fn period_for_date(
    State(state): State<AppState>,
    query: Result<Query<ForDateQuery>, QueryRejection>,
) -> Result<Json<fiscal_periods::Model>, ApiError> {
    let Query(query) = query?;
    let repo = FiscalRepository::new((*state.db).clone());
    repo.find_for_date(query.date).await?.map(Json).ok_or_else(|| {
        ApiError(AppError::not_found(
            "NO_FISCAL_PERIOD",
            format!("No fiscal period contains {}", query.date),
        ))
    })
}

async fn create_period(
    State(state): State<AppState>,
    body: Result<Json<PeriodRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<fiscal_periods::Model>), ApiError> {
    let Json(body) = body?;
    let values = json!(body);
    let repo = FiscalRepository::new((*state.db).clone());

    let created = async {
        let range = body.range(None)?;
        Ok::<_, ApiError>(repo.create(body.name.clone(), range).await?)
    }
    .await
    .map_err(|e| e.with_values(values))?;

    info!(
        period_id = %created.id,
        name = %created.name,
        start = %created.start_date,
        end = %created.end_date,
        "Fiscal period created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_period(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    body: Result<Json<PeriodRequest>, JsonRejection>,
) -> Result<Json<fiscal_periods::Model>, ApiError> {
    let Json(body) = body?;
    let values = json!(body);
    let repo = FiscalRepository::new((*state.db).clone());

    let updated = async {
        let existing = repo.get(id).await?;
        let current = PeriodRange::new(existing.start_date, existing.end_date)?;
        let range = body.range(Some(current))?;
        let name = body.name.clone().unwrap_or(existing.name);
        Ok::<_, ApiError>(repo.update(id, name, range).await?)
    }
    .await
    .map_err(|e| e.with_values(values))?;

    Ok(Json(updated))
}

async fn delete_period(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let repo = FiscalRepository::new((*state.db).clone());
    repo.delete(id).await?;
    info!(period_id = %id, "Fiscal period deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn close_period(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<fiscal_periods::Model>, ApiError> {
    let user_id = auth.ensure_recorded(&state).await?;
    let repo = FiscalRepository::new((*state.db).clone());
    let period = repo.close(id, user_id).await?;
    info!(period_id = %id, user_id = %user_id, "Fiscal period closed");
    Ok(Json(period))
}

async fn reopen_period(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<fiscal_periods::Model>, ApiError> {
    let repo = FiscalRepository::new((*state.db).clone());
    let period = repo.reopen(id).await?;
    info!(period_id = %id, user_id = %auth.user_id(), "Fiscal period reopened");
    Ok(Json(period))
}

/// POST `/fiscal-periods/{id}/account-balances/rebuild` - Recompute the snapshot.
async fn rebuild_balances(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<RebuildResponse>, ApiError> {
    let repo = BalanceRepository::new((*state.db).clone());
    let (period, rows) = repo.rebuild(id).await?;
    Ok(Json(RebuildResponse {
        fiscal_period_id: period.id,
        fiscal_period_name: period.name,
        rows,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_range_from_dates() {
        let req = PeriodRequest {
            start_date: Some(d(2024, 1, 1)),
            end_date: Some(d(2024, 1, 31)),
            ..PeriodRequest::default()
        };
        let range = req.range(None).unwrap();
        assert_eq!(range.end(), d(2024, 1, 31));
    }

    #[test]
    fn test_range_from_year_month() {
        let req = PeriodRequest {
            year: Some(2024),
            month: Some(2),
            ..PeriodRequest::default()
        };
        let range = req.range(None).unwrap();
        assert_eq!(range.start(), d(2024, 2, 1));
        assert_eq!(range.end(), d(2024, 2, 29));
    }

    #[test]
    fn test_range_rejects_partial_input() {
        let req = PeriodRequest {
            start_date: Some(d(2024, 1, 1)),
            ..PeriodRequest::default()
        };
        let err = req.range(None).unwrap_err();
        assert_eq!(err.0.error_code(), "MISSING_DATE_RANGE");
    }

    #[test]
    fn test_range_keeps_current_on_rename() {
        let current = PeriodRange::for_month(2024, 3).unwrap();
        let req = PeriodRequest {
            name: Some("Maret 2024".into()),
            ..PeriodRequest::default()
        };
        assert_eq!(req.range(Some(current)).unwrap(), current);
    }

    #[test]
    fn test_range_rejects_inverted_dates() {
        let req = PeriodRequest {
            start_date: Some(d(2024, 2, 1)),
            end_date: Some(d(2024, 1, 1)),
            ..PeriodRequest::default()
        };
        let err = req.range(None).unwrap_err();
        assert_eq!(err.0.error_code(), "INVALID_DATE_RANGE");
    }
}
