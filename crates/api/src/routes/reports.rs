//! Report routes.
//!
//! `GET /reports/{kind}` returns JSON, `GET /reports/{kind}/export` the same
//! report as a file. Both share the query parameters:
//! `startDate`, `endDate`, `periodId`, `journalType`, `compareWithPrevious`,
//! `showPercentages`, `accountId` and `format`.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{ApiError, AppState};
use bukubesar_core::balance::{BalanceAggregator, JournalTypeFilter, PostedLine};
use bukubesar_core::export::{ExportFile, ExportFormat, csv};
use bukubesar_core::fiscal::{FiscalPeriod, PeriodRange};
use bukubesar_core::reports::{
    AccountBalanceReport, BalanceSheetReport, GlDetailReport, GlSummaryReport, ProfitLossOptions,
    ProfitLossReport, RangeQuery, ReportContext, ReportError, ReportService, TrialBalanceReport,
    resolve_range,
};
use bukubesar_db::repositories::ReportRepository;
use bukubesar_shared::AppError;

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/{kind}", get(get_report))
        .route("/reports/{kind}/export", get(export_report))
}

/// Report selected by the path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// `trial-balance`
    TrialBalance,
    /// `profit-loss`
    ProfitLoss,
    /// `balance-sheet`
    BalanceSheet,
    /// `gl-detail`
    GlDetail,
    /// `gl-summary`
    GlSummary,
    /// `account-balance`
    AccountBalance,
}

/// Query parameters shared by every report.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// First day, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Last day, inclusive.
    pub end_date: Option<NaiveDate>,
    /// Fiscal period to report on.
    pub period_id: Option<Uuid>,
    /// `all`, `commitment`, `breakdown`, `net` or `paired`.
    pub journal_type: Option<String>,
    /// Add the preceding range as comparison columns.
    #[serde(default)]
    pub compare_with_previous: bool,
    /// Add percent-of-revenue columns (profit & loss).
    #[serde(default)]
    pub show_percentages: bool,
    /// Single account (general ledger detail).
    pub account_id: Option<Uuid>,
    /// Export format: `csv` (default), `pdf`, `xlsx`.
    pub format: Option<String>,
}

impl ReportQuery {
    fn range_query(&self) -> RangeQuery {
        RangeQuery {
            start_date: self.start_date,
            end_date: self.end_date,
            period_id: self.period_id,
        }
    }

    fn journal_type(&self) -> Result<JournalTypeFilter, ReportError> {
        self.journal_type.as_deref().unwrap_or_default().parse()
    }

    fn export_format(&self) -> Result<ExportFormat, ReportError> {
        self.format
            .as_deref()
            .unwrap_or_default()
            .parse::<ExportFormat>()?
            .ensure_supported()
    }
}

/// Any generated report.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// Trial balance.
    TrialBalance(TrialBalanceReport),
    /// Profit & loss.
    ProfitLoss(ProfitLossReport),
    /// Balance sheet.
    BalanceSheet(BalanceSheetReport),
    /// General ledger detail.
    GlDetail(GlDetailReport),
    /// General ledger summary.
    GlSummary(GlSummaryReport),
    /// Precomputed balances with reconciliation.
    AccountBalance(AccountBalanceReport),
}

impl Report {
    fn to_csv(&self) -> Result<ExportFile, ReportError> {
        match self {
            Self::TrialBalance(r) => csv::trial_balance(r),
            Self::ProfitLoss(r) => csv::profit_loss(r),
            Self::BalanceSheet(r) => csv::balance_sheet(r),
            Self::GlDetail(r) => csv::gl_detail(r),
            Self::GlSummary(r) => csv::gl_summary(r),
            Self::AccountBalance(r) => csv::account_balance(r),
        }
    }
}

fn report_kind(path: Result<Path<ReportKind>, PathRejection>) -> Result<ReportKind, ApiError> {
    path.map(|Path(kind)| kind).map_err(|_| {
        ApiError(AppError::not_found(
            "REPORT_NOT_FOUND",
            "Unknown report; expected trial-balance, profit-loss, balance-sheet, gl-detail, gl-summary or account-balance",
        ))
    })
}

/// GET `/reports/{kind}`
async fn get_report(
    State(state): State<AppState>,
    path: Result<Path<ReportKind>, PathRejection>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<Report>, ApiError> {
    let kind = report_kind(path)?;
    let Query(query) = query?;
    Ok(Json(build_report(&state, kind, &query).await?))
}

/// GET `/reports/{kind}/export`
async fn export_report(
    State(state): State<AppState>,
    path: Result<Path<ReportKind>, PathRejection>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let kind = report_kind(path)?;
    let Query(query) = query?;
    let format = query.export_format()?;

    let report = build_report(&state, kind, &query).await?;
    let file = report.to_csv()?;
    debug!(filename = %file.filename, bytes = file.body.len(), format = %format, "Report exported");

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.body,
    )
        .into_response())
}

async fn build_report(
    state: &AppState,
    kind: ReportKind,
    query: &ReportQuery,
) -> Result<Report, ApiError> {
    let journal_type = query.journal_type()?;
    let repo = ReportRepository::new((*state.db).clone());
    let today = Utc::now().date_naive();

    if kind == ReportKind::AccountBalance {
        return account_balance_report(state, &repo, query, today).await;
    }

    let period = match query.period_id {
        Some(id) => repo.find_period(id).await?,
        None => None,
    };
    let current = if query.start_date.is_none() && query.end_date.is_none() && query.period_id.is_none() {
        repo.period_for_date(today).await?
    } else {
        None
    };
    let range = resolve_range(&query.range_query(), period.as_ref(), current.as_ref(), today)?;
    let ctx = ReportContext {
        company_name: state.reports.company_name.clone(),
        currency: state.reports.currency.clone(),
        range,
        journal_type,
    };

    let comparison = comparison(kind, query, &range)?;
    let requested = query.account_id.filter(|_| kind == ReportKind::GlDetail);
    let (accounts, lines) = repo.dataset(range.end(), requested).await?;

    let report = match kind {
        ReportKind::TrialBalance => {
            let balances =
                BalanceAggregator::period_balances(&accounts, &lines, &range, journal_type);
            Report::TrialBalance(ReportService::trial_balance(&ctx, balances))
        }
        ReportKind::ProfitLoss => {
            let current =
                BalanceAggregator::period_balances(&accounts, &lines, &range, journal_type);
            let previous = match comparison {
                Some(Comparison::Range(previous_range)) => Some((
                    previous_range,
                    BalanceAggregator::period_balances(
                        &accounts,
                        &lines,
                        &previous_range,
                        journal_type,
                    ),
                )),
                _ => None,
            };
            let options = ProfitLossOptions {
                compare_with_previous: query.compare_with_previous,
                show_percentages: query.show_percentages,
            };
            Report::ProfitLoss(ReportService::profit_loss(
                &ctx,
                &current,
                previous.as_ref().map(|(r, rows)| (*r, rows.as_slice())),
                options,
            ))
        }
        ReportKind::BalanceSheet => {
            let current = BalanceAggregator::aggregate(&accounts, &lines, journal_type);
            let previous = match comparison {
                Some(Comparison::AsOf(previous_as_of)) => {
                    let earlier: Vec<PostedLine> = lines
                        .iter()
                        .filter(|l| l.entry_date <= previous_as_of)
                        .cloned()
                        .collect();
                    Some((
                        previous_as_of,
                        BalanceAggregator::aggregate(&accounts, &earlier, journal_type),
                    ))
                }
                _ => None,
            };
            Report::BalanceSheet(ReportService::balance_sheet(
                &ctx,
                &current,
                previous.as_ref().map(|(d, rows)| (*d, rows.as_slice())),
            ))
        }
        ReportKind::GlDetail => Report::GlDetail(ReportService::gl_detail(
            &ctx,
            &accounts,
            &lines,
            query.account_id,
        )?),
        ReportKind::GlSummary => {
            let balances =
                BalanceAggregator::period_balances(&accounts, &lines, &range, journal_type);
            Report::GlSummary(ReportService::gl_summary(&ctx, balances))
        }
        ReportKind::AccountBalance => {
            return account_balance_report(state, &repo, query, today).await;
        }
    };

    Ok(report)
}

/// What `compareWithPrevious` compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    /// Equal-length range before the report range (profit & loss).
    Range(PeriodRange),
    /// Balances as of the day before the range (balance sheet).
    AsOf(NaiveDate),
}

/// Resolves the comparison before any data is loaded.
fn comparison(
    kind: ReportKind,
    query: &ReportQuery,
    range: &PeriodRange,
) -> Result<Option<Comparison>, ReportError> {
    if !query.compare_with_previous {
        return Ok(None);
    }
    let missing = || ReportError::NoPrecedingRange(range.start());
    match kind {
        ReportKind::ProfitLoss => range
            .preceding()
            .map(|r| Some(Comparison::Range(r)))
            .ok_or_else(missing),
        ReportKind::BalanceSheet => range
            .day_before()
            .map(|d| Some(Comparison::AsOf(d)))
            .ok_or_else(missing),
        _ => Ok(None),
    }
}

/// Stored snapshot of one period next to live aggregation.
///
/// The period comes from `periodId`, or the period containing today.
async fn account_balance_report(
    state: &AppState,
    repo: &ReportRepository,
    query: &ReportQuery,
    today: NaiveDate,
) -> Result<Report, ApiError> {
    let period: FiscalPeriod = match query.period_id {
        Some(id) => repo
            .find_period(id)
            .await?
            .ok_or(ReportError::FiscalPeriodNotFound(id))?,
        None => repo
            .period_for_date(today)
            .await?
            .ok_or(ReportError::NoFiscalPeriod(today))?,
    };
    let range = resolve_range(&RangeQuery::default(), None, Some(&period), today)?;
    let ctx = ReportContext {
        company_name: state.reports.company_name.clone(),
        currency: state.reports.currency.clone(),
        range,
        journal_type: JournalTypeFilter::All,
    };

    let (accounts, lines) = repo.dataset(range.end(), None).await?;
    let live = BalanceAggregator::period_balances(&accounts, &lines, &range, JournalTypeFilter::All);
    let stored = repo.stored_balances(period.id).await?;

    Ok(Report::AccountBalance(ReportService::account_balance(
        &ctx, &period, stored, live,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_type_parsing() {
        let query = ReportQuery {
            journal_type: Some("net".into()),
            ..ReportQuery::default()
        };
        assert_eq!(query.journal_type().unwrap(), JournalTypeFilter::Net);
        assert_eq!(
            ReportQuery::default().journal_type().unwrap(),
            JournalTypeFilter::All
        );

        let query = ReportQuery {
            journal_type: Some("weekly".into()),
            ..ReportQuery::default()
        };
        assert!(matches!(
            query.journal_type(),
            Err(ReportError::InvalidJournalType(_))
        ));
    }

    #[test]
    fn test_export_format_defaults_to_csv() {
        assert_eq!(
            ReportQuery::default().export_format().unwrap(),
            ExportFormat::Csv
        );

        let query = ReportQuery {
            format: Some("xlsx".into()),
            ..ReportQuery::default()
        };
        assert!(matches!(
            query.export_format(),
            Err(ReportError::UnsupportedExportFormat(_))
        ));
    }

    #[test]
    fn test_comparison_only_when_requested() {
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let earliest = PeriodRange::new(NaiveDate::MIN, end).unwrap();
        let plain = ReportQuery::default();
        assert_eq!(comparison(ReportKind::ProfitLoss, &plain, &earliest).unwrap(), None);
        assert_eq!(comparison(ReportKind::BalanceSheet, &plain, &earliest).unwrap(), None);

        let compared = ReportQuery {
            compare_with_previous: true,
            ..ReportQuery::default()
        };
        assert!(matches!(
            comparison(ReportKind::ProfitLoss, &compared, &earliest),
            Err(ReportError::NoPrecedingRange(_))
        ));
        assert!(matches!(
            comparison(ReportKind::BalanceSheet, &compared, &earliest),
            Err(ReportError::NoPrecedingRange(_))
        ));

        let jan = PeriodRange::for_month(2024, 1).unwrap();
        assert_eq!(
            comparison(ReportKind::BalanceSheet, &compared, &jan).unwrap(),
            Some(Comparison::AsOf(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()))
        );
        assert_eq!(comparison(ReportKind::TrialBalance, &compared, &jan).unwrap(), None);
    }

    #[test]
    fn test_report_kind_from_path_segment() {
        let kind: ReportKind = serde_json::from_str("\"gl-summary\"").unwrap();
        assert_eq!(kind, ReportKind::GlSummary);
        assert!(serde_json::from_str::<ReportKind>("\"cash-flow\"").is_err());
    }
}
