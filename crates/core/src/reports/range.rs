//! Report date-range resolution.
//!
//! Precedence: explicit dates, then `periodId`, then the period containing
//! today. A lone start date runs to the end of its month; a lone end date
//! starts at the first of its month.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ReportError;
use crate::fiscal::{FiscalPeriod, FiscalPeriodError, PeriodRange};

/// Range-related query parameters shared by every report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    /// First day, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Last day, inclusive.
    pub end_date: Option<NaiveDate>,
    /// Fiscal period to report on.
    pub period_id: Option<Uuid>,
}

/// Resolves the reporting range.
///
/// `period` is the lookup result for `query.period_id`; `current` is the
/// period containing `today`.
///
/// # Errors
///
/// - `FiscalPeriodNotFound` when `period_id` is set but `period` is `None`
/// - `NoFiscalPeriod` when nothing else applies and `current` is `None`
/// - `InvalidDateRange` when start is after end
pub fn resolve_range(
    query: &RangeQuery,
    period: Option<&FiscalPeriod>,
    current: Option<&FiscalPeriod>,
    today: NaiveDate,
) -> Result<PeriodRange, ReportError> {
    let (start, end) = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, last_of_month(start)),
        (None, Some(end)) => (first_of_month(end), end),
        (None, None) => {
            let chosen = match query.period_id {
                Some(id) => period.ok_or(ReportError::FiscalPeriodNotFound(id))?,
                None => current.ok_or(ReportError::NoFiscalPeriod(today))?,
            };
            (chosen.start_date, chosen.end_date)
        }
    };

    PeriodRange::new(start, end).map_err(|e| match e {
        FiscalPeriodError::InvalidDateRange { start, end } => {
            ReportError::InvalidDateRange { start, end }
        }
        _ => ReportError::InvalidDateRange { start, end },
    })
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    PeriodRange::for_month(date.year(), date.month()).map_or(date, |r| r.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn jan() -> FiscalPeriod {
        FiscalPeriod {
            id: Uuid::new_v4(),
            name: "January 2024".into(),
            start_date: d(2024, 1, 1),
            end_date: d(2024, 1, 31),
            is_closed: false,
        }
    }

    #[test]
    fn test_explicit_dates_win() {
        let query = RangeQuery {
            start_date: Some(d(2024, 3, 1)),
            end_date: Some(d(2024, 3, 15)),
            period_id: Some(Uuid::new_v4()),
        };
        let range = resolve_range(&query, None, None, d(2024, 6, 1)).unwrap();
        assert_eq!(range.start(), d(2024, 3, 1));
        assert_eq!(range.end(), d(2024, 3, 15));
    }

    #[test]
    fn test_period_id() {
        let period = jan();
        let query = RangeQuery {
            period_id: Some(period.id),
            ..RangeQuery::default()
        };
        let range = resolve_range(&query, Some(&period), None, d(2024, 6, 1)).unwrap();
        assert_eq!(range.end(), d(2024, 1, 31));
    }

    #[test]
    fn test_unknown_period_id() {
        let id = Uuid::new_v4();
        let query = RangeQuery {
            period_id: Some(id),
            ..RangeQuery::default()
        };
        assert!(matches!(
            resolve_range(&query, None, Some(&jan()), d(2024, 1, 5)),
            Err(ReportError::FiscalPeriodNotFound(got)) if got == id
        ));
    }

    #[test]
    fn test_falls_back_to_current_period() {
        let range = resolve_range(&RangeQuery::default(), None, Some(&jan()), d(2024, 1, 5)).unwrap();
        assert_eq!(range.start(), d(2024, 1, 1));

        assert!(matches!(
            resolve_range(&RangeQuery::default(), None, None, d(2024, 1, 5)),
            Err(ReportError::NoFiscalPeriod(_))
        ));
    }

    #[test]
    fn test_single_date_expands_to_month() {
        let query = RangeQuery {
            start_date: Some(d(2024, 2, 10)),
            ..RangeQuery::default()
        };
        let range = resolve_range(&query, None, None, d(2024, 6, 1)).unwrap();
        assert_eq!(range.end(), d(2024, 2, 29));

        let query = RangeQuery {
            end_date: Some(d(2024, 2, 10)),
            ..RangeQuery::default()
        };
        let range = resolve_range(&query, None, None, d(2024, 6, 1)).unwrap();
        assert_eq!(range.start(), d(2024, 2, 1));
    }

    #[test]
    fn test_inverted_range() {
        let query = RangeQuery {
            start_date: Some(d(2024, 2, 10)),
            end_date: Some(d(2024, 2, 1)),
            period_id: None,
        };
        assert!(matches!(
            resolve_range(&query, None, None, d(2024, 6, 1)),
            Err(ReportError::InvalidDateRange { .. })
        ));
    }
}
