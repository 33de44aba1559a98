//! Fiscal period rules.
//!
//! Periods are inclusive date ranges that never intersect. Two ranges
//! `a` and `b` intersect when `a.start <= b.end && b.start <= a.end`.

use chrono::{Days, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::FiscalPeriodError;

/// Inclusive date range, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl PeriodRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// `InvalidDateRange` when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FiscalPeriodError> {
        if start > end {
            return Err(FiscalPeriodError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First to last day of a calendar month.
    ///
    /// # Errors
    ///
    /// `InvalidMonth` when the pair does not name a month.
    pub fn for_month(year: i32, month: u32) -> Result<Self, FiscalPeriodError> {
        let invalid = || FiscalPeriodError::InvalidMonth { year, month };
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        Ok(Self {
            start,
            end: next - Duration::days(1),
        })
    }

    /// First day.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns true if `date` is inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns true if the ranges share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        date_ranges_overlap(self.start, self.end, other.start, other.end)
    }

    /// Number of days, inclusive.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The day before the range starts, `None` at the start of the calendar.
    #[must_use]
    pub fn day_before(&self) -> Option<NaiveDate> {
        self.start.pred_opt()
    }

    /// The range of equal length ending the day before this one starts.
    ///
    /// `None` when that range would begin before the first representable date.
    #[must_use]
    pub fn preceding(&self) -> Option<Self> {
        let end = self.day_before()?;
        let span = u64::try_from(self.days() - 1).ok()?;
        let start = end.checked_sub_days(Days::new(span))?;
        Some(Self { start, end })
    }
}

/// Inclusive interval intersection test.
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// A fiscal period as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: Uuid,
    /// Period name (e.g., "January 2024").
    pub name: String,
    /// Start date of the period.
    pub start_date: NaiveDate,
    /// End date of the period.
    pub end_date: NaiveDate,
    /// Whether the period is closed.
    pub is_closed: bool,
}

/// Finds a period in `existing` that intersects `candidate`.
///
/// `exclude` is the period being edited; it is never compared with itself.
#[must_use]
pub fn find_overlap<'a>(
    candidate: &PeriodRange,
    existing: &'a [FiscalPeriod],
    exclude: Option<Uuid>,
) -> Option<&'a FiscalPeriod> {
    existing.iter().find(|p| {
        Some(p.id) != exclude
            && date_ranges_overlap(candidate.start, candidate.end, p.start_date, p.end_date)
    })
}

/// Validates a create/update request against the other periods.
///
/// # Errors
///
/// `MissingName` or `Overlap`.
pub fn validate_period(
    name: &str,
    range: &PeriodRange,
    existing: &[FiscalPeriod],
    exclude: Option<Uuid>,
) -> Result<(), FiscalPeriodError> {
    if name.trim().is_empty() {
        return Err(FiscalPeriodError::MissingName);
    }
    if let Some(clash) = find_overlap(range, existing, exclude) {
        return Err(FiscalPeriodError::Overlap(clash.name.clone()));
    }
    Ok(())
}

/// Default display name for a monthly period, e.g. "January 2024".
#[must_use]
pub fn month_name(range: &PeriodRange) -> String {
    range.start.format("%B %Y").to_string()
}

/// A period can be closed once it holds no drafts.
///
/// # Errors
///
/// `AlreadyClosed` or `HasDraftEntries`.
pub fn ensure_can_close(period: &FiscalPeriod, draft_count: u64) -> Result<(), FiscalPeriodError> {
    if period.is_closed {
        return Err(FiscalPeriodError::AlreadyClosed);
    }
    if draft_count > 0 {
        return Err(FiscalPeriodError::HasDraftEntries(draft_count));
    }
    Ok(())
}

/// A period's dates can move while it is open and keeps every entry it holds.
///
/// `outside_count` is the number of the period's entries dated outside `range`.
///
/// # Errors
///
/// `ClosedPeriodDates` or `EntriesOutsideRange`.
pub fn ensure_can_move(
    period: &FiscalPeriod,
    range: &PeriodRange,
    outside_count: u64,
) -> Result<(), FiscalPeriodError> {
    if period.start_date == range.start && period.end_date == range.end {
        return Ok(());
    }
    if period.is_closed {
        return Err(FiscalPeriodError::ClosedPeriodDates);
    }
    if outside_count > 0 {
        return Err(FiscalPeriodError::EntriesOutsideRange(outside_count));
    }
    Ok(())
}

/// A period can be deleted while no journal entry references it.
///
/// # Errors
///
/// `HasJournalEntries`.
pub fn ensure_can_delete(journal_count: u64) -> Result<(), FiscalPeriodError> {
    if journal_count > 0 {
        return Err(FiscalPeriodError::HasJournalEntries(journal_count));
    }
    Ok(())
}
