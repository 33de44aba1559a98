//! Automatic journal numbers: `JU/{YYYYMM}/{seq:04}`.

use chrono::{Datelike, NaiveDate};

/// Prefix of generated journal numbers.
pub const JOURNAL_PREFIX: &str = "JU";

/// The `JU/YYYYMM/` prefix shared by every generated number in the month of `date`.
#[must_use]
pub fn month_prefix(date: NaiveDate) -> String {
    format!("{JOURNAL_PREFIX}/{:04}{:02}/", date.year(), date.month())
}

/// Next free number in the month of `date`.
///
/// `existing` are numbers already starting with [`month_prefix`]. Tails that
/// are not plain integers (reversals, hand-typed numbers) are ignored.
#[must_use]
pub fn next_number<'a>(date: NaiveDate, existing: impl IntoIterator<Item = &'a str>) -> String {
    let prefix = month_prefix(date);
    let last = existing
        .into_iter()
        .filter_map(|n| n.strip_prefix(&prefix))
        .filter_map(|tail| tail.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{:04}", last.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_first_number_of_month() {
        assert_eq!(next_number(jan(), []), "JU/202401/0001");
    }

    #[test]
    fn test_increments_highest() {
        assert_eq!(
            next_number(jan(), ["JU/202401/0003", "JU/202401/0041", "JU/202401/0007"]),
            "JU/202401/0042"
        );
        assert_eq!(next_number(jan(), ["JU/202401/9999"]), "JU/202401/10000");
    }

    #[test]
    fn test_ignores_reversals_and_other_months() {
        assert_eq!(
            next_number(jan(), ["JU/202312/0041", "JU/202401/0002-R", "JU/202401/0002"]),
            "JU/202401/0003"
        );
    }
}
