//! Calendar-aware date arithmetic.
//!
//! Month and year steps clamp to the end of the target month, so a
//! schedule anchored on Jan 31 lands on Feb 29 (leap) or Feb 28, never on
//! an invalid date or in March.

use chrono::{Days, Months, NaiveDate};

use crate::transaction::DomainError;

/// Adds whole months, clamping the day to the end of the target month.
///
/// # Errors
///
/// Returns `DomainError::DateOverflow` if the result leaves the supported
/// calendar range.
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, DomainError> {
    date.checked_add_months(Months::new(months))
        .ok_or(DomainError::DateOverflow)
}

/// Adds whole weeks.
///
/// # Errors
///
/// Returns `DomainError::DateOverflow` if the result leaves the supported
/// calendar range.
pub fn add_weeks(date: NaiveDate, weeks: u64) -> Result<NaiveDate, DomainError> {
    date.checked_add_days(Days::new(weeks * 7))
        .ok_or(DomainError::DateOverflow)
}

/// Adds whole years, clamping Feb 29 to Feb 28 on non-leap years.
///
/// # Errors
///
/// Returns `DomainError::DateOverflow` if the result leaves the supported
/// calendar range.
pub fn add_years(date: NaiveDate, years: u32) -> Result<NaiveDate, DomainError> {
    add_months(date, years * 12)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months_plain() {
        assert_eq!(add_months(date(2024, 1, 10), 1).unwrap(), date(2024, 2, 10));
        assert_eq!(add_months(date(2024, 1, 10), 9).unwrap(), date(2024, 10, 10));
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        // Leap year: Jan 31 + 1 month = Feb 29.
        assert_eq!(add_months(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        // Non-leap year: Feb 28.
        assert_eq!(add_months(date(2023, 1, 31), 1).unwrap(), date(2023, 2, 28));
        // 30-day months clamp too.
        assert_eq!(add_months(date(2024, 3, 31), 1).unwrap(), date(2024, 4, 30));
    }

    #[test]
    fn test_add_months_across_year_boundary() {
        assert_eq!(add_months(date(2024, 11, 15), 3).unwrap(), date(2025, 2, 15));
    }

    #[test]
    fn test_add_weeks() {
        assert_eq!(add_weeks(date(2024, 2, 26), 1).unwrap(), date(2024, 3, 4));
    }

    #[test]
    fn test_add_years_clamps_leap_day() {
        assert_eq!(add_years(date(2024, 2, 29), 1).unwrap(), date(2025, 2, 28));
        assert_eq!(add_years(date(2024, 2, 29), 4).unwrap(), date(2028, 2, 29));
    }
}
