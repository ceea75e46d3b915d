//! Calendar-month query windows.
//!
//! The client's planner selects one calendar month; list queries filter on
//! the inclusive `[first day, last day]` window derived here. When a list
//! request names no window, the current month is used.

use chrono::{Datelike, NaiveDate};

use crate::calendar::add_months;
use crate::transaction::DomainError;

/// An inclusive date window covering one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerWindow {
    /// First day of the month.
    pub start: NaiveDate,
    /// Last day of the month.
    pub end: NaiveDate,
}

impl PlannerWindow {
    /// Returns true if the date falls inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Builds the window for a given year and month number (1..=12).
///
/// # Errors
///
/// Returns `DomainError::MonthOutOfRange` for month numbers outside
/// `1..=12`, and `DomainError::DateOverflow` at the calendar limits.
pub fn month_window(year: i32, month: u32) -> Result<PlannerWindow, DomainError> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::MonthOutOfRange(month));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(DomainError::DateOverflow)?;
    let end = add_months(start, 1)?
        .pred_opt()
        .ok_or(DomainError::DateOverflow)?;
    Ok(PlannerWindow { start, end })
}

/// The window of the month containing `today`.
///
/// # Errors
///
/// Returns `DomainError::DateOverflow` at the calendar limits.
pub fn current_month_window(today: NaiveDate) -> Result<PlannerWindow, DomainError> {
    month_window(today.year(), today.month())
}
