//! Coverage period arithmetic.

use chrono::{Months, NaiveDate};

use portal_core::{PortalError, PortalResult};

/// End of coverage: `start + months` in calendar months.
///
/// When the start day does not exist in the target month the result is the
/// last day of that month (Jan 31 + 1 month = Feb 29 in a leap year).
pub fn coverage_end(start: NaiveDate, months: u32) -> PortalResult<NaiveDate> {
    if months == 0 {
        return Err(PortalError::validation(
            "duration_months",
            "Duration must be at least one month",
        ));
    }
    start
        .checked_add_months(Months::new(months))
        .ok_or_else(|| PortalError::validation("start_date", "Coverage period is out of range"))
}

/// Reject start dates before `today`.
pub fn check_start_date(start: NaiveDate, today: NaiveDate) -> PortalResult<()> {
    if start < today {
        return Err(PortalError::validation(
            "start_date",
            "Start date cannot be in the past",
        ));
    }
    Ok(())
}
