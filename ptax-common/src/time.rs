//! Timestamp utilities

use chrono::{DateTime, Months, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Calendar date `months` months before `date`
///
/// Day-of-month is clamped to the target month's length (e.g. Aug 31 minus
/// six months is Feb 28/29). Saturates at `NaiveDate::MIN`.
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}
