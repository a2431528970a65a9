use chrono::NaiveDate;

use crate::leave::error::LeaveError;

/// Parses a `YYYY-MM-DD` value. Anything longer than 10 characters is
/// truncated to its first 10 first, so full timestamps like
/// `2026-01-05T00:00:00` are accepted.
pub fn parse_date(value: &str) -> Result<NaiveDate, LeaveError> {
    let s = value.trim();
    let s = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| LeaveError::InvalidDateFormat {
        given: value.to_string(),
    })
}

/// Day count of `[a, b]` with both endpoints included. Caller guarantees
/// `b >= a`.
pub fn inclusive_days(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days() + 1
}

/// Day count of the intersection of `[start, end]` with the calendar year
/// `year`, or 0 when they are disjoint.
pub fn year_overlap_days(start: NaiveDate, end: NaiveDate, year: i32) -> i64 {
    let (Some(year_start), Some(year_end)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return 0;
    };
    let s = start.max(year_start);
    let e = end.min(year_end);
    if e >= s { inclusive_days(s, e) } else { 0 }
}
