//! Release date calculator
//!
//! Releases go out on a three-week cadence and always on a Tuesday. When the
//! cadence lands on another weekday the date moves back to the Tuesday before
//! it, never forward.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Days between consecutive releases
pub const RELEASE_CADENCE_DAYS: i64 = 21;

/// Release date that follows `previous`
pub fn next_release_date(previous: NaiveDate) -> NaiveDate {
  let target = previous + Duration::days(RELEASE_CADENCE_DAYS);
  let since_tuesday = (target.weekday().num_days_from_sunday() + 7 - Weekday::Tue.num_days_from_sunday()) % 7;
  target - Duration::days(i64::from(since_tuesday))
}
