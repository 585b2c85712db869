//! Input validation at the CLI boundary

use crate::core::error::{RailError, RailResult};
use chrono::NaiveDate;
use regex::Regex;

const EMAIL_PATTERN: &str = r"^[^@ ]+@[^@ ]+\.[^@ ]+$";

/// Check an email address, naming the offending flag on failure
pub fn validate_email(flag: &str, value: &str) -> RailResult<String> {
  if Regex::new(EMAIL_PATTERN)?.is_match(value) {
    return Ok(value.to_string());
  }
  Err(RailError::with_help(
    format!("Invalid email address for --{}: '{}'", flag, value),
    "Use a full address such as jdoe@example.com",
  ))
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_release_date(value: &str) -> RailResult<NaiveDate> {
  NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
    RailError::with_help(
      format!("Invalid date '{}'", value),
      "Dates use the YYYY-MM-DD format, e.g. 2018-03-06",
    )
  })
}
