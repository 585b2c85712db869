//! `release-date`: next release date after a given one

use crate::core::error::RailResult;
use crate::release::next_release_date;
use crate::utils::parse_release_date;

pub fn run_release_date(previous: &str, json: bool) -> RailResult<()> {
  let previous = parse_release_date(previous)?;
  let next = next_release_date(previous);

  if json {
    let value = serde_json::json!({
      "previous": previous,
      "next": next,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
  } else {
    println!("{}", next);
  }
  Ok(())
}
