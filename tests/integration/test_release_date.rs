//! Integration tests for `advisory-rail release-date`

use crate::helpers::{TestWorkspace, run_advisory_rail, run_advisory_rail_raw};
use anyhow::Result;

#[test]
fn test_release_date_moves_back_to_tuesday() -> Result<()> {
  let ws = TestWorkspace::empty()?;

  let output = run_advisory_rail(&ws.path, &["release-date", "2024-01-01"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "2024-01-16");

  Ok(())
}

#[test]
fn test_release_date_needs_no_config() -> Result<()> {
  let ws = TestWorkspace::empty()?;

  let output = run_advisory_rail(&ws.path, &["release-date", "2018-03-06", "--json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(json["previous"], "2018-03-06");
  assert_eq!(json["next"], "2018-03-27");

  Ok(())
}

#[test]
fn test_release_date_rejects_bad_format() -> Result<()> {
  let ws = TestWorkspace::empty()?;

  let output = run_advisory_rail_raw(&ws.path, &["release-date", "03/06/2018"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid date"));

  Ok(())
}
