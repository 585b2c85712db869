//! Values passed between the resolution stages

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of build being shipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
  Rpm,
  Image,
}

impl fmt::Display for BuildKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildKind::Rpm => write!(f, "rpm"),
      BuildKind::Image => write!(f, "image"),
    }
  }
}

/// How the candidate set is produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryMode {
  /// Search the build system by tags
  Automatic(BuildKind),
  /// Operator-supplied NVRs or build ids, used verbatim
  Manual(Vec<String>),
}

/// A build identifier (NVR or numeric id) that has not been looked up yet
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildCandidate(String);

impl BuildCandidate {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn id(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for BuildCandidate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Raw build metadata as reported by the build system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
  pub id: u64,
  pub nvr: String,
  pub product_version: String,
  #[serde(default)]
  pub tags: BTreeSet<String>,
}

/// A build with everything needed to decide whether it can ship
///
/// Only the enrichment stage constructs these (see `BuildRecord::from_info`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRecord {
  nvr: String,
  build_id: u64,
  product_version: String,
  attached_to_open_advisory: bool,
  tags: BTreeSet<String>,
}

impl BuildRecord {
  pub(crate) fn from_info(info: BuildInfo, attached_to_open_advisory: bool) -> Self {
    Self {
      nvr: info.nvr,
      build_id: info.id,
      product_version: info.product_version,
      attached_to_open_advisory,
      tags: info.tags,
    }
  }

  pub fn nvr(&self) -> &str {
    &self.nvr
  }

  pub fn build_id(&self) -> u64 {
    self.build_id
  }

  pub fn product_version(&self) -> &str {
    &self.product_version
  }

  pub fn attached_to_open_advisory(&self) -> bool {
    self.attached_to_open_advisory
  }

  /// Package name: the NVR without its version and release fields
  pub fn package_name(&self) -> &str {
    package_name(&self.nvr)
  }
}

/// `megafrobber-1.0.1-2.el7` -> `megafrobber`
pub fn package_name(nvr: &str) -> &str {
  nvr
    .rsplitn(3, '-')
    .nth(2)
    .unwrap_or(nvr)
}

/// Advisory the resolved builds should be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdvisoryTarget(pub u64);

impl fmt::Display for AdvisoryTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
