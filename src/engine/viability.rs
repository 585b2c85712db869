//! Viability filter and reconciliation
//!
//! Rules, in order:
//! 1. automatic image mode: drop packages on the group's `non_release` list
//! 2. automatic rpm mode: drop builds attached to an open advisory
//! 3. deduplicate by NVR
//!
//! then sort ascending by NVR.

use super::model::{BuildKind, BuildRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Which exclusion rules apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveMode {
  /// Operator-supplied builds: dedup and sort only
  Manual,
  /// Tag-discovered rpms: attachment is re-checked
  AutomaticRpm,
  /// Tag-discovered images: non-release packages are excluded.
  ///
  /// Attachment is deliberately not re-checked here; image discovery relies
  /// on the shipped-tag difference alone. It is unclear whether that is
  /// sufficient, so the asymmetry with rpm mode is kept rather than unified.
  AutomaticImage { non_release: BTreeSet<String> },
}

impl ResolveMode {
  pub fn automatic(kind: BuildKind, non_release: &[String]) -> Self {
    match kind {
      BuildKind::Rpm => ResolveMode::AutomaticRpm,
      BuildKind::Image => ResolveMode::AutomaticImage {
        non_release: non_release.iter().cloned().collect(),
      },
    }
  }

  fn accepts(&self, record: &BuildRecord) -> bool {
    match self {
      ResolveMode::Manual => true,
      ResolveMode::AutomaticRpm => !record.attached_to_open_advisory(),
      ResolveMode::AutomaticImage { non_release } => !non_release.contains(record.package_name()),
    }
  }
}

/// Builds accepted for shipping: unique by NVR, sorted by NVR
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ViabilitySet {
  builds: Vec<BuildRecord>,
}

impl ViabilitySet {
  pub fn builds(&self) -> &[BuildRecord] {
    &self.builds
  }

  pub fn len(&self) -> usize {
    self.builds.len()
  }

  pub fn is_empty(&self) -> bool {
    self.builds.is_empty()
  }

  pub fn nvrs(&self) -> impl Iterator<Item = &str> {
    self.builds.iter().map(|b| b.nvr())
  }
}

/// Filter, deduplicate and order enriched records
///
/// Idempotent: resolving a set's own builds again yields the same set. When
/// the same NVR appears more than once the first occurrence is kept.
pub fn resolve(records: impl IntoIterator<Item = BuildRecord>, mode: &ResolveMode) -> ViabilitySet {
  let mut by_nvr: BTreeMap<String, BuildRecord> = BTreeMap::new();
  let mut excluded = 0usize;

  for record in records {
    if !mode.accepts(&record) {
      tracing::debug!(nvr = record.nvr(), ?mode, "excluded by viability rules");
      excluded += 1;
      continue;
    }
    by_nvr.entry(record.nvr().to_string()).or_insert(record);
  }

  tracing::debug!(accepted = by_nvr.len(), excluded, "resolved viability set");
  ViabilitySet {
    builds: by_nvr.into_values().collect(),
  }
}
