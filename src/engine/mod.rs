//! Build viability resolution
//!
//! A run flows through four stages:
//!
//! - **discovery**: candidate identifiers from tags, or the operator's list
//! - **enrich**: concurrent metadata and attachment lookups per candidate
//! - **viability**: exclusion rules, dedup, ordering
//! - **attach**: attach to a target advisory, or preview
//!
//! Discovery and enrichment fail as a whole; attachment reports per build.

pub mod attach;
pub mod discovery;
pub mod enrich;
pub mod model;
pub mod pool;
pub mod viability;

#[cfg(test)]
pub(crate) mod testing;

use crate::clients::{AdvisoryService, BuildSystem};
use crate::core::config::StreamTags;
use crate::core::error::RailResult;
use crate::ui::progress::StageProgress;
use model::{BuildKind, DiscoveryMode};
use pool::WorkerPool;
use viability::{ResolveMode, ViabilitySet};

/// Discovery, enrichment and viability against one pair of services
pub struct ResolutionEngine<'a> {
  build_system: &'a dyn BuildSystem,
  advisories: &'a dyn AdvisoryService,
  pool: WorkerPool,
}

impl<'a> ResolutionEngine<'a> {
  pub fn new(build_system: &'a dyn BuildSystem, advisories: &'a dyn AdvisoryService, pool: WorkerPool) -> Self {
    Self {
      build_system,
      advisories,
      pool,
    }
  }

  pub fn advisories(&self) -> &'a dyn AdvisoryService {
    self.advisories
  }

  /// Produce the viability set for `mode`
  ///
  /// `non_release` applies to automatic image runs; `images` lists the image
  /// components searched in that mode.
  pub fn find_viable_builds(
    &self,
    tags: &StreamTags,
    mode: &DiscoveryMode,
    non_release: &[String],
    images: &[String],
    progress: &StageProgress,
  ) -> RailResult<ViabilitySet> {
    let (candidates, resolve_mode) = match mode {
      DiscoveryMode::Manual(ids) => (discovery::manual_candidates(ids), ResolveMode::Manual),
      DiscoveryMode::Automatic(BuildKind::Rpm) => (
        discovery::discover_candidates(
          self.build_system,
          &tags.candidate_tag,
          &tags.shipped_tag,
          &tags.product_version,
        )?,
        ResolveMode::automatic(BuildKind::Rpm, non_release),
      ),
      DiscoveryMode::Automatic(BuildKind::Image) => (
        discovery::discover_image_candidates(
          self.build_system,
          &self.pool,
          images,
          &tags.candidate_tag,
          &tags.shipped_tag,
          &tags.product_version,
          progress,
        )?,
        ResolveMode::automatic(BuildKind::Image, non_release),
      ),
    };

    if candidates.is_empty() {
      tracing::info!("no candidate builds");
      return Ok(ViabilitySet::default());
    }

    let records = enrich::enrich(
      self.build_system,
      self.advisories,
      &self.pool,
      &candidates,
      &tags.product_version,
      progress,
    )?;

    Ok(viability::resolve(records, &resolve_mode))
  }
}
