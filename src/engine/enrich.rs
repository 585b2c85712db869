//! Concurrent enrichment: candidate identifiers -> full build records
//!
//! Each candidate costs one build system call plus one advisory service
//! call. Records come back in no particular order; `viability::resolve`
//! imposes the order users see.

use super::model::{BuildCandidate, BuildRecord};
use super::pool::WorkerPool;
use crate::clients::{AdvisoryService, BuildSystem};
use crate::core::error::RailResult;
use crate::ui::progress::StageProgress;

/// Resolve every candidate to a `BuildRecord`, failing as a whole on any error
pub fn enrich(
  build_system: &dyn BuildSystem,
  advisories: &dyn AdvisoryService,
  pool: &WorkerPool,
  candidates: &[BuildCandidate],
  product_version: &str,
  progress: &StageProgress,
) -> RailResult<Vec<BuildRecord>> {
  tracing::debug!(candidates = candidates.len(), workers = pool.workers(), "enriching candidates");
  progress.stage(candidates.len(), "Fetching build metadata");

  pool.map(candidates, progress, |candidate| {
    enrich_one(build_system, advisories, candidate, product_version)
  })
}

fn enrich_one(
  build_system: &dyn BuildSystem,
  advisories: &dyn AdvisoryService,
  candidate: &BuildCandidate,
  product_version: &str,
) -> RailResult<BuildRecord> {
  let info = build_system.fetch_build(candidate.id(), product_version)?;
  let attached = advisories.is_attached_to_open_advisory(&info.nvr)?;
  Ok(BuildRecord::from_info(info, attached))
}
