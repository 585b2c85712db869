//! Candidate discovery: which builds might be shippable
//!
//! A candidate carries the stream's candidate tag but not its shipped tag.
//! Any build system failure aborts discovery; no partial candidate set is
//! ever returned.

use super::model::BuildCandidate;
use super::pool::WorkerPool;
use crate::clients::BuildSystem;
use crate::core::error::RailResult;
use crate::ui::progress::StageProgress;
use std::collections::HashSet;

/// Builds tagged `candidate_tag` minus builds tagged `shipped_tag`
pub fn discover_candidates(
  build_system: &dyn BuildSystem,
  candidate_tag: &str,
  shipped_tag: &str,
  product_version: &str,
) -> RailResult<Vec<BuildCandidate>> {
  let candidates = build_system.list_builds_by_tag(candidate_tag, product_version)?;
  let shipped: HashSet<String> = build_system
    .list_builds_by_tag(shipped_tag, product_version)?
    .into_iter()
    .collect();

  let unshipped = tag_difference(candidates, &shipped);
  tracing::info!(%candidate_tag, %shipped_tag, candidates = unshipped.len(), "discovered unshipped builds");
  Ok(unshipped)
}

/// Latest candidate-tagged build of each image component, minus shipped builds
///
/// Components with no candidate-tagged build are skipped.
pub fn discover_image_candidates(
  build_system: &dyn BuildSystem,
  pool: &WorkerPool,
  images: &[String],
  candidate_tag: &str,
  shipped_tag: &str,
  product_version: &str,
  progress: &StageProgress,
) -> RailResult<Vec<BuildCandidate>> {
  progress.stage(images.len(), "Looking up latest image builds");
  let latest = pool.map(images, progress, |image| {
    build_system.latest_tagged_build(candidate_tag, image)
  })?;

  for (image, nvr) in images.iter().zip(&latest) {
    if nvr.is_none() {
      tracing::warn!(%image, %candidate_tag, "no tagged build for image component");
    }
  }

  let shipped: HashSet<String> = build_system
    .list_builds_by_tag(shipped_tag, product_version)?
    .into_iter()
    .collect();

  let unshipped = tag_difference(latest.into_iter().flatten().collect(), &shipped);
  tracing::info!(images = images.len(), candidates = unshipped.len(), "discovered unshipped image builds");
  Ok(unshipped)
}

/// Manual override: the identifiers become the candidate set verbatim
pub fn manual_candidates(identifiers: &[String]) -> Vec<BuildCandidate> {
  identifiers.iter().map(BuildCandidate::new).collect()
}

/// Set difference by identifier, keeping first-seen order and dropping duplicates
fn tag_difference(candidates: Vec<String>, shipped: &HashSet<String>) -> Vec<BuildCandidate> {
  let mut seen = HashSet::new();
  candidates
    .into_iter()
    .filter(|id| !shipped.contains(id) && seen.insert(id.clone()))
    .map(BuildCandidate::new)
    .collect()
}
