//! Clients for the two remote collaborators
//!
//! - **build_system**: tag queries and build metadata
//! - **advisory**: attachment checks, attaching builds, advisory lookup/creation
//! - **http**: the shared blocking HTTP session both clients sit on
//! - **retry**: bounded retry with backoff around every request
//!
//! The resolution engine only sees the `BuildSystem` and `AdvisoryService`
//! traits, so tests swap in in-memory fakes.

pub mod advisory;
pub mod build_system;
pub mod http;
pub mod retry;

pub use advisory::{AdvisoryDraft, AdvisorySummary, AttachOutcome, HttpAdvisoryService, Impetus};
pub use build_system::HttpBuildSystem;

use crate::core::error::RailResult;
use crate::engine::model::{BuildInfo, BuildKind, BuildRecord};

/// Tag-based build system
pub trait BuildSystem: Send + Sync {
  /// Identifiers (NVRs) of every build currently carrying `tag`
  fn list_builds_by_tag(&self, tag: &str, product_version: &str) -> RailResult<Vec<String>>;

  /// NVR of the newest build of `package` carrying `tag`, if any
  fn latest_tagged_build(&self, tag: &str, package: &str) -> RailResult<Option<String>>;

  /// Full metadata for an NVR or numeric build id
  fn fetch_build(&self, id_or_nvr: &str, product_version: &str) -> RailResult<BuildInfo>;
}

/// Advisory (errata) service
pub trait AdvisoryService: Send + Sync {
  /// Cheap authenticated call; fails with `Authentication` when credentials are bad
  fn check_auth(&self) -> RailResult<()>;

  /// Whether the build is attached to any advisory that has not shipped or been dropped
  fn is_attached_to_open_advisory(&self, nvr: &str) -> RailResult<bool>;

  fn get_advisory(&self, advisory_id: u64) -> RailResult<Option<AdvisorySummary>>;

  /// Attach each build, reporting per-build outcomes.
  ///
  /// An authentication or authorization failure is recorded as `Aborted`
  /// against that build and ends the batch; later builds are left out of the
  /// result. Any other failure is recorded against the build and the
  /// remaining builds are still attempted.
  fn attach_builds(&self, advisory_id: u64, builds: &[BuildRecord]) -> RailResult<Vec<(BuildRecord, AttachOutcome)>>;

  /// Most recently released advisory of `kind` in an `X.Y` series
  fn latest_advisory(&self, kind: BuildKind, series: &str) -> RailResult<Option<AdvisorySummary>>;

  fn create_advisory(&self, draft: &AdvisoryDraft) -> RailResult<AdvisorySummary>;
}
