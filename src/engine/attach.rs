//! Attachment orchestration
//!
//! With a target advisory every viable build is attached and each outcome is
//! recorded; one failed build never stops the others. Refused credentials stop
//! the batch, but builds attached before that stay in the report. Without a
//! target the result is a preview and nothing remote is touched.

use super::model::{AdvisoryTarget, BuildRecord};
use super::viability::ViabilitySet;
use crate::clients::{AdvisoryService, AttachOutcome};
use crate::core::error::{RailError, RailResult, RemoteError, Service};
use serde::Serialize;

/// A build that could not be attached, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAttachment {
  pub build: BuildRecord,
  pub reason: String,
}

/// The build whose attachment was refused for credentials, ending the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbortedAttachment {
  pub build: BuildRecord,
  pub reason: String,
  #[serde(skip)]
  error: RemoteError,
}

/// Per-build results of attaching to an advisory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentReport {
  pub advisory: AdvisoryTarget,
  pub attached: Vec<BuildRecord>,
  pub failed: Vec<FailedAttachment>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub aborted: Option<AbortedAttachment>,
  /// Builds never tried because the batch was aborted
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub not_attempted: Vec<BuildRecord>,
}

impl AttachmentReport {
  pub fn is_success(&self) -> bool {
    self.failed.is_empty() && self.aborted.is_none()
  }
}

/// Builds that would be attached (dry run)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewReport {
  pub builds: ViabilitySet,
}

/// Outcome of the attachment stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ApplyReport {
  Attached(AttachmentReport),
  Preview(PreviewReport),
}

impl ApplyReport {
  /// Turn an aborted batch back into its remote error, and a report with
  /// failed attachments into `AttachmentPartialFailure`
  pub fn ensure_success(&self) -> RailResult<()> {
    match self {
      ApplyReport::Attached(AttachmentReport {
        aborted: Some(aborted), ..
      }) => Err(RailError::Remote(aborted.error.clone())),
      ApplyReport::Attached(report) if !report.is_success() => Err(RailError::AttachmentPartialFailure {
        advisory: report.advisory.0,
        attached: report.attached.len(),
        failed: report.failed.len(),
      }),
      _ => Ok(()),
    }
  }
}

/// Attach `set` to `target`, or preview it when there is no target
pub fn apply(advisories: &dyn AdvisoryService, set: &ViabilitySet, target: Option<AdvisoryTarget>) -> RailResult<ApplyReport> {
  let Some(target) = target else {
    return Ok(ApplyReport::Preview(PreviewReport { builds: set.clone() }));
  };

  if advisories.get_advisory(target.0)?.is_none() {
    return Err(RailError::Remote(RemoteError::NotFound {
      service: Service::Advisory,
      resource: format!("advisory {}", target),
    }));
  }

  let mut report = AttachmentReport {
    advisory: target,
    attached: Vec::new(),
    failed: Vec::new(),
    aborted: None,
    not_attempted: Vec::new(),
  };

  if set.is_empty() {
    return Ok(ApplyReport::Attached(report));
  }

  tracing::debug!(advisory = target.0, builds = ?set.nvrs().collect::<Vec<_>>(), "attaching builds");
  let outcomes = advisories.attach_builds(target.0, set.builds())?;
  let tried = outcomes.len();
  for (build, outcome) in outcomes {
    match outcome {
      AttachOutcome::Attached => report.attached.push(build),
      AttachOutcome::Failed { reason } => report.failed.push(FailedAttachment { build, reason }),
      AttachOutcome::Aborted { reason, error } => report.aborted = Some(AbortedAttachment { build, reason, error }),
    }
  }
  if report.aborted.is_some() {
    report.not_attempted = set.builds().iter().skip(tried).cloned().collect();
  }

  tracing::info!(
    advisory = target.0,
    attached = report.attached.len(),
    failed = report.failed.len(),
    "attachment finished"
  );
  Ok(ApplyReport::Attached(report))
}
