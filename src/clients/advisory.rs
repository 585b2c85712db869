//! HTTP client for the advisory service

use super::AdvisoryService;
use super::http::HttpSession;
use crate::core::error::{RailError, RailResult, RemoteError};
use crate::engine::model::{BuildKind, BuildRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Advisory states that no longer accept or hold builds for shipping
const CLOSED_STATES: &[&str] = &["SHIPPED_LIVE", "DROPPED_NO_SHIP"];

/// Brief view of an advisory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorySummary {
  pub id: u64,
  pub synopsis: String,
  #[serde(default)]
  pub kind: Option<BuildKind>,
  pub release_date: NaiveDate,
  pub state: String,
  #[serde(default)]
  pub url: Option<String>,
}

/// Why an advisory is being created; only affects its metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Impetus {
  Standard,
  Cve,
  Ga,
  Test,
}

/// Everything needed to create a new advisory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisoryDraft {
  pub kind: BuildKind,
  pub impetus: Impetus,
  pub synopsis: String,
  pub release_date: NaiveDate,
  pub series: String,
  pub assigned_to: String,
  pub manager: String,
  pub package_owner: String,
}

impl AdvisoryDraft {
  /// Synopsis boilerplate depends on the advisory kind
  pub fn synopsis_for(kind: BuildKind, series: &str) -> String {
    match kind {
      BuildKind::Rpm => format!("OpenShift Container Platform {} bug fix and enhancement update", series),
      BuildKind::Image => format!("OpenShift Container Platform {} images update", series),
    }
  }
}

/// Result of attaching one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum AttachOutcome {
  Attached,
  Failed {
    reason: String,
  },
  /// Credentials were refused; no later build in the batch was attempted
  Aborted {
    reason: String,
    #[serde(skip)]
    error: RemoteError,
  },
}

#[derive(Debug, Deserialize)]
struct BuildAdvisory {
  state: String,
}

#[derive(Debug, Serialize)]
struct AttachRequest<'a> {
  nvr: &'a str,
  product_version: &'a str,
}

/// Advisory service reached over its JSON API
#[derive(Clone)]
pub struct HttpAdvisoryService {
  session: HttpSession,
}

impl HttpAdvisoryService {
  pub fn new(session: HttpSession) -> Self {
    Self { session }
  }
}

/// Credential problems end the whole batch; anything else is per build
fn aborts_batch(err: &RemoteError) -> bool {
  matches!(err, RemoteError::Authentication { .. } | RemoteError::Authorization { .. })
}

impl AdvisoryService for HttpAdvisoryService {
  fn check_auth(&self) -> RailResult<()> {
    let _: serde_json::Value = self.session.get_json(&["api", "v1", "user"], &[])?;
    Ok(())
  }

  fn is_attached_to_open_advisory(&self, nvr: &str) -> RailResult<bool> {
    let advisories: Vec<BuildAdvisory> = self.session.get_json(&["api", "v1", "builds", nvr, "advisories"], &[])?;
    Ok(
      advisories
        .iter()
        .any(|a| !CLOSED_STATES.contains(&a.state.as_str())),
    )
  }

  fn get_advisory(&self, advisory_id: u64) -> RailResult<Option<AdvisorySummary>> {
    self
      .session
      .get_json_optional(&["api", "v1", "advisories", advisory_id.to_string().as_str()], &[])
  }

  fn attach_builds(&self, advisory_id: u64, builds: &[BuildRecord]) -> RailResult<Vec<(BuildRecord, AttachOutcome)>> {
    let id = advisory_id.to_string();
    let path = ["api", "v1", "advisories", id.as_str(), "builds"];
    let mut outcomes = Vec::with_capacity(builds.len());

    for build in builds {
      let request = AttachRequest {
        nvr: build.nvr(),
        product_version: build.product_version(),
      };

      let outcome = match self.session.post(&path, &request) {
        Ok(()) => AttachOutcome::Attached,
        Err(RailError::Remote(err)) if aborts_batch(&err) => {
          tracing::error!(advisory = advisory_id, nvr = build.nvr(), error = %err, "attach batch aborted");
          outcomes.push((
            build.clone(),
            AttachOutcome::Aborted {
              reason: err.to_string(),
              error: err,
            },
          ));
          break;
        }
        Err(err) => {
          tracing::warn!(advisory = advisory_id, nvr = build.nvr(), error = %err, "attach failed");
          AttachOutcome::Failed {
            reason: err.to_string(),
          }
        }
      };
      outcomes.push((build.clone(), outcome));
    }

    Ok(outcomes)
  }

  fn latest_advisory(&self, kind: BuildKind, series: &str) -> RailResult<Option<AdvisorySummary>> {
    let kind = kind.to_string();
    self.session.get_json_optional(
      &["api", "v1", "advisories", "latest"],
      &[("kind", kind.as_str()), ("series", series)],
    )
  }

  fn create_advisory(&self, draft: &AdvisoryDraft) -> RailResult<AdvisorySummary> {
    self.session.post_json(&["api", "v1", "advisories"], draft)
  }
}
