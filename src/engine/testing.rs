//! In-memory service fakes for engine tests

use super::model::{BuildInfo, BuildKind, BuildRecord};
use crate::clients::{AdvisoryDraft, AdvisoryService, AdvisorySummary, AttachOutcome, BuildSystem};
use crate::core::error::{RailError, RailResult, RemoteError, Service};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const PRODUCT_VERSION: &str = "PV";

/// Enriched record without going through a build system
pub fn record(nvr: &str, attached: bool) -> BuildRecord {
  let info = BuildInfo {
    id: 1,
    nvr: nvr.to_string(),
    product_version: PRODUCT_VERSION.to_string(),
    tags: BTreeSet::new(),
  };
  BuildRecord::from_info(info, attached)
}

fn unavailable(service: Service, reason: &str) -> RailError {
  RailError::Remote(RemoteError::Unavailable {
    service,
    status: Some(503),
    reason: reason.to_string(),
  })
}

#[derive(Default)]
pub struct FakeBuildSystem {
  tags: HashMap<String, Vec<String>>,
  failing_tags: HashSet<String>,
  latest: HashMap<(String, String), String>,
  builds: HashMap<String, BuildInfo>,
}

impl FakeBuildSystem {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn tag(mut self, tag: &str, nvrs: &[&str]) -> Self {
    self
      .tags
      .insert(tag.to_string(), nvrs.iter().map(|n| n.to_string()).collect());
    self
  }

  pub fn failing_tag(mut self, tag: &str) -> Self {
    self.failing_tags.insert(tag.to_string());
    self
  }

  pub fn latest(mut self, tag: &str, package: &str, nvr: &str) -> Self {
    self
      .latest
      .insert((tag.to_string(), package.to_string()), nvr.to_string());
    self
  }

  pub fn build(mut self, nvr: &str, id: u64) -> Self {
    self.builds.insert(
      nvr.to_string(),
      BuildInfo {
        id,
        nvr: nvr.to_string(),
        product_version: PRODUCT_VERSION.to_string(),
        tags: BTreeSet::new(),
      },
    );
    self
  }
}

impl BuildSystem for FakeBuildSystem {
  fn list_builds_by_tag(&self, tag: &str, _product_version: &str) -> RailResult<Vec<String>> {
    if self.failing_tags.contains(tag) {
      return Err(unavailable(Service::BuildSystem, "tag listing failed"));
    }
    Ok(self.tags.get(tag).cloned().unwrap_or_default())
  }

  fn latest_tagged_build(&self, tag: &str, package: &str) -> RailResult<Option<String>> {
    if self.failing_tags.contains(tag) {
      return Err(unavailable(Service::BuildSystem, "latest lookup failed"));
    }
    Ok(self.latest.get(&(tag.to_string(), package.to_string())).cloned())
  }

  fn fetch_build(&self, id_or_nvr: &str, _product_version: &str) -> RailResult<BuildInfo> {
    let found = self.builds.get(id_or_nvr).or_else(|| {
      let id: u64 = id_or_nvr.parse().ok()?;
      self.builds.values().find(|b| b.id == id)
    });

    found.cloned().ok_or_else(|| {
      RailError::Remote(RemoteError::NotFound {
        service: Service::BuildSystem,
        resource: format!("build {}", id_or_nvr),
      })
    })
  }
}

#[derive(Default)]
pub struct FakeAdvisoryService {
  attached: HashSet<String>,
  unauthenticated: bool,
  advisories: HashMap<u64, AdvisorySummary>,
  rejecting: HashSet<String>,
  forbidding: HashSet<String>,
  latest: Option<AdvisorySummary>,
  created: Mutex<Vec<AdvisoryDraft>>,
  attach_calls: AtomicUsize,
}

impl FakeAdvisoryService {
  pub fn new() -> Self {
    Self::default()
  }

  /// NVRs already attached to some open advisory
  pub fn attached(mut self, nvrs: &[&str]) -> Self {
    self.attached.extend(nvrs.iter().map(|n| n.to_string()));
    self
  }

  pub fn unauthenticated(mut self) -> Self {
    self.unauthenticated = true;
    self
  }

  /// An existing open advisory with this id
  pub fn advisory(mut self, id: u64) -> Self {
    self.advisories.insert(id, summary(id, BuildKind::Rpm, date(2018, 3, 6)));
    self
  }

  /// NVRs the service refuses to attach
  pub fn rejecting(mut self, nvrs: &[&str]) -> Self {
    self.rejecting.extend(nvrs.iter().map(|n| n.to_string()));
    self
  }

  /// NVRs whose attachment is refused with 403, ending the batch
  pub fn forbidding(mut self, nvrs: &[&str]) -> Self {
    self.forbidding.extend(nvrs.iter().map(|n| n.to_string()));
    self
  }

  pub fn with_latest(mut self, latest: AdvisorySummary) -> Self {
    self.latest = Some(latest);
    self
  }

  pub fn attach_calls(&self) -> usize {
    self.attach_calls.load(Ordering::SeqCst)
  }

  pub fn created(&self) -> Vec<AdvisoryDraft> {
    self.created.lock().unwrap().clone()
  }

  fn authenticated(&self) -> RailResult<()> {
    if self.unauthenticated {
      return Err(RailError::Remote(RemoteError::Authentication {
        service: Service::Advisory,
      }));
    }
    Ok(())
  }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn summary(id: u64, kind: BuildKind, release_date: NaiveDate) -> AdvisorySummary {
  AdvisorySummary {
    id,
    synopsis: format!("advisory {}", id),
    kind: Some(kind),
    release_date,
    state: "NEW_FILES".to_string(),
    url: None,
  }
}

impl AdvisoryService for FakeAdvisoryService {
  fn check_auth(&self) -> RailResult<()> {
    self.authenticated()
  }

  fn is_attached_to_open_advisory(&self, nvr: &str) -> RailResult<bool> {
    self.authenticated()?;
    Ok(self.attached.contains(nvr))
  }

  fn get_advisory(&self, advisory_id: u64) -> RailResult<Option<AdvisorySummary>> {
    self.authenticated()?;
    Ok(self.advisories.get(&advisory_id).cloned())
  }

  fn attach_builds(&self, _advisory_id: u64, builds: &[BuildRecord]) -> RailResult<Vec<(BuildRecord, AttachOutcome)>> {
    self.authenticated()?;
    self.attach_calls.fetch_add(1, Ordering::SeqCst);
    let mut outcomes = Vec::new();
    for build in builds {
      if self.forbidding.contains(build.nvr()) {
        let error = RemoteError::Authorization {
          service: Service::Advisory,
          detail: "not allowed".to_string(),
        };
        outcomes.push((
          build.clone(),
          AttachOutcome::Aborted {
            reason: error.to_string(),
            error,
          },
        ));
        break;
      }

      let outcome = if self.rejecting.contains(build.nvr()) {
        AttachOutcome::Failed {
          reason: "rejected".to_string(),
        }
      } else {
        AttachOutcome::Attached
      };
      outcomes.push((build.clone(), outcome));
    }
    Ok(outcomes)
  }

  fn latest_advisory(&self, _kind: BuildKind, _series: &str) -> RailResult<Option<AdvisorySummary>> {
    self.authenticated()?;
    Ok(self.latest.clone())
  }

  fn create_advisory(&self, draft: &AdvisoryDraft) -> RailResult<AdvisorySummary> {
    self.authenticated()?;
    self.created.lock().unwrap().push(draft.clone());
    Ok(summary(900_001, draft.kind, draft.release_date))
  }
}
