//! HTTP client for the tag-based build system

use super::BuildSystem;
use super::http::HttpSession;
use crate::core::error::{RailError, RailResult, RemoteError};
use crate::engine::model::BuildInfo;
use serde::Deserialize;

/// Build system reached over its JSON API
#[derive(Clone)]
pub struct HttpBuildSystem {
  session: HttpSession,
}

#[derive(Debug, Deserialize)]
struct TaggedBuild {
  nvr: String,
}

impl HttpBuildSystem {
  pub fn new(session: HttpSession) -> Self {
    Self { session }
  }
}

impl BuildSystem for HttpBuildSystem {
  fn list_builds_by_tag(&self, tag: &str, product_version: &str) -> RailResult<Vec<String>> {
    let builds: Vec<String> = self
      .session
      .get_json(&["api", "v1", "tags", tag, "builds"], &[("product_version", product_version)])?;
    tracing::debug!(%tag, count = builds.len(), "listed tagged builds");
    Ok(builds)
  }

  fn latest_tagged_build(&self, tag: &str, package: &str) -> RailResult<Option<String>> {
    let latest: Option<TaggedBuild> = self
      .session
      .get_json_optional(&["api", "v1", "tags", tag, "packages", package, "latest"], &[])?;
    Ok(latest.map(|b| b.nvr))
  }

  fn fetch_build(&self, id_or_nvr: &str, product_version: &str) -> RailResult<BuildInfo> {
    self
      .session
      .get_json(&["api", "v1", "builds", id_or_nvr], &[("product_version", product_version)])
      .map_err(|err| match err {
        // Name the build instead of the URL path; manual entries are reported back verbatim.
        RailError::Remote(RemoteError::NotFound { service, .. }) => RailError::Remote(RemoteError::NotFound {
          service,
          resource: format!("build {}", id_or_nvr),
        }),
        other => other,
      })
  }
}
