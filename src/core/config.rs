use crate::core::error::{ConfigError, RailError, RailResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for advisory-rail
/// Searched in order: advisory-rail.toml, .advisory-rail.toml, .config/advisory-rail.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailConfig {
  pub group: GroupConfig,
  pub services: ServicesConfig,
  #[serde(default)]
  pub retry: RetryConfig,
}

/// The product group being released (e.g. `openshift-3.9`)
///
/// # Example
///
/// ```toml
/// [group]
/// name = "openshift-3.9"
/// branch = "rhaos-3.9-rhel-7"
/// non_release = ["openshift-enterprise-base"]
/// images = ["openshift-enterprise-docker", "openshift-enterprise-base"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
  pub name: String,

  /// Branch in the `rhaos-X.Y-rhel-N` form; tags and product version derive from it
  pub branch: String,

  /// Package names never shipped in an image advisory
  #[serde(default)]
  pub non_release: Vec<String>,

  /// Image components considered during automatic image discovery
  #[serde(default)]
  pub images: Vec<String>,

  /// Override for the candidate tag (default: `<branch>-candidate`)
  #[serde(default)]
  pub candidate_tag: Option<String>,

  /// Override for the shipped tag (default: `<branch>`)
  #[serde(default)]
  pub shipped_tag: Option<String>,

  /// Override for the product version (default: `RHEL-<N>-OSE-X.Y`)
  #[serde(default)]
  pub product_version: Option<String>,
}

/// Release stream parsed out of a `rhaos-X.Y-rhel-N` branch name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseStream {
  pub major: u32,
  pub minor: u32,
  pub rhel: u32,
}

impl ReleaseStream {
  /// Parse `rhaos-3.9-rhel-7` into 3 / 9 / 7
  pub fn parse(branch: &str) -> RailResult<Self> {
    let invalid = |reason: &str| {
      RailError::Config(ConfigError::Invalid {
        field: "group.branch".to_string(),
        reason: format!("'{}' {} (expected rhaos-X.Y-rhel-N)", branch, reason),
      })
    };

    let parts: Vec<&str> = branch.split('-').collect();
    if parts.len() != 4 || parts[2] != "rhel" {
      return Err(invalid("is not a release branch"));
    }

    let (major, minor) = parts[1].split_once('.').ok_or_else(|| invalid("has no X.Y version"))?;
    let major = major.parse().map_err(|_| invalid("has a non-numeric major version"))?;
    let minor = minor.parse().map_err(|_| invalid("has a non-numeric minor version"))?;
    let rhel = parts[3].parse().map_err(|_| invalid("has a non-numeric RHEL version"))?;

    Ok(Self { major, minor, rhel })
  }

  /// `X.Y`, used to look up advisories in the same series
  pub fn series(&self) -> String {
    format!("{}.{}", self.major, self.minor)
  }
}

/// Tags and product version one invocation works against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTags {
  pub candidate_tag: String,
  pub shipped_tag: String,
  pub product_version: String,
}

impl GroupConfig {
  /// Parsed release stream
  pub fn stream(&self) -> RailResult<ReleaseStream> {
    ReleaseStream::parse(&self.branch)
  }

  /// Resolve tags and product version, honouring overrides
  pub fn tags(&self) -> RailResult<StreamTags> {
    let product_version = match &self.product_version {
      Some(pv) => pv.clone(),
      None => {
        let stream = self.stream()?;
        format!("RHEL-{}-OSE-{}.{}", stream.rhel, stream.major, stream.minor)
      }
    };

    Ok(StreamTags {
      candidate_tag: self
        .candidate_tag
        .clone()
        .unwrap_or_else(|| format!("{}-candidate", self.branch)),
      shipped_tag: self.shipped_tag.clone().unwrap_or_else(|| self.branch.clone()),
      product_version,
    })
  }

  /// Validate group configuration
  pub fn validate(&self) -> RailResult<()> {
    if self.name.trim().is_empty() {
      return Err(RailError::Config(ConfigError::MissingField {
        field: "group.name".to_string(),
      }));
    }

    // Overrides make the branch format irrelevant for tags, but the series
    // (used for release dates) still comes from it.
    self.stream()?;
    Ok(())
  }
}

/// Remote service endpoints and client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
  /// Base URL of the build system API
  pub build_system_url: String,

  /// Base URL of the advisory service API
  pub advisory_url: String,

  /// Environment variable holding the bearer token (default: ADVISORY_RAIL_TOKEN)
  #[serde(default = "default_token_env")]
  pub token_env: String,

  /// Per-request transport timeout
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,

  /// Worker count for enrichment (default: available parallelism)
  #[serde(default)]
  pub workers: Option<usize>,
}

fn default_token_env() -> String {
  "ADVISORY_RAIL_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
  60
}

impl ServicesConfig {
  /// Validate service configuration
  pub fn validate(&self) -> RailResult<()> {
    for (field, url) in [
      ("services.build_system_url", &self.build_system_url),
      ("services.advisory_url", &self.advisory_url),
    ] {
      if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(RailError::Config(ConfigError::Invalid {
          field: field.to_string(),
          reason: format!("'{}' is not an http(s) URL", url),
        }));
      }
    }

    if self.workers == Some(0) {
      return Err(RailError::Config(ConfigError::Invalid {
        field: "services.workers".to_string(),
        reason: "must be at least 1".to_string(),
      }));
    }

    Ok(())
  }

  /// Token from the configured environment variable, if set
  pub fn token(&self) -> Option<String> {
    std::env::var(&self.token_env).ok().filter(|t| !t.trim().is_empty())
  }
}

/// Retry policy for remote calls
///
/// Defaults to a single attempt: no retries unless configured. Retries apply to
/// GET requests only; attaching builds and creating advisories are sent once,
/// since a repeated POST could attach or create twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
  #[serde(default = "default_max_attempts")]
  pub max_attempts: u32,

  #[serde(default = "default_base_backoff_ms")]
  pub base_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
  1
}

fn default_base_backoff_ms() -> u64 {
  250
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      max_attempts: default_max_attempts(),
      base_backoff_ms: default_base_backoff_ms(),
    }
  }
}

impl RailConfig {
  /// Find config file in search order: advisory-rail.toml, .advisory-rail.toml, .config/advisory-rail.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("advisory-rail.toml"),
      path.join(".advisory-rail.toml"),
      path.join(".config").join("advisory-rail.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from an explicit path, or search from `search_root`
  pub fn load(explicit: Option<&Path>, search_root: &Path) -> RailResult<Self> {
    let config_path = match explicit {
      Some(path) if path.is_file() => path.to_path_buf(),
      Some(path) => {
        return Err(RailError::Config(ConfigError::Invalid {
          field: "--config".to_string(),
          reason: format!("{} is not a file", path.display()),
        }));
      }
      None => Self::find_config_path(search_root).ok_or_else(|| {
        RailError::Config(ConfigError::NotFound {
          searched_from: search_root.to_path_buf(),
        })
      })?,
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;

    tracing::debug!(path = %config_path.display(), group = %config.group.name, "loaded configuration");
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> RailResult<Self> {
    let config: RailConfig = toml_edit::de::from_str(content)?;
    config.group.validate()?;
    config.services.validate()?;

    if config.retry.max_attempts == 0 {
      return Err(RailError::Config(ConfigError::Invalid {
        field: "retry.max_attempts".to_string(),
        reason: "must be at least 1".to_string(),
      }));
    }

    Ok(config)
  }
}
