//! Per-invocation run context: build once, pass everywhere
//!
//! `RunContext` owns the loaded configuration and both service clients for a
//! single invocation. Commands receive it by reference; nothing is global.
//!
//! ```text
//! main.rs:
//!   RunContext::build(config) -> &RunContext
//!   |
//!   v
//! commands/find_builds.rs, create_advisory.rs:
//!   fn run_*(ctx: &RunContext, request)
//! ```

use crate::clients::http::{HttpSession, build_client};
use crate::clients::retry::RetryPolicy;
use crate::clients::{AdvisoryService, BuildSystem, HttpAdvisoryService, HttpBuildSystem};
use crate::core::config::RailConfig;
use crate::core::error::{RailResult, Service};
use crate::engine::pool::WorkerPool;
use std::sync::Arc;

/// Configuration and clients shared by every stage of one invocation
#[derive(Clone)]
pub struct RunContext {
  /// Loaded and validated configuration
  pub config: Arc<RailConfig>,

  pub build_system: Arc<dyn BuildSystem>,

  pub advisories: Arc<dyn AdvisoryService>,
}

impl RunContext {
  /// Build HTTP clients for both services from `config`.
  ///
  /// Both clients share one connection pool and one bearer token.
  pub fn build(config: RailConfig) -> RailResult<Self> {
    let client = build_client(&config.services)?;
    let token = config.services.token();
    if token.is_none() {
      tracing::warn!(env = %config.services.token_env, "no API token set; requests are unauthenticated");
    }
    let retry = RetryPolicy::from(&config.retry);

    let build_system = HttpBuildSystem::new(HttpSession::new(
      client.clone(),
      &config.services.build_system_url,
      token.clone(),
      retry.clone(),
      Service::BuildSystem,
    ));
    let advisories = HttpAdvisoryService::new(HttpSession::new(
      client,
      &config.services.advisory_url,
      token,
      retry,
      Service::Advisory,
    ));

    Ok(Self::with_clients(config, Arc::new(build_system), Arc::new(advisories)))
  }

  /// Context over arbitrary client implementations
  pub fn with_clients(
    config: RailConfig,
    build_system: Arc<dyn BuildSystem>,
    advisories: Arc<dyn AdvisoryService>,
  ) -> Self {
    Self {
      config: Arc::new(config),
      build_system,
      advisories,
    }
  }

  /// Worker pool sized by `override_workers`, then config, then available parallelism
  pub fn worker_pool(&self, override_workers: Option<usize>) -> WorkerPool {
    match override_workers.or(self.config.services.workers) {
      Some(workers) => WorkerPool::new(workers),
      None => WorkerPool::with_available_parallelism(),
    }
  }
}
