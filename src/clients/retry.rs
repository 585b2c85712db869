//! Retry policy for remote calls
//!
//! Only errors that report `is_retryable()` are retried (transport failures and
//! 5xx responses). Authentication, authorization and not-found errors surface
//! on the first attempt. Callers only hand idempotent requests to `run`.

use crate::core::config::RetryConfig;
use crate::core::error::RailResult;
use std::time::Duration;

/// Upper bound for a single backoff sleep
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Computes how long to wait before the next attempt
pub trait BackoffPolicy {
  fn delay_for_attempt(&self, attempt: u32) -> Duration;
}

/// Bounded attempts with exponential backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self::from(&RetryConfig::default())
  }
}

impl From<&RetryConfig> for RetryPolicy {
  fn from(config: &RetryConfig) -> Self {
    Self {
      max_attempts: config.max_attempts.max(1),
      base_backoff_ms: config.base_backoff_ms,
    }
  }
}

impl BackoffPolicy for RetryPolicy {
  fn delay_for_attempt(&self, attempt: u32) -> Duration {
    let factor = 1_u64 << attempt.saturating_sub(1).min(16);
    Duration::from_millis(self.base_backoff_ms.saturating_mul(factor)).min(MAX_BACKOFF)
  }
}

impl RetryPolicy {
  /// Run `op` until it succeeds, fails permanently, or attempts run out
  pub fn run<T>(&self, what: &str, mut op: impl FnMut() -> RailResult<T>) -> RailResult<T> {
    let mut attempt = 1;
    loop {
      match op() {
        Ok(value) => return Ok(value),
        Err(err) if err.is_retryable() && attempt < self.max_attempts => {
          let delay = self.delay_for_attempt(attempt);
          tracing::warn!(%what, attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying remote call");
          std::thread::sleep(delay);
          attempt += 1;
        }
        Err(err) => return Err(err),
      }
    }
  }
}
