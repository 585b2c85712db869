//! Bounded worker pool for remote lookups
//!
//! A `WorkerPool` is a size, not a live pool: each `map` call builds a rayon
//! pool with exactly that many threads, runs every item, joins, and drops the
//! pool before returning. Nothing outlives the call.

use crate::core::error::{RailError, RailResult};
use crate::ui::progress::StageProgress;
use rayon::prelude::*;

/// Fixed worker count for one stage of remote calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
  workers: usize,
}

impl WorkerPool {
  /// Pool with `workers` threads (at least one)
  pub fn new(workers: usize) -> Self {
    Self {
      workers: workers.max(1),
    }
  }

  /// One worker per available processing unit
  pub fn with_available_parallelism() -> Self {
    Self::new(std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
  }

  pub fn workers(&self) -> usize {
    self.workers
  }

  /// Apply `f` to every item concurrently and gather the results.
  ///
  /// Blocks until every item has run. If any call fails the whole map fails
  /// with the first error in input order; results of the other calls are
  /// discarded. `progress` receives one signal per finished item.
  pub fn map<T, R, F>(&self, items: &[T], progress: &StageProgress, f: F) -> RailResult<Vec<R>>
  where
    T: Sync,
    R: Send,
    F: Fn(&T) -> RailResult<R> + Sync,
  {
    if items.is_empty() {
      return Ok(Vec::new());
    }

    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(self.workers.min(items.len()))
      .thread_name(|i| format!("advisory-rail-worker-{}", i))
      .build()
      .map_err(|e| RailError::message(format!("Failed to start worker pool: {}", e)))?;

    let results: Vec<RailResult<R>> = pool.install(|| {
      items
        .par_iter()
        .map(|item| {
          let result = f(item);
          progress.unit_complete();
          result
        })
        .collect()
    });

    results.into_iter().collect()
  }
}

impl Default for WorkerPool {
  fn default() -> Self {
    Self::with_available_parallelism()
  }
}
