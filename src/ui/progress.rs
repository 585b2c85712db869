//! Progress indicators for the enrichment pool
//!
//! One `linya` bar per stage. Workers only ever call `unit_complete`; the
//! signal carries no data and has no effect on ordering or results.

use linya::{Bar, Progress};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Drawing {
  progress: Progress,
  bar: Option<Bar>,
}

/// Thread-safe progress for one stage at a time
///
/// `silent()` draws nothing (used for `--json` output and tests) but still
/// counts completed units.
pub struct StageProgress {
  drawing: Option<Mutex<Drawing>>,
  completed: AtomicUsize,
}

impl StageProgress {
  /// Progress bars drawn to stderr
  pub fn visible() -> Self {
    Self {
      drawing: Some(Mutex::new(Drawing {
        progress: Progress::new(),
        bar: None,
      })),
      completed: AtomicUsize::new(0),
    }
  }

  /// Count units without drawing
  pub fn silent() -> Self {
    Self {
      drawing: None,
      completed: AtomicUsize::new(0),
    }
  }

  /// Start a new bar for `total` units
  pub fn stage(&self, total: usize, label: impl Into<String>) {
    if let Some(drawing) = &self.drawing
      && let Ok(mut drawing) = drawing.lock()
    {
      drawing.bar = if total > 0 {
        Some(drawing.progress.bar(total, label.into()))
      } else {
        None
      };
    }
  }

  /// One unit of work finished
  pub fn unit_complete(&self) {
    self.completed.fetch_add(1, Ordering::Relaxed);

    if let Some(drawing) = &self.drawing
      && let Ok(mut drawing) = drawing.lock()
    {
      let Drawing { progress, bar } = &mut *drawing;
      if let Some(bar) = bar {
        progress.inc_and_draw(bar, 1);
      }
    }
  }

  /// Units completed across all stages
  #[cfg(test)]
  pub fn completed(&self) -> usize {
    self.completed.load(Ordering::Relaxed)
  }
}
