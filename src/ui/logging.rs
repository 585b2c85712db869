//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout stays clean for reports and `--json` output.
//! `RUST_LOG` wins over `--verbose` when set.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Default level for the given verbosity flag
pub fn default_level(verbose: bool) -> Level {
  if verbose { Level::DEBUG } else { Level::WARN }
}

/// Install the global subscriber; later calls are ignored
pub fn init_tracing(verbose: bool) {
  let level = default_level(verbose);
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
    .try_init()
    .ok();
}
