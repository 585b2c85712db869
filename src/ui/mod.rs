//! Terminal output helpers
//!
//! - **logging**: tracing subscriber on stderr
//! - **progress**: per-stage progress bars

pub mod logging;
pub mod progress;
