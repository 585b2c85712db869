//! CLI commands for advisory-rail
//!
//! - **find_builds**: discover viable builds and optionally attach them
//! - **create_advisory**: draft or create the next advisory
//! - **release_date**: compute the next release date
//!
//! Commands that talk to remote services take a `&RunContext`.

pub mod create_advisory;
pub mod find_builds;
pub mod release_date;

pub use create_advisory::{CreateAdvisoryArgs, CreateAdvisoryRequest, run_create_advisory};
pub use find_builds::{FindBuildsRequest, run_find_builds};
pub use release_date::run_release_date;
