//! Release scheduling
//!
//! - **date**: next release date from the previous one

pub mod date;

pub use date::next_release_date;
