//! Integration tests: drive the compiled binary against an in-process HTTP fake

mod helpers;
mod test_release_date;
