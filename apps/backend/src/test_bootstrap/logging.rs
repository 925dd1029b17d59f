#![cfg(test)]

//! Logging for unit tests of this crate.
//!
//! Delegates to the shared test-support package so unit and integration tests
//! read the same variables: `TEST_LOG`, then `RUST_LOG`, default `warn`.

pub fn init() {
    backend_test_support::logging::init();
}
