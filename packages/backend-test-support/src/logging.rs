//! Unified test logging initialization
//!
//! One subscriber per test binary, shared by unit tests (through the crate's
//! `test_bootstrap`) and integration tests (through `tests/common`).

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Filter directive in order of precedence: `TEST_LOG`, `RUST_LOG`, `"warn"`.
pub fn filter_directive() -> String {
    std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string())
}

/// Initialize structured logging for tests.
///
/// Idempotent and race-safe. Output goes through the test writer so that
/// cargo and nextest capture it per test; timestamps are omitted for stable
/// output. Never panics if another subscriber is already installed.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        fmt()
            .with_env_filter(EnvFilter::new(filter_directive()))
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
