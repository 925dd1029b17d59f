#![allow(dead_code)]

pub mod fixtures;
pub mod flaky_store;
pub mod recording_sink;

pub use fixtures::{constant_settings, harness, seats, three_stage, Harness};
pub use flaky_store::FlakyStore;
pub use recording_sink::RecordingSink;
