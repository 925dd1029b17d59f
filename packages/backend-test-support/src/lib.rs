//! Backend test support utilities
//!
//! Shared by the backend's unit and integration tests: one-time logging
//! initialization and helpers for game and player identifiers.

pub mod logging;
pub mod unique_ids;
