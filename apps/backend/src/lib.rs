#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod ai;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod repos;
pub mod services;
pub mod telemetry;
pub mod ws;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use adapters::snapshots_mem::InMemorySnapshotStore;
pub use config::engine::EngineConfig;
pub use config::settings::GameSettings;
pub use error::AppError;
pub use errors::{DomainError, ErrorCode};
pub use repos::snapshots::SnapshotStore;
pub use services::{GameSessionCoordinator, RoundPhase, SessionStrategies};
pub use ws::hub::{EventSink, GameEventHub};
pub use ws::protocol::{EndReason, GameEvent};

// Prelude for test convenience
pub mod prelude {
    pub use super::ai::*;
    pub use super::domain::*;
    pub use super::error::*;
    pub use super::errors::*;
    pub use super::services::*;
    pub use super::ws::hub::*;
    pub use super::ws::protocol::*;
}

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
